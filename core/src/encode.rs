//! Pure helpers that turn call options into URL, header and body parts.

use crate::http::Body;

/// Encodes `params` as `application/x-www-form-urlencoded`.
pub fn encode_params(params: &[(String, String)]) -> Result<String, serde_urlencoded::ser::Error> {
    serde_urlencoded::to_string(params)
}

/// Appends an encoded query to `url`, ahead of any `#fragment`. The result
/// holds exactly one `?`; an existing query is extended with `&`.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let (base, fragment) = match url.find('#') {
        Some(at) => url.split_at(at),
        None => (url, ""),
    };
    let joined = match base.find('?') {
        None => format!("{base}?{query}"),
        Some(_) if base.ends_with('?') || base.ends_with('&') => format!("{base}{query}"),
        Some(_) => format!("{base}&{query}"),
    };
    format!("{joined}{fragment}")
}

/// Sets `name` to `value`, replacing an existing entry of the same name
/// (compared case-insensitively) in place.
pub fn upsert_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

/// Merges header layers in order; later layers win.
pub fn merge_headers<'a>(layers: impl IntoIterator<Item = &'a [(String, String)]>) -> Vec<(String, String)> {
    let mut merged = Vec::new();
    for layer in layers {
        for (name, value) in layer {
            upsert_header(&mut merged, name, value);
        }
    }
    merged
}

/// Encodes a JSON body as text.
pub fn json_body(value: &serde_json::Value) -> Result<Body, serde_json::Error> {
    serde_json::to_string(value).map(Body::Text)
}
