//! Construction-time settings for `RequestShaper`.

use serde::Deserialize;

/// Settings applied to every call made through one shaper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShaperConfig {
    /// Prefix for call URLs that are not already absolute.
    pub base_url: Option<String>,

    /// Headers sent beneath the JSON content type and caller headers.
    pub default_headers: Vec<(String, String)>,
}

impl ShaperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Resolves `url` against `base_url`. Absolute http(s) URLs and calls
    /// made without a base are returned unchanged.
    pub fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(url) => {
                let base = base.trim_end_matches('/');
                let path = url.trim_start_matches('/');
                if path.is_empty() {
                    base.to_string()
                } else {
                    format!("{base}/{path}")
                }
            }
            _ => url.to_string(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
