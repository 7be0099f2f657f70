//! Per-call options accepted by the verb methods.

use serde::Serialize;
use serde_json::Value;

use crate::http::{Body, HttpMethod};

/// Options for a single `get`/`post`/`put`/`patch`/`delete` call.
///
/// `params` becomes the query string for `get`/`delete` and a form-encoded
/// body for `post`/`put`/`patch`. `body` is only consulted by the body verbs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub url: String,
    pub params: Option<Vec<(String, String)>>,
    pub body: Option<Value>,
    pub headers: Option<Vec<(String, String)>>,
    pub json: bool,
    pub full_response: bool,
}

impl CallOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Appends one key/value pair to `params`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    pub fn params<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params = self.params.get_or_insert_with(Vec::new);
        params.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replaces `params` with the pairs `value` flattens to, e.g. a struct
    /// with scalar fields or a map.
    pub fn params_from<T: Serialize>(mut self, value: &T) -> Result<Self, serde_urlencoded::ser::Error> {
        let encoded = serde_urlencoded::to_string(value)?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&encoded)
            .map_err(|e| serde_urlencoded::ser::Error::Custom(e.to_string().into()))?;
        self.params = Some(pairs);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets `body` and enables JSON encoding in one step.
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        self.json = true;
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn full_response(mut self, full_response: bool) -> Self {
        self.full_response = full_response;
        self
    }
}

/// Normalized options handed to `RequestShaper::request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInit {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub json: bool,
    pub full_response: bool,
}

impl RequestInit {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
            json: false,
            full_response: false,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn full_response(mut self, full_response: bool) -> Self {
        self.full_response = full_response;
        self
    }
}
