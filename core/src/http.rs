//! Plain-data HTTP types shared by the shaper and its transports.
//!
//! # Design
//! Requests and responses are described as owned data. The shaper produces a
//! `RequestDescriptor` per call and never keeps it; transports turn it into
//! real network I/O. `HttpResponse` is the buffered counterpart for hosts that
//! execute the round-trip themselves and hand the result back as data.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::transport::TransportResponse;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Binary(Bytes),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }

    /// The body as text, if it was built from a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Binary(_) => None,
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(bytes))
    }
}

/// A fully shaped request, handed to the transport exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl RequestDescriptor {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response metadata reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub status_text: Option<String>,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Errors decoding a buffered `HttpResponse` body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A fully buffered HTTP response described as plain data.
///
/// Constructed by a host or fake transport after executing a
/// `RequestDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub meta: ResponseMeta,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            meta: ResponseMeta {
                status,
                status_text: None,
                url: String::new(),
                headers: Vec::new(),
            },
            body: body.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.meta.url = url.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.headers.push((name.into(), value.into()));
        self
    }
}

#[async_trait]
impl TransportResponse for HttpResponse {
    type Error = BodyError;

    fn meta(&self) -> ResponseMeta {
        self.meta.clone()
    }

    fn status(&self) -> u16 {
        self.meta.status
    }

    async fn json(self) -> Result<Value, BodyError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    async fn text(self) -> Result<String, BodyError> {
        Ok(std::str::from_utf8(&self.body)?.to_string())
    }

    async fn blob(self) -> Result<Bytes, BodyError> {
        Ok(self.body)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
