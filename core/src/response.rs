//! Response shaping: the requested decode format and what callers get back.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::http::ResponseMeta;

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Text,
    Blob,
    /// Skip decoding and hand back the transport response itself.
    Stream,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Text => "text",
            Format::Blob => "blob",
            Format::Stream => "stream",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown response format `{0}` (expected json, text, blob or stream)")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Format::Json),
            "text" => Ok(Format::Text),
            "blob" => Ok(Format::Blob),
            "stream" => Ok(Format::Stream),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// A decoded response body, or the raw response for `Format::Stream`.
#[derive(Debug)]
pub enum Payload<R> {
    Json(Value),
    Text(String),
    Blob(Bytes),
    Stream(R),
}

impl<R> Payload<R> {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Bytes> {
        match self {
            Payload::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_blob(self) -> Option<Bytes> {
        match self {
            Payload::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<R> {
        match self {
            Payload::Stream(response) => Some(response),
            _ => None,
        }
    }

    /// Deserializes a `Json` payload into `T`. Other variants yield `None`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Option<Result<T, serde_json::Error>> {
        self.into_json().map(serde_json::from_value)
    }
}

impl<R: PartialEq> PartialEq for Payload<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Json(a), Payload::Json(b)) => a == b,
            (Payload::Text(a), Payload::Text(b)) => a == b,
            (Payload::Blob(a), Payload::Blob(b)) => a == b,
            (Payload::Stream(a), Payload::Stream(b)) => a == b,
            _ => false,
        }
    }
}

/// Response metadata together with the decoded payload under `data`.
#[derive(Debug)]
pub struct Envelope<R> {
    pub meta: ResponseMeta,
    pub data: Payload<R>,
}

impl<R> Envelope<R> {
    pub fn status(&self) -> u16 {
        self.meta.status
    }

    pub fn ok(&self) -> bool {
        self.meta.ok()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.header(name)
    }
}

/// Result of a shaped call: the payload alone, or an envelope when the
/// caller asked for the full response.
#[derive(Debug)]
pub enum Reply<R> {
    Data(Payload<R>),
    Envelope(Envelope<R>),
}

impl<R> Reply<R> {
    pub fn data(&self) -> &Payload<R> {
        match self {
            Reply::Data(data) => data,
            Reply::Envelope(envelope) => &envelope.data,
        }
    }

    /// Drops any envelope metadata and returns the payload.
    pub fn into_data(self) -> Payload<R> {
        match self {
            Reply::Data(data) => data,
            Reply::Envelope(envelope) => envelope.data,
        }
    }

    pub fn envelope(&self) -> Option<&Envelope<R>> {
        match self {
            Reply::Envelope(envelope) => Some(envelope),
            Reply::Data(_) => None,
        }
    }

    pub fn into_envelope(self) -> Option<Envelope<R>> {
        match self {
            Reply::Envelope(envelope) => Some(envelope),
            Reply::Data(_) => None,
        }
    }
}
