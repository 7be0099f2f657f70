//! `Transport` backed by `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::http::{Body, HttpMethod, RequestDescriptor, ResponseMeta};
use crate::transport::{Transport, TransportResponse};

/// Sends requests through a shared `reqwest::Client`.
///
/// Non-2xx statuses are returned as ordinary responses; `reqwest` only fails
/// on connection, protocol or decode errors.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = reqwest::Response;
    type Error = reqwest::Error;

    async fn send(&self, request: RequestDescriptor) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            // reqwest defers invalid header errors to `send`, so a bad pair
            // fails the request instead of being dropped.
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = match body {
                Body::Text(text) => builder.body(text),
                Body::Binary(bytes) => builder.body(bytes),
            };
        }
        builder.send().await
    }
}

#[async_trait]
impl TransportResponse for reqwest::Response {
    type Error = reqwest::Error;

    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn meta(&self) -> ResponseMeta {
        let status = self.status();
        ResponseMeta {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            url: self.url().to_string(),
            headers: self
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        }
    }

    async fn json(self) -> Result<Value, reqwest::Error> {
        reqwest::Response::json(self).await
    }

    async fn text(self) -> Result<String, reqwest::Error> {
        reqwest::Response::text(self).await
    }

    async fn blob(self) -> Result<Bytes, reqwest::Error> {
        self.bytes().await
    }
}
