//! Verb-level request shaping over an injected transport.
//!
//! # Design
//! `RequestShaper` holds only its transport and a `ShaperConfig`; nothing is
//! carried between calls. Each verb method normalizes `CallOptions` into a
//! `RequestInit`, and `request` turns that into a `RequestDescriptor`, sends
//! it, and decodes the response in the requested `Format`. Statuses are never
//! inspected.

use tracing::debug;

use crate::config::ShaperConfig;
use crate::encode::{append_query, encode_params, json_body, merge_headers};
use crate::error::ShapeError;
use crate::http::{Body, HttpMethod, RequestDescriptor};
use crate::options::{CallOptions, RequestInit};
use crate::response::{Envelope, Format, Payload, Reply};
use crate::transport::{Transport, TransportResponse};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Result of a call through a shaper backed by transport `T`.
pub type ShapeResult<T> =
    Result<Reply<<T as Transport>::Response>, ShapeError<<T as Transport>::Error>>;

/// Stateless HTTP facade over a `Transport`.
#[derive(Debug, Clone)]
pub struct RequestShaper<T> {
    transport: T,
    config: ShaperConfig,
}

impl<T: Transport> RequestShaper<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ShaperConfig::default())
    }

    pub fn with_config(transport: T, config: ShaperConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    /// GET with `params` as the query string. JSON encoding is always off.
    pub async fn get(&self, opts: CallOptions, format: Format) -> ShapeResult<T> {
        let (url, init) = query_init(HttpMethod::Get, opts)?;
        self.request(&url, init.json(false), format).await
    }

    /// DELETE with `params` as the query string.
    pub async fn delete(&self, opts: CallOptions, format: Format) -> ShapeResult<T> {
        let (url, init) = query_init(HttpMethod::Delete, opts)?;
        self.request(&url, init, format).await
    }

    /// POST with `params` as a form body, or `body` as JSON when `json` is set.
    pub async fn post(&self, opts: CallOptions, format: Format) -> ShapeResult<T> {
        let (url, init) = body_init(HttpMethod::Post, opts)?;
        self.request(&url, init, format).await
    }

    pub async fn put(&self, opts: CallOptions, format: Format) -> ShapeResult<T> {
        let (url, init) = body_init(HttpMethod::Put, opts)?;
        self.request(&url, init, format).await
    }

    pub async fn patch(&self, opts: CallOptions, format: Format) -> ShapeResult<T> {
        let (url, init) = body_init(HttpMethod::Patch, opts)?;
        self.request(&url, init, format).await
    }

    /// Sends one request and shapes its response.
    ///
    /// Headers are layered as config defaults, then `Content-Type:
    /// application/json` when `init.json` is set, then `init.headers`; later
    /// layers win. With `Format::Stream` the response is returned undecoded.
    pub async fn request(&self, url: &str, init: RequestInit, format: Format) -> ShapeResult<T> {
        let json_header = if init.json {
            vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())]
        } else {
            Vec::new()
        };
        let headers = merge_headers([
            self.config.default_headers.as_slice(),
            json_header.as_slice(),
            init.headers.as_slice(),
        ]);

        let descriptor = RequestDescriptor {
            method: init.method,
            url: self.config.resolve(url),
            headers,
            body: init.body,
        };
        debug!(
            target: "shaper::http",
            method = %descriptor.method,
            url = %descriptor.url,
            %format,
            "sending request"
        );

        let response = match self.transport.send(descriptor).await {
            Ok(response) => response,
            Err(err) => {
                debug!(target: "shaper::http", error = %err, "transport error");
                return Err(ShapeError::Transport(err));
            }
        };
        debug!(target: "shaper::http", status = response.status(), "response received");
        let meta = init.full_response.then(|| response.meta());

        let data = decode(response, format)
            .await
            .map_err(|err| ShapeError::Transport(T::Error::from(err)))?;

        Ok(match meta {
            Some(meta) => Reply::Envelope(Envelope { meta, data }),
            None => Reply::Data(data),
        })
    }
}

async fn decode<R: TransportResponse>(response: R, format: Format) -> Result<Payload<R>, R::Error> {
    Ok(match format {
        Format::Json => Payload::Json(response.json().await?),
        Format::Text => Payload::Text(response.text().await?),
        Format::Blob => Payload::Blob(response.blob().await?),
        Format::Stream => Payload::Stream(response),
    })
}

/// Shared shaping for GET and DELETE: params go into the URL and no body is
/// forwarded.
fn query_init<E>(method: HttpMethod, opts: CallOptions) -> Result<(String, RequestInit), ShapeError<E>> {
    let url = match &opts.params {
        Some(params) => append_query(&opts.url, &encode_params(params)?),
        None => opts.url,
    };
    if opts.body.is_some() {
        debug!(target: "shaper::http", %method, "ignoring body on a query-only verb");
    }
    let init = RequestInit {
        method,
        headers: opts.headers.unwrap_or_default(),
        body: None,
        json: opts.json,
        full_response: opts.full_response,
    };
    Ok((url, init))
}

/// Shared shaping for POST, PUT and PATCH.
///
/// A string body is forwarded verbatim, params replace it with a form body,
/// and a JSON body replaces either when `json` is set. A structured body
/// without `json` is not forwarded.
fn body_init<E>(method: HttpMethod, opts: CallOptions) -> Result<(String, RequestInit), ShapeError<E>> {
    let mut body = match &opts.body {
        Some(serde_json::Value::String(text)) if !opts.json => Some(Body::Text(text.clone())),
        _ => None,
    };
    if let Some(params) = &opts.params {
        body = Some(Body::Text(encode_params(params)?));
    }
    match &opts.body {
        Some(value) if opts.json => body = Some(json_body(value)?),
        Some(value) if body.is_none() && !value.is_string() => {
            debug!(target: "shaper::http", %method, "not forwarding structured body without json encoding");
        }
        _ => {}
    }

    let init = RequestInit {
        method,
        headers: opts.headers.unwrap_or_default(),
        body,
        json: opts.json,
        full_response: opts.full_response,
    };
    Ok((opts.url, init))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::http::{BodyError, HttpResponse};

    /// Records every descriptor and answers with a fixed response.
    struct Recorder {
        sent: Mutex<Vec<RequestDescriptor>>,
        response: HttpResponse,
    }

    impl Recorder {
        fn answering(response: HttpResponse) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                response,
            })
        }

        fn last(&self) -> RequestDescriptor {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        type Response = HttpResponse;
        type Error = BodyError;

        async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, BodyError> {
            self.sent.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn ok_json() -> HttpResponse {
        HttpResponse::new(200, r#"{"ok":true}"#)
            .with_url("https://api.x/y")
            .with_header("content-type", "application/json")
    }

    fn shaper(recorder: &Arc<Recorder>) -> RequestShaper<Arc<Recorder>> {
        RequestShaper::new(Arc::clone(recorder))
    }

    #[tokio::test]
    async fn get_appends_params_and_sends_no_body() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y").param("q", "1");
        let reply = shaper(&recorder).get(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, "https://api.x/y?q=1");
        assert!(sent.body.is_none());
        assert!(sent.headers.is_empty());
        assert_eq!(reply.data().as_json(), Some(&json!({ "ok": true })));
    }

    #[tokio::test]
    async fn get_forces_json_off() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y").json(true);
        shaper(&recorder).get(opts, Format::Json).await.unwrap();
        assert_eq!(recorder.last().header("content-type"), None);
    }

    #[tokio::test]
    async fn delete_keeps_json_header_but_drops_body() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y/7")
            .json(true)
            .body(json!({ "ignored": true }));
        shaper(&recorder).delete(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y").body(json!({ "n": 5 })).json(true);
        shaper(&recorder).post(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.body, Some(Body::Text(r#"{"n":5}"#.to_string())));
        assert_eq!(
            sent.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn post_form_encodes_params() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y")
            .param("name", "a b")
            .param("n", "5");
        shaper(&recorder).post(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.url, "https://api.x/y");
        assert_eq!(sent.body, Some(Body::Text("name=a+b&n=5".to_string())));
        assert!(sent.headers.is_empty());
    }

    #[tokio::test]
    async fn json_body_overrides_params_body() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y")
            .param("q", "1")
            .body(json!({ "a": 1 }))
            .json(true);
        shaper(&recorder).put(opts, Format::Json).await.unwrap();
        assert_eq!(recorder.last().body, Some(Body::Text(r#"{"a":1}"#.to_string())));
    }

    #[tokio::test]
    async fn string_body_is_forwarded_verbatim() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y").body("raw payload");
        shaper(&recorder).patch(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.body, Some(Body::Text("raw payload".to_string())));
    }

    #[tokio::test]
    async fn structured_body_without_json_is_not_forwarded() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y").body(json!({ "a": 1 }));
        shaper(&recorder).post(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert!(sent.body.is_none());
        assert!(sent.headers.is_empty());
    }

    #[tokio::test]
    async fn caller_headers_override_content_type() {
        let recorder = Recorder::answering(ok_json());
        let opts = CallOptions::new("https://api.x/y")
            .body(json!([1, 2]))
            .json(true)
            .header("content-type", "application/vnd.api+json");
        shaper(&recorder).post(opts, Format::Json).await.unwrap();
        assert_eq!(
            recorder.last().header("Content-Type"),
            Some("application/vnd.api+json")
        );
    }

    #[tokio::test]
    async fn config_defaults_sit_beneath_caller_headers() {
        let recorder = Recorder::answering(ok_json());
        let config = ShaperConfig::new()
            .base_url("https://api.x/")
            .default_header("Accept", "application/json")
            .default_header("X-Client", "shaper");
        let shaper = RequestShaper::with_config(Arc::clone(&recorder), config);

        let opts = CallOptions::new("/y").header("x-client", "override");
        shaper.get(opts, Format::Json).await.unwrap();

        let sent = recorder.last();
        assert_eq!(sent.url, "https://api.x/y");
        assert_eq!(
            sent.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Client".to_string(), "override".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn full_response_wraps_same_data() {
        let recorder = Recorder::answering(ok_json());
        let plain = shaper(&recorder)
            .get(CallOptions::new("https://api.x/y"), Format::Json)
            .await
            .unwrap()
            .into_data();
        let full = shaper(&recorder)
            .get(CallOptions::new("https://api.x/y").full_response(true), Format::Json)
            .await
            .unwrap()
            .into_envelope()
            .unwrap();

        assert_eq!(full.data, plain);
        assert_eq!(full.status(), 200);
        assert_eq!(full.meta.url, "https://api.x/y");
        assert_eq!(full.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn text_and_blob_formats_decode_body() {
        let recorder = Recorder::answering(HttpResponse::new(200, "hello"));
        let text = shaper(&recorder)
            .get(CallOptions::new("https://api.x/t"), Format::Text)
            .await
            .unwrap();
        assert_eq!(text.data().as_text(), Some("hello"));

        let blob = shaper(&recorder)
            .get(CallOptions::new("https://api.x/t"), Format::Blob)
            .await
            .unwrap();
        assert_eq!(blob.data().as_blob().map(|b| &b[..]), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn stream_returns_raw_response() {
        let recorder = Recorder::answering(HttpResponse::new(200, "not json at all"));
        let reply = shaper(&recorder)
            .get(CallOptions::new("https://api.x/s"), Format::Stream)
            .await
            .unwrap();
        let raw = reply.into_data().into_stream().unwrap();
        assert_eq!(raw.body, &b"not json at all"[..]);
    }

    #[tokio::test]
    #[traced_test]
    async fn response_status_is_logged_for_plain_replies() {
        let recorder = Recorder::answering(HttpResponse::new(202, "{}"));
        let reply = shaper(&recorder)
            .get(CallOptions::new("https://api.x/y"), Format::Json)
            .await
            .unwrap();

        assert!(reply.envelope().is_none());
        assert!(logs_contain("response received"));
        assert!(logs_contain("status=202"));
    }

    #[tokio::test]
    async fn stream_full_response_wraps_raw_response() {
        let recorder = Recorder::answering(HttpResponse::new(200, "{}").with_header("x-id", "1"));
        let envelope = shaper(&recorder)
            .get(CallOptions::new("https://api.x/s").full_response(true), Format::Stream)
            .await
            .unwrap()
            .into_envelope()
            .unwrap();

        assert_eq!(envelope.meta.status, 200);
        assert_eq!(envelope.header("x-id"), Some("1"));
        let raw = envelope.data.into_stream().unwrap();
        assert_eq!(raw.body, &b"{}"[..]);
        assert_eq!(raw.meta.headers, vec![("x-id".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn decode_failure_propagates_as_transport_error() {
        let recorder = Recorder::answering(HttpResponse::new(200, "<html>"));
        let err = shaper(&recorder)
            .get(CallOptions::new("https://api.x/y"), Format::Json)
            .await
            .unwrap_err();
        assert!(matches!(err.transport(), Some(BodyError::Json(_))));
    }

    #[tokio::test]
    async fn error_status_is_still_decoded() {
        let recorder = Recorder::answering(HttpResponse::new(404, r#"{"error":"missing"}"#));
        let reply = shaper(&recorder)
            .get(CallOptions::new("https://api.x/y").full_response(true), Format::Json)
            .await
            .unwrap();
        let envelope = reply.into_envelope().unwrap();
        assert!(!envelope.ok());
        assert_eq!(envelope.data.as_json(), Some(&json!({ "error": "missing" })));
    }

    #[tokio::test]
    async fn request_sends_binary_body() {
        let recorder = Recorder::answering(ok_json());
        let init = RequestInit::new(HttpMethod::Put)
            .body(vec![0u8, 1, 2])
            .header("Content-Type", "application/octet-stream");
        shaper(&recorder)
            .request("https://api.x/upload", init, Format::Json)
            .await
            .unwrap();

        let sent = recorder.last();
        assert_eq!(sent.body.as_ref().map(Body::as_bytes), Some(&[0u8, 1, 2][..]));
        assert_eq!(sent.header("content-type"), Some("application/octet-stream"));
    }
}
