//! Async HTTP request shaping over an injected transport.
//!
//! # Overview
//! `RequestShaper` exposes `get`/`post`/`put`/`patch`/`delete` methods that
//! normalize per-call options into a `RequestDescriptor`, hand it to a
//! `Transport`, and decode the response as JSON, text, bytes, or not at all.
//!
//! # Design
//! - The shaper is stateless apart from its transport and `ShaperConfig`;
//!   calls share nothing and may run concurrently.
//! - Network I/O, connection reuse, TLS and timeouts belong to the transport.
//!   `ReqwestTransport` (feature `reqwest`) is the bundled implementation;
//!   `HttpResponse` serves hosts and tests that buffer responses themselves.
//! - Statuses are not inspected. Transport and decode failures reach the
//!   caller unchanged inside `ShapeError::Transport`.

pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod options;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod response;
pub mod shaper;
pub mod transport;

pub use config::ShaperConfig;
pub use error::ShapeError;
pub use http::{Body, BodyError, HttpMethod, HttpResponse, RequestDescriptor, ResponseMeta};
pub use options::{CallOptions, RequestInit};
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use response::{Envelope, Format, Payload, Reply, UnknownFormat};
pub use shaper::{RequestShaper, ShapeResult};
pub use transport::{Transport, TransportResponse};
