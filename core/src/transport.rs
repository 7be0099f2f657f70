//! The seam between the shaper and whatever performs network I/O.
//!
//! # Design
//! A transport receives a finished `RequestDescriptor` and returns a response
//! object that can report its metadata and decode its body once. Connection
//! reuse, TLS and timeouts all live behind this trait. The transport's error
//! type must absorb the response's decode error so both failure points reach
//! the caller through a single type.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::http::{RequestDescriptor, ResponseMeta};

/// A response returned by a `Transport`. Each decode method consumes it.
#[async_trait]
pub trait TransportResponse: Send + Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn meta(&self) -> ResponseMeta;

    /// Status code without collecting the rest of the metadata.
    fn status(&self) -> u16 {
        self.meta().status
    }

    async fn json(self) -> Result<Value, Self::Error>;

    async fn text(self) -> Result<String, Self::Error>;

    async fn blob(self) -> Result<Bytes, Self::Error>;
}

/// Executes shaped requests.
#[async_trait]
pub trait Transport: Send + Sync {
    type Response: TransportResponse;
    type Error: std::error::Error
        + From<<Self::Response as TransportResponse>::Error>
        + Send
        + Sync
        + 'static;

    async fn send(&self, request: RequestDescriptor) -> Result<Self::Response, Self::Error>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    type Response = T::Response;
    type Error = T::Error;

    async fn send(&self, request: RequestDescriptor) -> Result<Self::Response, Self::Error> {
        (**self).send(request).await
    }
}
