//! Error type returned by `RequestShaper` calls.
//!
//! # Design
//! The shaper does not interpret statuses or retry, so transport and decode
//! failures pass through untouched in `Transport`. The remaining variants
//! cover the only work done locally: encoding params and bodies.

/// Errors returned by `RequestShaper` operations, generic over the
/// transport's error type.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError<E> {
    /// `params` could not be encoded as a query string or form body.
    #[error("failed to encode params: {0}")]
    Params(#[from] serde_urlencoded::ser::Error),

    /// The JSON body could not be serialized.
    #[error("failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection, protocol or body-decode failure reported by the transport.
    #[error(transparent)]
    Transport(E),
}

impl<E> ShapeError<E> {
    pub fn transport(&self) -> Option<&E> {
        match self {
            ShapeError::Transport(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_transport(self) -> Option<E> {
        match self {
            ShapeError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
