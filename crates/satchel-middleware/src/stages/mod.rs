//! Built-in pipeline stages.
//!
//! - [`envelope`] - wraps responses in the `{meta, data}` envelope
//! - [`normalize`] - renames inbound request keys and runs the request hook

pub mod envelope;
pub mod normalize;

pub use envelope::{ResponseEnvelopeMiddleware, ResponseHook};
pub use normalize::{RequestHook, RequestNormalizerMiddleware};
