//! # Satchel Middleware
//!
//! The request/response pipeline that applies Satchel's envelope and key
//! normalization around application handlers.
//!
//! ```text
//! Request → ResponseEnvelope → RequestNormalizer → Handler
//!                                                     ↓
//! Response ← ResponseEnvelope ←──────────────────────┘
//! ```
//!
//! | Stage               | Purpose                                              |
//! |---------------------|------------------------------------------------------|
//! | Response Envelope   | Classify the payload and wrap it in `{meta, data}`   |
//! | Request Normalizer  | Rename query/body keys, run the pre-dispatch hook    |
//!
//! Handlers annotate the eventual envelope through the per-request
//! [`MiddlewareContext`] or directly on the response with [`ResponseExt`].
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use satchel_middleware::stages::{RequestNormalizerMiddleware, ResponseEnvelopeMiddleware};
//! use satchel_middleware::{MiddlewareContext, Pipeline, Response, ResponseExt};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::standard(
//!     ResponseEnvelopeMiddleware::default(),
//!     RequestNormalizerMiddleware::default(),
//! );
//! let request = http::Request::new(http_body_util::Full::new(bytes::Bytes::new()));
//!
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, |ctx, _req| {
//!         Box::pin(async move {
//!             ctx.with_meta("version", "v1");
//!             Response::json(StatusCode::OK, &json!({ "id": 1 })).unwrap()
//!         })
//!     })
//!     .await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/satchel-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::{MiddlewareContext, RequestId};
pub use middleware::{BoxFuture, FnMiddleware, Handler, Middleware, Next};
pub use pipeline::{BoxedMiddleware, HookError, Pipeline, PipelineBuilder};
pub use stages::{RequestHook, RequestNormalizerMiddleware, ResponseEnvelopeMiddleware, ResponseHook};
pub use types::{Request, Response, ResponseExt, JSON_CONTENT_TYPE};
