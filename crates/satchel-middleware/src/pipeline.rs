//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] holds its stages in order, outermost first, and composes
//! them back-to-front around the handler for every request.
//!
//! The standard pipeline is:
//!
//! ```text
//! Request → ResponseEnvelope → RequestNormalizer → Handler
//!                                                     ↓
//! Response ← ResponseEnvelope ←──────────────────────┘
//! ```
//!
//! The envelope stage sits outermost so that it also renders responses
//! produced by a short-circuiting request hook.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{RequestNormalizerMiddleware, ResponseEnvelopeMiddleware};
use crate::types::{Request, Response};
use http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// A type-erased stage that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Error returned by a request hook to reject a request before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    /// Status of the rejection response.
    pub status: StatusCode,
    /// Message rendered in the envelope.
    pub message: String,
}

impl HookError {
    /// Creates a hook error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a `400 Bad Request` hook error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a `403 Forbidden` hook error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a `422 Unprocessable Entity` hook error.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook rejected request ({}): {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HookError {}

/// The middleware pipeline.
///
/// Immutable once built and cheap to share across requests; every request
/// gets its own [`MiddlewareContext`].
///
/// # Example
///
/// ```
/// use satchel_middleware::{MiddlewareContext, Pipeline, Response, ResponseExt};
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder().build();
/// let request = http::Request::new(http_body_util::Full::new(bytes::Bytes::new()));
///
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |_ctx, _req| {
///         Box::pin(async { Response::empty(StatusCode::OK) })
///     })
///     .await;
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Creates the standard two-stage pipeline.
    #[must_use]
    pub fn standard(
        envelope: ResponseEnvelopeMiddleware,
        normalizer: RequestNormalizerMiddleware,
    ) -> Self {
        Self::builder().stage(envelope).stage(normalizer).build()
    }

    /// Processes a request through every stage and the handler.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: for<'c> FnOnce(&'c mut MiddlewareContext, Request) -> BoxFuture<'c, Response> + Send,
    {
        let next = self.build_chain(handler);
        let response = next.run(&mut ctx, request).await;

        tracing::debug!(
            request_id = %ctx.request_id(),
            status = response.status().as_u16(),
            elapsed = ?ctx.elapsed(),
            "pipeline complete"
        );
        response
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: for<'c> FnOnce(&'c mut MiddlewareContext, Request) -> BoxFuture<'c, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the stage names in order, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; earlier stages wrap later ones.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
