//! Response envelope middleware.
//!
//! Rewrites handler responses into the `{meta, data}` envelope. Runs after
//! the handler:
//!
//! ```text
//! Handler → ... → [ResponseEnvelope] → Response
//! ```
//!
//! Responses outside the configured kinds (redirects and downloads by
//! default), fatal statuses and statuses that forbid a body are passed
//! through byte-identical. A body that cannot be classified or an envelope
//! that cannot be serialized also leaves the response untouched.
//!
//! # Example
//!
//! ```
//! use satchel_core::{EnvelopeBuilder, EnvelopeOptions, ResponseKind};
//! use satchel_middleware::stages::ResponseEnvelopeMiddleware;
//!
//! let envelope = ResponseEnvelopeMiddleware::new(EnvelopeBuilder::new(EnvelopeOptions {
//!     include_pagination_links: true,
//!     ..EnvelopeOptions::default()
//! }))
//! .handle_kinds([ResponseKind::Json])
//! .fatal_statuses([500, 503]);
//! # let _ = envelope;
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, JSON_CONTENT_TYPE};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use satchel_core::{classify, status_code, Annotations, EnvelopeBuilder, ResponseKind, SatchelResult};
use std::fmt;
use std::sync::Arc;

/// Hook invoked right before an envelope is built.
///
/// The hook may adjust status, headers or extensions (for instance to attach
/// an [`Annotations`] value); it runs only for responses that will be
/// enveloped.
pub trait ResponseHook: Send + Sync + 'static {
    /// Inspects or adjusts the response.
    fn before_build(&self, ctx: &MiddlewareContext, response: &mut Response);
}

impl<F> ResponseHook for F
where
    F: Fn(&MiddlewareContext, &mut Response) + Send + Sync + 'static,
{
    fn before_build(&self, ctx: &MiddlewareContext, response: &mut Response) {
        self(ctx, response);
    }
}

/// Middleware that wraps responses in the standard envelope.
#[derive(Clone)]
pub struct ResponseEnvelopeMiddleware {
    builder: EnvelopeBuilder,
    kinds: Vec<ResponseKind>,
    fatal_statuses: Vec<u16>,
    hook: Option<Arc<dyn ResponseHook>>,
}

impl Default for ResponseEnvelopeMiddleware {
    fn default() -> Self {
        Self::new(EnvelopeBuilder::default())
    }
}

impl ResponseEnvelopeMiddleware {
    /// Creates the stage with default kinds (`standard`, `json`) and fatal
    /// statuses (`500`).
    #[must_use]
    pub fn new(builder: EnvelopeBuilder) -> Self {
        Self {
            builder,
            kinds: vec![ResponseKind::Standard, ResponseKind::Json],
            fatal_statuses: vec![500],
            hook: None,
        }
    }

    /// Sets the response kinds that get enveloped.
    #[must_use]
    pub fn handle_kinds(mut self, kinds: impl IntoIterator<Item = ResponseKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Sets the statuses that pass through untouched.
    #[must_use]
    pub fn fatal_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.fatal_statuses = statuses.into_iter().collect();
        self
    }

    /// Installs the pre-build hook.
    #[must_use]
    pub fn before_build<H: ResponseHook>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Returns the envelope builder.
    #[must_use]
    pub fn builder(&self) -> &EnvelopeBuilder {
        &self.builder
    }

    /// Returns true if a response with this status and kind gets enveloped.
    #[must_use]
    pub fn should_wrap(&self, status: StatusCode, kind: ResponseKind) -> bool {
        self.kinds.contains(&kind)
            && !self.fatal_statuses.contains(&status.as_u16())
            && !forbids_body(status)
    }

    /// Wraps a response, consuming the annotations recorded on `ctx`.
    ///
    /// The pass-through checks use the effective status: a flagged error
    /// code replaces the handler's status. When rendering fails, the
    /// response and `ctx` are left as they were.
    pub async fn wrap(&self, ctx: &mut MiddlewareContext, mut response: Response) -> Response {
        let kind = ResponseKind::detect(response.status().as_u16(), response.headers());
        let status = effective_status(ctx, &response);
        if !self.should_wrap(status, kind) {
            tracing::debug!(
                request_id = %ctx.request_id(),
                status = status.as_u16(),
                kind = ?kind,
                "passing response through unwrapped"
            );
            return response;
        }

        if let Some(hook) = &self.hook {
            hook.before_build(ctx, &mut response);
        }

        let (mut parts, body) = response.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let mut annotations = ctx.annotations().clone();
        if let Some(later) = parts.extensions.get::<Annotations>() {
            annotations.absorb(later.clone());
        }

        let mut extensions = parts.extensions.clone();
        let enveloped = self.render(parts.status.as_u16(), &bytes, &mut extensions, &annotations);
        let envelope_bytes = match enveloped {
            Ok(envelope_bytes) => envelope_bytes,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    status = parts.status.as_u16(),
                    error = %e,
                    "envelope failed, returning original response"
                );
                return Response::from_parts(parts, Full::new(bytes));
            }
        };

        ctx.take_annotations();
        extensions.remove::<Annotations>();
        parts.extensions = extensions;

        if let Some(code) = annotations.code() {
            match status_code(code) {
                Ok(flagged) => parts.status = flagged,
                Err(e) => tracing::debug!(
                    request_id = %ctx.request_id(),
                    error = %e,
                    "keeping original status"
                ),
            }
        }

        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        parts.headers.remove(CONTENT_LENGTH);
        Response::from_parts(parts, Full::new(envelope_bytes))
    }

    fn render(
        &self,
        code: u16,
        body: &[u8],
        extensions: &mut http::Extensions,
        annotations: &Annotations,
    ) -> SatchelResult<Bytes> {
        let payload = classify(body, extensions)?;
        tracing::trace!(code, payload = payload.kind(), "building envelope");
        self.builder
            .build(code, payload, annotations)
            .to_bytes(self.builder.fields())
    }
}

/// Status the response will leave with: the latest valid flagged code,
/// response annotations before context annotations, else the handler's.
fn effective_status(ctx: &MiddlewareContext, response: &Response) -> StatusCode {
    response
        .extensions()
        .get::<Annotations>()
        .and_then(Annotations::code)
        .or_else(|| ctx.annotations().code())
        .and_then(|code| status_code(code).ok())
        .unwrap_or_else(|| response.status())
}

/// 1xx, 204 and 304 responses never carry a body.
fn forbids_body(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
}

impl fmt::Debug for ResponseEnvelopeMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseEnvelopeMiddleware")
            .field("builder", &self.builder)
            .field("kinds", &self.kinds)
            .field("fatal_statuses", &self.fatal_statuses)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Middleware for ResponseEnvelopeMiddleware {
    fn name(&self) -> &'static str {
        "response_envelope"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let response = next.run(ctx, request).await;
            self.wrap(ctx, response).await
        })
    }
}
