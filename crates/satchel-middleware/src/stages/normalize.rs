//! Request key normalization middleware.
//!
//! Renames the keys of inbound query parameters, JSON bodies and
//! `application/x-www-form-urlencoded` bodies before the handler sees them,
//! then runs an optional pre-dispatch hook. Parts that fail to parse are
//! left as they arrived.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::HookError;
use crate::types::{Request, Response, ResponseExt};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::uri::{PathAndQuery, Uri};
use http::{HeaderMap, HeaderValue};
use http_body_util::{BodyExt, Full};
use satchel_core::KeyMutator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Hook run after normalization and before the handler.
///
/// Returning an error rejects the request: the error is flagged on the
/// context and an empty response with the error's status is returned.
pub trait RequestHook: Send + Sync + 'static {
    /// Inspects, rewrites or rejects the request.
    fn before_dispatch(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
    ) -> Result<Request, HookError>;
}

impl<F> RequestHook for F
where
    F: Fn(&mut MiddlewareContext, Request) -> Result<Request, HookError> + Send + Sync + 'static,
{
    fn before_dispatch(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
    ) -> Result<Request, HookError> {
        self(ctx, request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
}

fn body_format(headers: &HeaderMap) -> Option<BodyFormat> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    if essence == "application/json" || essence.ends_with("+json") {
        Some(BodyFormat::Json)
    } else if essence == "application/x-www-form-urlencoded" {
        Some(BodyFormat::Form)
    } else {
        None
    }
}

/// Middleware that renames inbound request keys.
#[derive(Clone, Default)]
pub struct RequestNormalizerMiddleware {
    mutator: KeyMutator,
    hook: Option<Arc<dyn RequestHook>>,
}

impl RequestNormalizerMiddleware {
    /// Creates the stage with the given key mutator.
    #[must_use]
    pub fn new(mutator: KeyMutator) -> Self {
        Self {
            mutator,
            hook: None,
        }
    }

    /// Installs the pre-dispatch hook.
    #[must_use]
    pub fn before_dispatch<H: RequestHook>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Returns the key mutator.
    #[must_use]
    pub fn mutator(&self) -> &KeyMutator {
        &self.mutator
    }

    /// Renames query, JSON body and form body keys.
    pub async fn normalize(&self, request: Request) -> Request {
        if self.mutator.is_identity() {
            return request;
        }

        let (mut parts, body) = request.into_parts();

        if let Some(uri) = self.normalize_uri(&parts.uri) {
            parts.uri = uri;
        }

        let Some(format) = body_format(&parts.headers) else {
            return Request::from_parts(parts, body);
        };

        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        if bytes.is_empty() {
            return Request::from_parts(parts, Full::new(bytes));
        }

        let rewritten = match format {
            BodyFormat::Json => self.normalize_json(&bytes),
            BodyFormat::Form => self.normalize_form(&bytes),
        };
        let Some(rewritten) = rewritten else {
            return Request::from_parts(parts, Full::new(bytes));
        };

        if parts.headers.contains_key(CONTENT_LENGTH) {
            parts
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
        }
        Request::from_parts(parts, Full::new(rewritten))
    }

    fn normalize_uri(&self, uri: &Uri) -> Option<Uri> {
        let query = uri.query().filter(|q| !q.is_empty())?;
        let pairs = match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, "leaving unparseable query string unchanged");
                return None;
            }
        };
        let renamed = self.rename_pairs(pairs);
        let encoded = serde_urlencoded::to_string(&renamed).ok()?;

        let path_and_query = if encoded.is_empty() {
            PathAndQuery::try_from(uri.path())
        } else {
            PathAndQuery::try_from(format!("{}?{}", uri.path(), encoded))
        };
        let mut uri_parts = uri.clone().into_parts();
        uri_parts.path_and_query = Some(path_and_query.ok()?);
        match Uri::from_parts(uri_parts) {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::warn!(error = %e, "failed to rebuild normalized URI");
                None
            }
        }
    }

    fn normalize_json(&self, bytes: &Bytes) -> Option<Bytes> {
        let value: Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "leaving non-JSON request body unchanged");
                return None;
            }
        };
        match serde_json::to_vec(&self.mutator.mutate(value)) {
            Ok(body) => Some(Bytes::from(body)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize normalized request body");
                None
            }
        }
    }

    fn normalize_form(&self, bytes: &Bytes) -> Option<Bytes> {
        let pairs = match serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, "leaving unparseable form body unchanged");
                return None;
            }
        };
        serde_urlencoded::to_string(self.rename_pairs(pairs))
            .ok()
            .map(Bytes::from)
    }

    fn rename_pairs(&self, pairs: Vec<(String, String)>) -> Vec<(String, String)> {
        pairs
            .into_iter()
            .map(|(key, value)| (self.mutator.rename_key(&key), value))
            .collect()
    }
}

impl fmt::Debug for RequestNormalizerMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestNormalizerMiddleware")
            .field("mutator", &self.mutator)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Middleware for RequestNormalizerMiddleware {
    fn name(&self) -> &'static str {
        "request_normalizer"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut request = self.normalize(request).await;

            if let Some(hook) = &self.hook {
                request = match hook.before_dispatch(ctx, request) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::debug!(
                            request_id = %ctx.request_id(),
                            status = e.status.as_u16(),
                            message = %e.message,
                            "request rejected before dispatch"
                        );
                        ctx.with_error(e.message, e.status.as_u16());
                        return Response::empty(e.status);
                    }
                };
            }

            next.run(ctx, request).await
        })
    }
}
