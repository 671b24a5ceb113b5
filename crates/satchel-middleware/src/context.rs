//! Per-request pipeline context.
//!
//! A [`MiddlewareContext`] is created when a request enters the pipeline and
//! dropped when its response leaves. It owns the request's [`Annotations`],
//! so metadata attached by one request can never leak into another.

use satchel_core::{Annotations, Message};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Unique identifier of one request, used for log correlation.
///
/// Generated as a UUID v7, so identifiers sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a fresh time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Context that flows through the pipeline alongside the request.
///
/// Handlers receive it mutably and may annotate the eventual response:
///
/// ```
/// use satchel_middleware::context::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.with_meta("pagination.links.next", "/items?page=2")
///     .with_message("Fetched");
///
/// assert!(!ctx.annotations().is_empty());
/// ```
pub struct MiddlewareContext {
    request_id: RequestId,
    started_at: Instant,
    annotations: Annotations,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID and no annotations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            annotations: Annotations::new(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the elapsed time since the request entered the pipeline.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the annotations recorded so far.
    #[must_use]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns the annotations mutably.
    pub fn annotations_mut(&mut self) -> &mut Annotations {
        &mut self.annotations
    }

    /// Takes the annotations, leaving an empty set behind.
    pub fn take_annotations(&mut self) -> Annotations {
        std::mem::take(&mut self.annotations)
    }

    /// Attaches extra metadata at a dot-separated path.
    pub fn with_meta(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        self.annotations.with_meta(path, value);
        self
    }

    /// Overrides the envelope message.
    pub fn with_message(&mut self, message: impl Into<Message>) -> &mut Self {
        self.annotations.with_message(message);
        self
    }

    /// Flags an error with a custom message and code.
    pub fn with_error(&mut self, message: impl Into<Message>, code: u16) -> &mut Self {
        self.annotations.with_error(message, code);
        self
    }

    /// Flags an error code; the message becomes the code's reason phrase.
    pub fn flag_error(&mut self, code: u16) -> &mut Self {
        self.annotations.flag_error(code);
        self
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("annotations", &self.annotations)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}
