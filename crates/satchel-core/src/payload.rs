//! Payload shape classification.
//!
//! Handlers hand typed payloads to the envelope stage out-of-band: a
//! [`Page`] or [`ResourceCollection`] travels in the response's
//! [`http::Extensions`] next to the serialized body. [`classify`] turns a body
//! plus its extensions into one of the four [`Payload`] shapes.

use crate::error::{SatchelError, SatchelResult};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use http::{Extensions, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Accessors of a length-aware paginator.
pub trait Paginator {
    /// Total number of records across all pages.
    fn total(&self) -> u64;

    /// Current page, 1-based.
    fn current_page(&self) -> u64;

    /// Last page number; at least 1.
    fn last_page(&self) -> u64;

    /// Page size.
    fn per_page(&self) -> u64;

    /// Items on the current page.
    fn items(&self) -> &[Value];

    /// URL of `page`, if the paginator knows its base path.
    fn url(&self, page: u64) -> Option<String>;

    /// URL of the previous page; `None` on the first page.
    fn previous_page_url(&self) -> Option<String> {
        if self.current_page() > 1 {
            self.url(self.current_page() - 1)
        } else {
            None
        }
    }

    /// URL of the next page; `None` on the last page.
    fn next_page_url(&self) -> Option<String> {
        if self.current_page() < self.last_page() {
            self.url(self.current_page() + 1)
        } else {
            None
        }
    }
}

/// One page of a length-aware paginated result.
///
/// # Example
///
/// ```
/// use satchel_core::payload::{Page, Paginator};
/// use serde_json::json;
///
/// let page = Page::new(vec![json!({ "id": 1 }), json!({ "id": 2 })], 32, 15, 1)
///     .with_path("/users");
///
/// assert_eq!(page.last_page(), 3);
/// assert_eq!(page.next_page_url().as_deref(), Some("/users?page=2"));
/// assert!(page.previous_page_url().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    items: Vec<Value>,
    total: u64,
    per_page: u64,
    current_page: u64,
    path: Option<String>,
}

impl Page {
    /// Creates a page from already-serialized items.
    ///
    /// `per_page` and `current_page` are clamped to at least 1.
    #[must_use]
    pub fn new(items: Vec<Value>, total: u64, per_page: u64, current_page: u64) -> Self {
        Self {
            items,
            total,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            path: None,
        }
    }

    /// Creates a page by serializing typed items.
    pub fn from_items<T: Serialize>(
        items: &[T],
        total: u64,
        per_page: u64,
        current_page: u64,
    ) -> SatchelResult<Self> {
        let items = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(items, total, per_page, current_page))
    }

    /// Sets the base path used to build page URLs.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

impl Paginator for Page {
    fn total(&self) -> u64 {
        self.total
    }

    fn current_page(&self) -> u64 {
        self.current_page
    }

    fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    fn per_page(&self) -> u64 {
        self.per_page
    }

    fn items(&self) -> &[Value] {
        &self.items
    }

    fn url(&self, page: u64) -> Option<String> {
        let path = self.path.as_deref()?;
        let separator = if path.contains('?') { '&' } else { '?' };
        Some(format!("{path}{separator}page={}", page.max(1)))
    }
}

/// Per-item transform applied when a [`ResourceCollection`] is flattened.
pub type ItemTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A decorated collection wrapping a paginator.
///
/// The envelope reads pagination from the inner `resource` and emits the
/// items after the collection's transform.
#[derive(Clone)]
pub struct ResourceCollection {
    resource: Page,
    transform: Option<ItemTransform>,
}

impl ResourceCollection {
    /// Wraps a page.
    #[must_use]
    pub fn new(resource: Page) -> Self {
        Self {
            resource,
            transform: None,
        }
    }

    /// Sets the transform applied to every item.
    #[must_use]
    pub fn map<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Returns the wrapped paginator.
    #[must_use]
    pub fn resource(&self) -> &Page {
        &self.resource
    }

    /// Consumes the collection, returning the transformed items in order.
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        let items = self.resource.into_items();
        match self.transform {
            Some(transform) => items.into_iter().map(|item| transform(item)).collect(),
            None => items,
        }
    }
}

impl fmt::Debug for ResourceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCollection")
            .field("resource", &self.resource)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// The four payload shapes the envelope distinguishes.
#[derive(Debug, Clone)]
pub enum Payload {
    /// No body, or a JSON `null` body.
    Raw,
    /// A paginator.
    Paginated(Page),
    /// A decorated collection wrapping a paginator.
    PaginatedCollection(ResourceCollection),
    /// Any other JSON value.
    Plain(Value),
}

impl Payload {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Paginated(_) => "paginated",
            Self::PaginatedCollection(_) => "paginated_collection",
            Self::Plain(_) => "plain",
        }
    }
}

/// Classifies a response body and its out-of-band annotations.
///
/// An empty body is [`Payload::Raw`] regardless of annotations. Otherwise a
/// [`ResourceCollection`] wins over a bare [`Page`], and a body is decoded as
/// JSON only when neither is attached. Paginator annotations are removed from
/// `extensions`.
///
/// # Errors
///
/// Returns [`SatchelError::InvalidPayload`] when a non-empty body without
/// paginator annotations is not valid JSON.
pub fn classify(body: &[u8], extensions: &mut Extensions) -> SatchelResult<Payload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::Raw);
    }
    if let Some(collection) = extensions.remove::<ResourceCollection>() {
        return Ok(Payload::PaginatedCollection(collection));
    }
    if let Some(page) = extensions.remove::<Page>() {
        return Ok(Payload::Paginated(page));
    }
    match serde_json::from_slice::<Value>(body).map_err(SatchelError::InvalidPayload)? {
        Value::Null => Ok(Payload::Raw),
        value => Ok(Payload::Plain(value)),
    }
}

/// Broad category of an outbound response.
///
/// The envelope stage only rewrites kinds on its allow-list, which keeps it
/// away from redirects and file downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// No content type, or `text/plain`.
    Standard,
    /// `application/json` or a `+json` media type.
    Json,
    /// A 3xx response carrying a `Location` header.
    Redirect,
    /// A `Content-Disposition: attachment` response.
    Download,
    /// Anything else (HTML, binary streams, ...).
    Other,
}

impl ResponseKind {
    /// Detects the kind from a status code and headers.
    #[must_use]
    pub fn detect(status: u16, headers: &HeaderMap) -> Self {
        if status / 100 == 3 && headers.contains_key(LOCATION) {
            return Self::Redirect;
        }

        let is_attachment = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("attachment"));
        if is_attachment {
            return Self::Download;
        }

        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return Self::Standard;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            Self::Json
        } else if essence.is_empty() || essence == "text/plain" {
            Self::Standard
        } else {
            Self::Other
        }
    }

    /// Parses a kind name as used in configuration.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "json" => Some(Self::Json),
            "redirect" => Some(Self::Redirect),
            "download" => Some(Self::Download),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    fn headers(pairs: &[(http::header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_page_accessors() {
        let page = Page::new(vec![json!(1), json!(2)], 2, 15, 1);
        assert_eq!(page.total(), 2);
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.per_page(), 15);
        assert_eq!(page.items(), &[json!(1), json!(2)]);
        assert!(page.url(1).is_none());
    }

    #[test]
    fn test_page_last_page_rounding() {
        assert_eq!(Page::new(vec![], 0, 15, 1).last_page(), 1);
        assert_eq!(Page::new(vec![], 15, 15, 1).last_page(), 1);
        assert_eq!(Page::new(vec![], 16, 15, 1).last_page(), 2);
        assert_eq!(Page::new(vec![], 10, 0, 0).per_page(), 1);
    }

    #[test]
    fn test_page_urls() {
        let page = Page::new(vec![], 45, 15, 2).with_path("/posts?sort=new");
        assert_eq!(page.url(2).as_deref(), Some("/posts?sort=new&page=2"));
        assert_eq!(page.previous_page_url().as_deref(), Some("/posts?sort=new&page=1"));
        assert_eq!(page.next_page_url().as_deref(), Some("/posts?sort=new&page=3"));

        let last = Page::new(vec![], 45, 15, 3).with_path("/posts");
        assert!(last.next_page_url().is_none());
    }

    #[test]
    fn test_page_from_items() {
        #[derive(Serialize)]
        struct Item {
            id: u32,
        }
        let page = Page::from_items(&[Item { id: 1 }, Item { id: 2 }], 2, 10, 1).unwrap();
        assert_eq!(page.items(), &[json!({ "id": 1 }), json!({ "id": 2 })]);
    }

    #[test]
    fn test_resource_collection_transform_keeps_order() {
        let page = Page::new(vec![json!({ "id": 1 }), json!({ "id": 2 })], 2, 15, 1);
        let collection = ResourceCollection::new(page).map(|item| json!({ "wrapped": item }));
        assert_eq!(collection.resource().total(), 2);
        assert_eq!(
            collection.into_items(),
            vec![json!({ "wrapped": { "id": 1 } }), json!({ "wrapped": { "id": 2 } })]
        );
    }

    #[test]
    fn test_classify_empty_body_is_raw() {
        let mut extensions = Extensions::new();
        extensions.insert(Page::new(vec![], 0, 15, 1));
        assert!(matches!(classify(b"", &mut extensions).unwrap(), Payload::Raw));
        assert!(matches!(classify(b"  \n", &mut Extensions::new()).unwrap(), Payload::Raw));
    }

    #[test]
    fn test_classify_null_is_raw() {
        assert!(matches!(classify(b"null", &mut Extensions::new()).unwrap(), Payload::Raw));
    }

    #[test]
    fn test_classify_collection_before_page() {
        let page = Page::new(vec![json!(1)], 1, 15, 1);
        let mut extensions = Extensions::new();
        extensions.insert(page.clone());
        extensions.insert(ResourceCollection::new(page));

        let payload = classify(b"[1]", &mut extensions).unwrap();
        assert_eq!(payload.kind(), "paginated_collection");
        assert!(extensions.get::<ResourceCollection>().is_none());
    }

    #[test]
    fn test_classify_page() {
        let mut extensions = Extensions::new();
        extensions.insert(Page::new(vec![json!(1)], 1, 15, 1));
        assert_eq!(classify(b"[1]", &mut extensions).unwrap().kind(), "paginated");
    }

    #[test]
    fn test_classify_plain_preserves_order_and_numbers() {
        let body = br#"{"z": 1, "a": [3, 2, 1], "big": 12345678901234, "f": 1.5}"#;
        match classify(body, &mut Extensions::new()).unwrap() {
            Payload::Plain(value) => {
                let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
                assert_eq!(keys, vec!["z", "a", "big", "f"]);
                assert_eq!(value["a"], json!([3, 2, 1]));
                assert_eq!(value["big"], json!(12_345_678_901_234_u64));
                assert_eq!(value["f"], json!(1.5));
            }
            other => panic!("expected plain payload, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_scalar_is_plain() {
        assert_eq!(classify(b"\"hello\"", &mut Extensions::new()).unwrap().kind(), "plain");
        assert_eq!(classify(b"42", &mut Extensions::new()).unwrap().kind(), "plain");
    }

    #[test]
    fn test_classify_invalid_json() {
        let err = classify(b"<html>", &mut Extensions::new()).unwrap_err();
        assert!(matches!(err, SatchelError::InvalidPayload(_)));
    }

    #[test]
    fn test_response_kind_detection() {
        assert_eq!(ResponseKind::detect(200, &HeaderMap::new()), ResponseKind::Standard);
        assert_eq!(
            ResponseKind::detect(200, &headers(&[(CONTENT_TYPE, "application/json; charset=utf-8")])),
            ResponseKind::Json
        );
        assert_eq!(
            ResponseKind::detect(200, &headers(&[(CONTENT_TYPE, "application/problem+json")])),
            ResponseKind::Json
        );
        assert_eq!(
            ResponseKind::detect(200, &headers(&[(CONTENT_TYPE, "text/plain")])),
            ResponseKind::Standard
        );
        assert_eq!(
            ResponseKind::detect(200, &headers(&[(CONTENT_TYPE, "text/html")])),
            ResponseKind::Other
        );
        assert_eq!(
            ResponseKind::detect(302, &headers(&[(LOCATION, "/login")])),
            ResponseKind::Redirect
        );
        assert_eq!(
            ResponseKind::detect(
                200,
                &headers(&[
                    (CONTENT_TYPE, "application/json"),
                    (CONTENT_DISPOSITION, "attachment; filename=\"export.json\"")
                ])
            ),
            ResponseKind::Download
        );
    }

    #[test]
    fn test_response_kind_parse() {
        assert_eq!(ResponseKind::parse("JSON"), Some(ResponseKind::Json));
        assert_eq!(ResponseKind::parse(" standard "), Some(ResponseKind::Standard));
        assert_eq!(ResponseKind::parse("stream"), None);
    }
}
