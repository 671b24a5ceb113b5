//! Common types used throughout the pipeline.
//!
//! Besides the request and response aliases, [`ResponseExt`] lets handlers
//! build responses that carry typed payloads and out-of-band annotations
//! for the envelope stage.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use satchel_core::{status_code, Annotations, Message, Page, ResourceCollection, SatchelResult};
use serde::Serialize;
use serde_json::Value;

/// The HTTP request type used in the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Content type of every enveloped response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Extension trait for building and annotating responses.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use satchel_middleware::{Response, ResponseExt};
/// use serde_json::json;
///
/// let response = Response::json(StatusCode::OK, &json!({ "id": 7 }))
///     .unwrap()
///     .with_meta("tenant", "acme")
///     .with_message("Found");
///
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
pub trait ResponseExt: Sized {
    /// Creates a JSON response from a serializable value.
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be serialized.
    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> SatchelResult<Self>;

    /// Creates a response for one page of results.
    ///
    /// The body is the page's items; the page itself rides along so the
    /// envelope stage can emit pagination metadata.
    ///
    /// # Errors
    ///
    /// Fails when the items cannot be serialized.
    fn paginated(status: StatusCode, page: Page) -> SatchelResult<Self>;

    /// Creates a response for a decorated collection.
    ///
    /// # Errors
    ///
    /// Fails when the transformed items cannot be serialized.
    fn collection(status: StatusCode, collection: ResourceCollection) -> SatchelResult<Self>;

    /// Creates a response with an empty body.
    fn empty(status: StatusCode) -> Self;

    /// Attaches extra metadata at a dot-separated path.
    #[must_use]
    fn with_meta(self, path: &str, value: impl Into<Value>) -> Self;

    /// Overrides the envelope message.
    #[must_use]
    fn with_message(self, message: impl Into<Message>) -> Self;

    /// Flags an error; the status becomes `code` when it is a valid status.
    #[must_use]
    fn with_error(self, message: impl Into<Message>, code: u16) -> Self;
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}

impl ResponseExt for Response {
    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> SatchelResult<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(json_response(status, body))
    }

    fn paginated(status: StatusCode, page: Page) -> SatchelResult<Self> {
        let body = serde_json::to_vec(satchel_core::Paginator::items(&page))?;
        let mut response = json_response(status, body);
        response.extensions_mut().insert(page);
        Ok(response)
    }

    fn collection(status: StatusCode, collection: ResourceCollection) -> SatchelResult<Self> {
        let body = serde_json::to_vec(&collection.clone().into_items())?;
        let mut response = json_response(status, body);
        response.extensions_mut().insert(collection);
        Ok(response)
    }

    fn empty(status: StatusCode) -> Self {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn with_meta(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.extensions_mut()
            .get_or_insert_default::<Annotations>()
            .with_meta(path, value);
        self
    }

    fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.extensions_mut()
            .get_or_insert_default::<Annotations>()
            .with_message(message);
        self
    }

    fn with_error(mut self, message: impl Into<Message>, code: u16) -> Self {
        self.extensions_mut()
            .get_or_insert_default::<Annotations>()
            .with_error(message, code);
        if let Ok(status) = status_code(code) {
            *self.status_mut() = status;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = Response::json(StatusCode::CREATED, &json!({ "id": 1 })).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(body_json(response).await, json!({ "id": 1 }));
    }

    #[tokio::test]
    async fn test_paginated_response_carries_page() {
        let page = Page::new(vec![json!(1), json!(2)], 2, 15, 1);
        let response = Response::paginated(StatusCode::OK, page.clone()).unwrap();
        assert_eq!(response.extensions().get::<Page>(), Some(&page));
        assert_eq!(body_json(response).await, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_collection_response_body_is_transformed() {
        let page = Page::new(vec![json!(1)], 1, 15, 1);
        let collection = ResourceCollection::new(page).map(|item| json!({ "value": item }));
        let response = Response::collection(StatusCode::OK, collection).unwrap();
        assert!(response.extensions().get::<ResourceCollection>().is_some());
        assert_eq!(body_json(response).await, json!([{ "value": 1 }]));
    }

    #[test]
    fn test_empty_response() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_annotations_accumulate_on_response() {
        let response = Response::empty(StatusCode::OK)
            .with_meta("a.b", 1)
            .with_meta("a.c", 2)
            .with_error("This is an error", 422);

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let annotations = response.extensions().get::<Annotations>().unwrap();
        assert_eq!(annotations.code(), Some(422));
        assert_eq!(annotations.meta().get("a"), Some(&json!({ "b": 1, "c": 2 })));
    }

    #[test]
    fn test_invalid_error_code_keeps_status() {
        let response = Response::empty(StatusCode::OK).with_error("odd", 42);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.extensions().get::<Annotations>().unwrap().code(), Some(42));
    }
}
