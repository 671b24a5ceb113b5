//! End-to-end pipeline integration tests.
//!
//! These tests drive the standard two-stage pipeline:
//!
//! 1. Response Envelope - wraps the handler's response
//! 2. Request Normalizer - renames inbound keys, runs the request hook

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Request as HttpRequest, StatusCode};
use http_body_util::{BodyExt, Full};
use satchel_core::{EnvelopeBuilder, EnvelopeOptions, KeyCase, KeyMutator, Page, ResourceCollection};
use satchel_middleware::stages::{RequestNormalizerMiddleware, ResponseEnvelopeMiddleware};
use satchel_middleware::{HookError, MiddlewareContext, Pipeline, Request, Response, ResponseExt};
use serde_json::{json, Value};

/// Builds the standard pipeline with default options.
fn default_pipeline() -> Pipeline {
    Pipeline::standard(
        ResponseEnvelopeMiddleware::default(),
        RequestNormalizerMiddleware::default(),
    )
}

/// Builds a pipeline with custom envelope options.
fn pipeline_with(options: EnvelopeOptions) -> Pipeline {
    Pipeline::standard(
        ResponseEnvelopeMiddleware::new(EnvelopeBuilder::new(options)),
        RequestNormalizerMiddleware::default(),
    )
}

/// Creates a bodyless GET request.
fn get(path: &str) -> Request {
    HttpRequest::builder()
        .method("GET")
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Creates a JSON POST request.
fn post_json(path: &str, body: &Value) -> Request {
    let bytes = serde_json::to_vec(body).unwrap();
    HttpRequest::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, bytes.len())
        .body(Full::new(Bytes::from(bytes)))
        .unwrap()
}

async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Runs `pipeline` with a handler that returns `response`.
async fn respond_with(pipeline: &Pipeline, response: Response) -> Response {
    pipeline
        .process(MiddlewareContext::new(), get("/"), move |_ctx, _req| {
            Box::pin(async move { response })
        })
        .await
}

// ============================================================================
// Envelope shape
// ============================================================================

#[tokio::test]
async fn test_plain_payload_is_enveloped() {
    let response = Response::json(StatusCode::OK, &json!({ "custom": "payload" })).unwrap();
    let out = respond_with(&default_pipeline(), response).await;

    assert_eq!(out.status(), StatusCode::OK);
    assert_eq!(out.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(
        body_json(out).await,
        json!({
            "meta": { "code": 200, "status": "success", "message": "OK" },
            "data": { "custom": "payload" }
        })
    );
}

#[tokio::test]
async fn test_flagged_error_with_null_body() {
    let pipeline = default_pipeline();
    let out = pipeline
        .process(MiddlewareContext::new(), get("/"), |ctx, _req| {
            Box::pin(async move {
                ctx.with_error("This is an error", 422);
                Response::json(StatusCode::UNPROCESSABLE_ENTITY, &Value::Null).unwrap()
            })
        })
        .await;

    assert_eq!(out.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let value = body_json(out).await;
    assert_eq!(
        value,
        json!({ "meta": { "code": 422, "status": "error", "message": "This is an error" } })
    );
    assert!(value.get("data").is_none());
}

#[tokio::test]
async fn test_paginated_payload() {
    let page = Page::new(
        vec![json!({ "id": 1, "name": "first" }), json!({ "id": 2, "name": "second" })],
        2,
        15,
        1,
    );
    let out = respond_with(&default_pipeline(), Response::paginated(StatusCode::OK, page).unwrap()).await;

    let value = body_json(out).await;
    assert_eq!(
        value["meta"]["pagination"],
        json!({ "records": 2, "page": 1, "pages": 1, "limit": 15 })
    );
    assert_eq!(
        value["data"],
        json!([{ "id": 1, "name": "first" }, { "id": 2, "name": "second" }])
    );
}

#[tokio::test]
async fn test_paginated_collection_with_links() {
    let pipeline = pipeline_with(EnvelopeOptions {
        include_pagination_links: true,
        ..EnvelopeOptions::default()
    });
    let page = Page::new(vec![json!({ "id": 3 })], 5, 1, 3).with_path("/things");
    let collection = ResourceCollection::new(page).map(|item| json!({ "thing": item }));

    let out = respond_with(&pipeline, Response::collection(StatusCode::OK, collection).unwrap()).await;
    let value = body_json(out).await;

    assert_eq!(value["data"], json!([{ "thing": { "id": 3 } }]));
    assert_eq!(
        value["meta"]["pagination"],
        json!({
            "records": 5,
            "page": 3,
            "pages": 5,
            "limit": 1,
            "links": {
                "current": "/things?page=3",
                "previous": "/things?page=2",
                "next": "/things?page=4",
                "last": "/things?page=5"
            }
        })
    );
}

#[tokio::test]
async fn test_omit_empty_array_toggle() {
    let out = respond_with(&default_pipeline(), Response::json(StatusCode::OK, &json!([])).unwrap()).await;
    assert!(body_json(out).await.get("data").is_none());

    let keeping = pipeline_with(EnvelopeOptions {
        omit_empty_array: false,
        ..EnvelopeOptions::default()
    });
    let out = respond_with(&keeping, Response::json(StatusCode::OK, &json!([])).unwrap()).await;
    assert_eq!(body_json(out).await["data"], json!([]));
}

#[tokio::test]
async fn test_fatal_status_is_byte_identical() {
    let raw = Bytes::from_static(b"<h1>Whoops</h1>\n{\"trace\": [1, 2]}");
    let mut response = Response::empty(StatusCode::INTERNAL_SERVER_ERROR);
    *response.body_mut() = Full::new(raw.clone());
    response
        .headers_mut()
        .insert(CONTENT_TYPE, "text/html".parse().unwrap());

    let out = respond_with(&default_pipeline(), response).await;
    assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(out.headers().get(CONTENT_TYPE).unwrap(), "text/html");
    assert_eq!(body_bytes(out).await, raw);
}

#[tokio::test]
async fn test_meta_added_mid_handler_merges_with_pagination() {
    let pipeline = default_pipeline();
    let out = pipeline
        .process(MiddlewareContext::new(), get("/"), |ctx, _req| {
            Box::pin(async move {
                ctx.with_meta("pagination.cursor", "abc")
                    .with_meta("api.version", "2");
                let page = Page::new(vec![json!(1)], 1, 10, 1);
                Response::paginated(StatusCode::OK, page)
                    .unwrap()
                    .with_meta("api.deprecated", false)
            })
        })
        .await;

    let value = body_json(out).await;
    assert_eq!(
        value["meta"]["pagination"],
        json!({ "records": 1, "page": 1, "pages": 1, "limit": 10, "cursor": "abc" })
    );
    assert_eq!(value["meta"]["api"], json!({ "version": "2", "deprecated": false }));
}

// ============================================================================
// Request normalization
// ============================================================================

#[tokio::test]
async fn test_request_and_response_cases_are_independent() {
    let pipeline = Pipeline::standard(
        ResponseEnvelopeMiddleware::new(
            EnvelopeBuilder::default().with_mutator(KeyMutator::with_case(KeyCase::Camel)),
        ),
        RequestNormalizerMiddleware::new(KeyMutator::with_case(KeyCase::Snake)),
    );

    let request = post_json("/users?sortOrder=desc", &json!({ "firstName": "Ada", "lastName": "Lovelace" }));
    let out = pipeline
        .process(MiddlewareContext::new(), request, |_ctx, req| {
            Box::pin(async move {
                let query = req.uri().query().unwrap_or_default().to_string();
                let bytes = req.into_body().collect().await.unwrap().to_bytes();
                let mut received: Value = serde_json::from_slice(&bytes).unwrap();
                received["seen_query"] = json!(query);
                Response::json(StatusCode::CREATED, &received).unwrap()
            })
        })
        .await;

    assert_eq!(out.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(out).await["data"],
        json!({ "firstName": "Ada", "lastName": "Lovelace", "seenQuery": "sort_order=desc" })
    );
}

#[tokio::test]
async fn test_request_hook_error_renders_error_envelope() {
    let pipeline = Pipeline::standard(
        ResponseEnvelopeMiddleware::default(),
        RequestNormalizerMiddleware::default().before_dispatch(
            |_ctx: &mut MiddlewareContext, req: Request| -> Result<Request, HookError> {
                if req.headers().contains_key("x-tenant") {
                    Ok(req)
                } else {
                    Err(HookError::bad_request("Missing tenant"))
                }
            },
        ),
    );

    let out = pipeline
        .process(MiddlewareContext::new(), get("/"), |_ctx, _req| {
            Box::pin(async { Response::json(StatusCode::OK, &json!({ "unreachable": true })).unwrap() })
        })
        .await;

    assert_eq!(out.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(out).await,
        json!({ "meta": { "code": 400, "status": "error", "message": "Missing tenant" } })
    );
}

#[tokio::test]
async fn test_flagged_error_on_no_content_response() {
    let out = default_pipeline()
        .process(MiddlewareContext::new(), get("/items/7"), |ctx, _req| {
            Box::pin(async move {
                ctx.with_error("Could not delete", 422);
                Response::empty(StatusCode::NO_CONTENT)
            })
        })
        .await;

    assert_eq!(out.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(out).await,
        json!({ "meta": { "code": 422, "status": "error", "message": "Could not delete" } })
    );
}

#[tokio::test]
async fn test_wide_numbers_survive_both_directions() {
    let pipeline = Pipeline::standard(
        ResponseEnvelopeMiddleware::default(),
        RequestNormalizerMiddleware::new(KeyMutator::with_case(KeyCase::Snake)),
    );
    let request = HttpRequest::builder()
        .method("POST")
        .uri("/ledger")
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(
            br#"{"entryId":123456789012345678901234,"amount":3.14159265358979323846}"#,
        )))
        .unwrap();

    let out = pipeline
        .process(MiddlewareContext::new(), request, |_ctx, req| {
            Box::pin(async move {
                let mut response = Response::empty(StatusCode::CREATED);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, "application/json".parse().unwrap());
                *response.body_mut() = req.into_body();
                response
            })
        })
        .await;

    let bytes = body_bytes(out).await;
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.contains(r#""data":{"entry_id":123456789012345678901234,"amount":3.14159265358979323846}"#));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_share_meta() {
    let pipeline = std::sync::Arc::new(default_pipeline());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let out = pipeline
                    .process(MiddlewareContext::new(), get("/"), move |ctx, _req| {
                        Box::pin(async move {
                            ctx.with_meta("worker", i);
                            tokio::task::yield_now().await;
                            Response::json(StatusCode::OK, &json!({ "i": i })).unwrap()
                        })
                    })
                    .await;
                (i, body_json(out).await)
            })
        })
        .collect();

    for task in tasks {
        let (i, value) = task.await.unwrap();
        assert_eq!(value["meta"]["worker"], json!(i));
        assert_eq!(value["data"], json!({ "i": i }));
    }
}
