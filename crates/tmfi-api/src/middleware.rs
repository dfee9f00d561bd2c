//! Request middleware
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::{body::Body, response::Response};
use tower_http::cors::CorsLayer;

pub static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Echo the caller's request id, or assign a fresh one
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID)
        .cloned()
        .or_else(|| HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()).ok());

    if let Some(id) = &id {
        req.headers_mut().insert(REQUEST_ID.clone(), id.clone());
    }

    let mut response = next.run(req).await;
    if let Some(id) = id {
        response.headers_mut().insert(REQUEST_ID.clone(), id);
    }
    response
}
