#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use storage::MemoryRegistry;
use storage::models::Identity;
use storage::services::{AccessPolicy, VoteVisibility};
use web::AppState;
use web::middleware::auth::ApiKeys;

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";
pub const CAROL: &str = "carol-token";
pub const OWNER: &str = "owner-token";

/// Full application over a fresh in-memory registry, with `owner` as the
/// registry owner and one token per test identity.
pub fn build_test_app(vote_visibility: VoteVisibility) -> Router {
    let owner = Identity::new("owner").unwrap();
    let registry = MemoryRegistry::new(AccessPolicy::new(Some(owner), vote_visibility));
    let api_keys = ApiKeys::from_comma_separated(&format!(
        "alice:{ALICE},bob:{BOB},carol:{CAROL},owner:{OWNER}"
    ));

    web::router(AppState::new(Arc::new(registry), api_keys))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Option<Value>) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), body).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
