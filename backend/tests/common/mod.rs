//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use backend::{app, Database};

/// The full router over a fresh in-memory database.
pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("failed to open in-memory database");
        Self { router: app(db) }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(empty(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(empty(Method::DELETE, uri)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(with_json(Method::POST, uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(with_json(Method::PUT, uri, body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(with_json(Method::PATCH, uri, body)).await
    }

    /// Creates a task and returns its id.
    pub async fn create(&self, body: Value) -> i64 {
        let response = self.post_json("/tasks", body).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_i64().expect("id is an integer")
    }
}

pub fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    raw(method, uri, body.to_string())
}

pub fn raw(method: Method, uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Field names named by a 422 body.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["detail"]
        .as_array()
        .expect("detail is a list")
        .iter()
        .filter_map(|error| error["loc"].as_array()?.last()?.as_str().map(str::to_string))
        .collect()
}
