//! Shared harness for router tests: in-memory store, temp media dir and
//! HS256 tokens.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use ::common::jwt::{JwtConfig, JwtService};
use http_body_util::BodyExt;
use recipe_api::{
    repositories::{InMemoryRepository, RecipeRepository},
    routes::create_router,
    state::AppState,
    storage::MediaStorage,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

const BOUNDARY: &str = "recipe-test-boundary";

pub struct TestApp {
    router: Router,
    jwt_service: JwtService,
    media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_recipes(|repository| Arc::new(repository))
    }

    /// Build the app with a custom recipe store layered over the in-memory one
    pub fn with_recipes(
        wrap: impl FnOnce(InMemoryRepository) -> Arc<dyn RecipeRepository>,
    ) -> Self {
        let media_dir = tempfile::tempdir().expect("create media dir");
        let jwt_service =
            JwtService::new(JwtConfig::with_secret("test-secret")).expect("jwt service");
        let repository = InMemoryRepository::new();
        let state = AppState {
            attributes: Arc::new(repository.clone()),
            recipes: wrap(repository),
            jwt_service: jwt_service.clone(),
            media: MediaStorage::new(media_dir.path(), "/media", 1024 * 1024),
        };

        Self {
            router: create_router(state),
            jwt_service,
            media_dir,
        }
    }

    pub fn media_root(&self) -> &Path {
        self.media_dir.path()
    }

    pub fn token(&self, user: Uuid) -> String {
        self.jwt_service
            .generate_access_token(user)
            .expect("access token")
    }

    /// Send a request as `user` (anonymous when `None`) and decode the JSON reply
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Post a multipart form with a single file field
    pub async fn upload(
        &self,
        uri: &str,
        user: Uuid,
        field: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Fetch a raw response body, e.g. a served media file
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

/// Names in a list response, in order
pub fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("list response")
        .iter()
        .map(|item| item["name"].as_str().expect("name"))
        .collect()
}

/// Ids in a list response, in order
pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("list response")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
