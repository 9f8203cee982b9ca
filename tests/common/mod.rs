//! Shared harness for API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` against the
//! per-test database provided by `#[sqlx::test]`.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use foodgram::config::FoodgramConfig;
use foodgram::models::{Ingredient, NewIngredient, NewTag, Tag};
use foodgram::web::{create_app, state::AppState};
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_HOST: &str = "testserver";
pub const PASSWORD: &str = "kitchen-Secret-42";
pub const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "response is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A registered user and their token
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub token: String,
}

pub struct TestApp {
    router: Router,
    pub pool: PgPool,
    pub media: TempDir,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        let media = TempDir::new().expect("create media dir");
        let mut config = FoodgramConfig::default();
        config.media.root = media.path().to_path_buf();

        let router = create_app(AppState::new(config, pool.clone()));
        Self { router, pool, media }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, TEST_HOST);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register through the API
    pub async fn register(&self, username: &str) -> TestResponse {
        self.post(
            "/api/users/",
            None,
            json!({
                "email": format!("{username}@example.com"),
                "username": username,
                "first_name": "Test",
                "last_name": "Cook",
                "password": PASSWORD,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/token/login/",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register and log in
    pub async fn user(&self, username: &str) -> TestUser {
        let registered = self.register(username).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text());
        let id = registered.json()["id"].as_i64().expect("user id");

        let email = format!("{username}@example.com");
        let login = self.login(&email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text());
        let token = login.json()["auth_token"]
            .as_str()
            .expect("auth token")
            .to_string();

        TestUser {
            id,
            email,
            username: username.to_string(),
            token,
        }
    }

    pub async fn tag(&self, name: &str, slug: &str) -> i64 {
        let (tag, _) = Tag::get_or_create(
            &self.pool,
            &NewTag {
                name: name.to_string(),
                slug: slug.to_string(),
            },
        )
        .await
        .expect("seed tag");
        tag.id
    }

    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        let (ingredient, _) = Ingredient::get_or_create(
            &self.pool,
            &NewIngredient {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            },
        )
        .await
        .expect("seed ingredient");
        ingredient.id
    }

    /// Publish a recipe through the API and return its id
    pub async fn recipe(
        &self,
        author: &TestUser,
        name: &str,
        tags: &[i64],
        ingredients: &[(i64, i64)],
    ) -> i64 {
        let response = self
            .post(
                "/api/recipes/",
                Some(&author.token),
                recipe_payload(name, tags, ingredients),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().expect("recipe id")
    }
}

pub fn recipe_payload(name: &str, tags: &[i64], ingredients: &[(i64, i64)]) -> Value {
    json!({
        "name": name,
        "text": format!("How to cook {name}."),
        "image": PIXEL_PNG,
        "cooking_time": 25,
        "tags": tags,
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
    })
}
