//! Gateway routing against a live upstream
//!
//! The upstream is a local echo server; the gateway is driven in-process with
//! `oneshot` or, for Host and forwarding headers, through a real socket.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use foodgram::config::{GatewayConfig, GatewayRouteConfig};
use foodgram::gateway::{create_gateway_app, GatewayState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

const INDEX_HTML: &str = "<!doctype html><div id=\"root\"></div>";

fn header_value(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(request: Request<Body>) -> Json<Value> {
    let mut summary = json!({
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "query": request.uri().query(),
        "host": header_value(&request, "host"),
        "forwarded_for": header_value(&request, "x-forwarded-for"),
        "forwarded_proto": header_value(&request, "x-forwarded-proto"),
        "authorization": header_value(&request, "authorization"),
    });
    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    summary["body"] = json!(String::from_utf8_lossy(&body));
    Json(summary)
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "too late"
}

/// Start the echo upstream and return its base URL
async fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/slow/", get(slow)).fallback(echo);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A local address nothing listens on
async fn closed_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn upstream_route(prefix: &str, upstream: &str, rewrite: Option<&str>) -> GatewayRouteConfig {
    GatewayRouteConfig {
        prefix: prefix.to_string(),
        upstream: Some(upstream.to_string()),
        rewrite: rewrite.map(str::to_string),
        static_dir: None,
    }
}

struct Site {
    dir: TempDir,
}

impl Site {
    /// Frontend build, media directory and a file outside both
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("static/assets")).unwrap();
        std::fs::create_dir_all(root.join("media/recipes/images")).unwrap();
        std::fs::write(root.join("static/index.html"), INDEX_HTML).unwrap();
        std::fs::write(root.join("static/assets/app.js"), "console.log('foodgram');").unwrap();
        std::fs::write(root.join("media/x.jpg"), b"jpeg bytes").unwrap();
        std::fs::write(root.join("secret.txt"), "do not serve").unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self, upstream: &str) -> GatewayConfig {
        GatewayConfig {
            bind_address: "127.0.0.1:0".to_string(),
            static_root: self.root().join("static"),
            index_file: "index.html".to_string(),
            client_max_body_size_mb: 10,
            upstream_timeout_seconds: 1,
            routes: vec![
                upstream_route("/api/", upstream, None),
                upstream_route("/admin/", upstream, Some("/admin/")),
                upstream_route("/slow/", upstream, None),
                GatewayRouteConfig {
                    prefix: "/media/".to_string(),
                    upstream: None,
                    rewrite: None,
                    static_dir: Some(self.root().join("media")),
                },
            ],
        }
    }

    fn app(&self, upstream: &str) -> Router {
        let state = GatewayState::from_config(&self.config(upstream)).unwrap();
        create_gateway_app(state)
    }
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "foodgram.example")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_api_is_forwarded_with_path_and_query() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/recipes/?page=2&tags=lunch")
        .header(header::HOST, "foodgram.example")
        .header(header::AUTHORIZATION, "Token abc")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-proto", "https")
        .body(Body::from(r#"{"name":"Soup"}"#))
        .unwrap();
    let (status, body) = call(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let echoed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/api/recipes/");
    assert_eq!(echoed["query"], "page=2&tags=lunch");
    assert_eq!(echoed["host"], "foodgram.example");
    assert_eq!(echoed["authorization"], "Token abc");
    assert_eq!(echoed["forwarded_proto"], "http");
    assert_eq!(echoed["body"], r#"{"name":"Soup"}"#);
}

#[tokio::test]
async fn test_admin_is_forwarded_to_admin_path() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let (status, body) = call(&app, get_request("/admin/foo")).await;
    assert_eq!(status, StatusCode::OK);
    let echoed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(echoed["path"], "/admin/foo");
}

#[tokio::test]
async fn test_media_is_served_from_disk() {
    let site = Site::new();
    let app = site.app(&closed_upstream().await);

    let (status, body) = call(&app, get_request("/media/x.jpg")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"jpeg bytes");

    let (status, _) = call(&app, get_request("/media/missing.jpg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_and_spa_fallback() {
    let site = Site::new();
    let app = site.app(&closed_upstream().await);

    let (status, body) = call(&app, get_request("/assets/app.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"console.log('foodgram');");

    for path in ["/some/spa/route", "/recipes/42", "/"] {
        let (status, body) = call(&app, get_request(path)).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(&body[..], INDEX_HTML.as_bytes(), "{path}");
    }
}

#[tokio::test]
async fn test_traversal_never_leaves_the_roots() {
    let site = Site::new();
    let app = site.app(&closed_upstream().await);

    for path in ["/media/../secret.txt", "/media/%2e%2e/secret.txt"] {
        let (status, body) = call(&app, get_request(path)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_ne!(&body[..], b"do not serve");
    }

    let (_, body) = call(&app, get_request("/../secret.txt")).await;
    assert_ne!(&body[..], b"do not serve");
}

#[tokio::test]
async fn test_declared_oversized_body_is_rejected() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/recipes/")
        .header(header::CONTENT_LENGTH, 11 * 1024 * 1024)
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_streamed_oversized_body_is_rejected() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let chunks = (0..11).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; 1024 * 1024])));
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/me/avatar/")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let small = Request::builder()
        .method("POST")
        .uri("/api/users/")
        .body(Body::from(vec![b'x'; 1024 * 1024]))
        .unwrap();
    let (status, _) = call(&app, small).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let site = Site::new();
    let app = site.app(&closed_upstream().await);

    let (status, _) = call(&app, get_request("/api/tags/")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_slow_upstream_is_gateway_timeout() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let (status, _) = call(&app, get_request("/slow/")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_gateway_over_a_real_socket() {
    let site = Site::new();
    let app = site.app(&spawn_upstream().await);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::new();

    let health = client
        .get(format!("http://{addr}/gateway/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let echoed: Value = client
        .get(format!("http://{addr}/api/foo"))
        .header(reqwest::header::HOST, "foodgram.example")
        .header("x-forwarded-for", "203.0.113.9")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echoed["path"], "/api/foo");
    assert_eq!(echoed["host"], "foodgram.example");
    assert_eq!(echoed["forwarded_for"], "203.0.113.9, 127.0.0.1");

    let page = client
        .get(format!("http://{addr}/some/spa/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), reqwest::StatusCode::OK);
    assert_eq!(page.text().await.unwrap(), INDEX_HTML);
}
