//! Static file and single-page application serving

use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

/// Point the request at `path` inside the served directory
fn with_path(mut request: Request, path: &str) -> Result<Request, StatusCode> {
    let uri: Uri = path.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    *request.uri_mut() = uri;
    Ok(request)
}

/// Serve `path` from `root`; missing files and escaping paths are 404
pub async fn serve_dir(root: &Path, path: &str, request: Request) -> Response {
    let request = match with_path(request, path) {
        Ok(request) => request,
        Err(status) => return status.into_response(),
    };

    debug!(root = %root.display(), path = %path, "Serving static file");

    match ServeDir::new(root).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

/// Serve a file from the application root, or its entry file with 200
pub async fn serve_spa(root: &Path, index_file: &str, request: Request) -> Response {
    let index = root.join(index_file);
    let service = ServeDir::new(root).fallback(ServeFile::new(index));

    match service.oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
