//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::Router;
use file_router::routing::MethodHandler;
use tempfile::TempDir;
use tower::ServiceExt;

/// Write `files` (relative path, contents) under a fresh temp directory.
pub fn route_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, contents) in files {
        write_file(dir.path(), relative, contents);
    }
    dir
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Handler answering with a fixed body.
pub fn reply(body: &'static str) -> MethodHandler {
    MethodHandler::new(move |_req| async move { body })
}

/// Drive one request through `router`, returning status and body text.
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let (status, _, body) = fetch(router, method, uri).await;
    (status, body)
}

/// Like [`send`], also returning the `content-type` header.
pub async fn fetch(router: &Router, method: Method, uri: &str) -> (StatusCode, String, String) {
    let request = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}
