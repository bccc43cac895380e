mod helpers;

use appfiles_storage::MemoryFs;
use axum::http::Method;
use chrono::{TimeZone, Utc};
use helpers::{fs_server, object_server};

fn notes_fs() -> MemoryFs {
    let fs = MemoryFs::new();
    fs.insert_with_modified(
        "/mynotes/1.2.0/index.html",
        "<html></html>",
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    );
    fs.insert("/mynotes/1.2.0/js/app.js", "console.log('notes')");
    fs
}

#[tokio::test]
async fn test_serve_versioned_file() {
    let server = fs_server(notes_fs());

    let response = server.get("/apps/mynotes/1.2.0/index.html").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "<html></html>");
    assert_eq!(response.header("content-type"), "text/html; charset=utf-8");
    assert_eq!(response.header("content-length"), "13");
    assert_eq!(response.header("accept-ranges"), "bytes");
    assert_eq!(
        response.header("last-modified"),
        "Fri, 01 Mar 2024 12:00:00 GMT"
    );
}

#[tokio::test]
async fn test_serve_nested_file() {
    let server = fs_server(notes_fs());

    let response = server.get("/apps/mynotes/1.2.0/js/app.js").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "console.log('notes')");
}

#[tokio::test]
async fn test_missing_file_returns_404() {
    let server = fs_server(notes_fs());

    let response = server.get("/apps/mynotes/1.2.0/missing.css").await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["recoverable"], false);
    assert!(body["details"].as_str().unwrap().contains("missing.css"));
}

#[tokio::test]
async fn test_legacy_layout_is_served() {
    let fs = MemoryFs::new();
    fs.insert("/drive/app.js", "legacy drive");
    let server = fs_server(fs);

    let response = server.get("/apps/drive/3.1.0/app.js").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "legacy drive");
}

#[tokio::test]
async fn test_if_modified_since_returns_304() {
    let server = fs_server(notes_fs());

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("If-Modified-Since", "Sat, 02 Mar 2024 00:00:00 GMT")
        .await;

    assert_eq!(response.status_code(), 304);
    assert!(response.as_bytes().is_empty());
}

#[tokio::test]
async fn test_range_request_returns_partial_content() {
    let server = fs_server(notes_fs());

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("Range", "bytes=0-5")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.header("content-range"), "bytes 0-5/13");
    assert_eq!(response.text(), "<html>");
}

#[tokio::test]
async fn test_unsatisfiable_range_returns_416() {
    let server = fs_server(notes_fs());

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("Range", "bytes=100-200")
        .await;

    assert_eq!(response.status_code(), 416);
    assert_eq!(response.header("content-range"), "bytes */13");
}

#[tokio::test]
async fn test_head_has_headers_but_no_body() {
    let server = fs_server(notes_fs());

    let response = server
        .method(Method::HEAD, "/apps/mynotes/1.2.0/index.html")
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-length"), "13");
    assert!(response.as_bytes().is_empty());
}

#[tokio::test]
async fn test_object_backend_etag_round_trip() {
    let server = object_server(&[("mynotes/1.2.0/index.html", "<html></html>")]).await;

    let response = server.get("/apps/mynotes/1.2.0/index.html").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "<html></html>");
    let etag = response.header("etag");

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("If-None-Match", etag)
        .await;
    assert_eq!(response.status_code(), 304);
    assert!(response.as_bytes().is_empty());
}

#[tokio::test]
async fn test_object_backend_has_no_legacy_fallback() {
    let server = object_server(&[("mynotes/index.html", "legacy")]).await;

    let response = server.get("/apps/mynotes/1.2.0/index.html").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_failed_if_match_returns_412() {
    let server = object_server(&[("mynotes/1.2.0/index.html", "<html></html>")]).await;

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("If-Match", "\"not-the-etag\"")
        .await;

    assert_eq!(response.status_code(), 412);
}

#[tokio::test]
async fn test_object_key_is_not_escaped() {
    let server = object_server(&[("mynotes/1.2.0/fonts/a~b.woff2", "font")]).await;

    let response = server.get("/apps/mynotes/1.2.0/fonts/a~b.woff2").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "font");
}

#[tokio::test]
async fn test_object_backend_range_request() {
    let server = object_server(&[("mynotes/1.2.0/index.html", "<html></html>")]).await;

    let response = server
        .get("/apps/mynotes/1.2.0/index.html")
        .add_header("Range", "bytes=6-")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.header("content-range"), "bytes 6-12/13");
    assert_eq!(response.text(), "</html>");
}

#[tokio::test]
async fn test_error_details_hidden_in_production() {
    let server = helpers::fs_server_in(notes_fs(), "production");

    let response = server.get("/apps/mynotes/1.2.0/missing.css").await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert!(body.get("details").is_none());
    assert_eq!(body["code"], "NOT_FOUND");
}
