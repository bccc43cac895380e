//! HTTP content delivery shared by all backends.
//!
//! Works on an opened [`AssetFile`] only: conditional requests are evaluated
//! against its metadata, only the served byte range is read and the content
//! type is inferred from its name.

use crate::content_type::content_type_for;
use crate::traits::{AssetFile, AssetMetadata, StorageError, StorageResult};
use axum::body::Body;
use axum::response::Response;
use chrono::{DateTime, Utc};
use http::response::Builder;
use http::{header, HeaderMap, HeaderName, Method, StatusCode};
use tokio_util::io::ReaderStream;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date. Returns `None` for anything that is not an IMF-fixdate.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precondition {
    Proceed,
    NotModified,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    Full,
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Build the response serving `asset` for a request with the given method and headers.
///
/// Status is one of 200, 206, 304, 412 or 416. The asset's content is dropped
/// unread when no body is sent; otherwise only the served range is read and
/// its reader is owned by the body stream.
pub async fn serve_content(
    method: &Method,
    headers: &HeaderMap,
    asset: AssetFile,
) -> StorageResult<Response> {
    let AssetFile {
        name,
        metadata,
        content,
    } = asset;

    match check_preconditions(method, headers, &metadata) {
        Precondition::Proceed => {}
        Precondition::NotModified => {
            tracing::debug!(name = %name, "Asset not modified");
            return build(not_modified(&metadata).body(Body::empty()));
        }
        Precondition::Failed => {
            tracing::debug!(name = %name, "Asset precondition failed");
            return build(
                Response::builder()
                    .status(StatusCode::PRECONDITION_FAILED)
                    .body(Body::empty()),
            );
        }
    }

    let size = metadata.size;
    let range = match header_str(headers, header::RANGE) {
        Some(value) if if_range_allows(headers, &metadata) => parse_range(value, size),
        _ => ByteRange::Full,
    };

    let mut builder = with_validators(Response::builder(), &metadata)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_TYPE, content_type_for(&name));

    let (status, start, length) = match range {
        ByteRange::Full => (StatusCode::OK, 0, size),
        ByteRange::Partial { start, end } => {
            builder = builder.header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, size),
            );
            (StatusCode::PARTIAL_CONTENT, start, end - start + 1)
        }
        ByteRange::Unsatisfiable => {
            tracing::debug!(name = %name, size, "Requested range not satisfiable");
            return build(
                Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(header::CONTENT_RANGE, format!("bytes */{}", size))
                    .body(Body::empty()),
            );
        }
    };

    let builder = builder
        .status(status)
        .header(header::CONTENT_LENGTH, length);

    tracing::debug!(
        name = %name,
        status = status.as_u16(),
        offset = start,
        length,
        "Serving asset"
    );

    if method == Method::HEAD {
        return build(builder.body(Body::empty()));
    }

    let reader = content.read_range(start, length).await?;
    let body = Body::from_stream(ReaderStream::new(reader));
    build(builder.body(body))
}

fn build(result: Result<Response, http::Error>) -> StorageResult<Response> {
    result.map_err(|e| StorageError::backend("Failed to build response", e))
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name)?.to_str().ok()
}

fn with_validators(mut builder: Builder, metadata: &AssetMetadata) -> Builder {
    if let Some(last_modified) = metadata.last_modified {
        builder = builder.header(header::LAST_MODIFIED, format_http_date(last_modified));
    }
    if let Some(ref etag) = metadata.etag {
        builder = builder.header(header::ETAG, etag.as_str());
    }
    builder
}

fn not_modified(metadata: &AssetMetadata) -> Builder {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    match (&metadata.etag, metadata.last_modified) {
        (Some(etag), _) => builder = builder.header(header::ETAG, etag.as_str()),
        (None, Some(last_modified)) => {
            builder = builder.header(header::LAST_MODIFIED, format_http_date(last_modified))
        }
        (None, None) => {}
    }
    builder
}

/// Split an entity tag into its weakness flag and opaque value, quotes removed.
fn opaque_tag(tag: &str) -> (bool, &str) {
    let tag = tag.trim();
    match tag.strip_prefix("W/") {
        Some(rest) => (true, rest.trim_matches('"')),
        None => (false, tag.trim_matches('"')),
    }
}

/// Whether one of the comma-separated tags in `list` matches `etag`.
///
/// Strong comparison rejects weak tags on either side.
fn etag_matches(list: &str, etag: Option<&str>, weak: bool) -> bool {
    list.split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| {
            if candidate == "*" {
                return true;
            }
            let Some(etag) = etag else {
                return false;
            };
            let (candidate_weak, candidate) = opaque_tag(candidate);
            let (current_weak, current) = opaque_tag(etag);
            if !weak && (candidate_weak || current_weak) {
                return false;
            }
            !current.is_empty() && candidate == current
        })
}

fn check_preconditions(
    method: &Method,
    headers: &HeaderMap,
    metadata: &AssetMetadata,
) -> Precondition {
    let etag = metadata.etag.as_deref();
    let safe_method = method == Method::GET || method == Method::HEAD;

    if let Some(if_match) = header_str(headers, header::IF_MATCH) {
        if !etag_matches(if_match, etag, false) {
            return Precondition::Failed;
        }
    } else if let (Some(since), Some(last_modified)) = (
        header_str(headers, header::IF_UNMODIFIED_SINCE).and_then(parse_http_date),
        metadata.last_modified,
    ) {
        if last_modified.timestamp() > since.timestamp() {
            return Precondition::Failed;
        }
    }

    if let Some(if_none_match) = header_str(headers, header::IF_NONE_MATCH) {
        if etag_matches(if_none_match, etag, true) {
            return if safe_method {
                Precondition::NotModified
            } else {
                Precondition::Failed
            };
        }
    } else if safe_method {
        if let (Some(since), Some(last_modified)) = (
            header_str(headers, header::IF_MODIFIED_SINCE).and_then(parse_http_date),
            metadata.last_modified,
        ) {
            if last_modified.timestamp() <= since.timestamp() {
                return Precondition::NotModified;
            }
        }
    }

    Precondition::Proceed
}

/// `If-Range` lets a range through only while the validator still matches.
fn if_range_allows(headers: &HeaderMap, metadata: &AssetMetadata) -> bool {
    let Some(value) = header_str(headers, header::IF_RANGE) else {
        return true;
    };
    let value = value.trim();
    if value.starts_with('"') || value.starts_with("W/") {
        return etag_matches(value, metadata.etag.as_deref(), false);
    }
    match (parse_http_date(value), metadata.last_modified) {
        (Some(date), Some(last_modified)) => date.timestamp() == last_modified.timestamp(),
        _ => false,
    }
}

/// Parse a `Range` header against a representation of `size` bytes.
///
/// Only a single `bytes=` range is honored; multiple or malformed ranges
/// fall back to the full content.
fn parse_range(value: &str, size: u64) -> ByteRange {
    let Some(spec) = value.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    let specs: Vec<&str> = spec
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    // multipart/byteranges is not supported
    let [spec] = specs.as_slice() else {
        return ByteRange::Full;
    };
    let Some((start, end)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        let Ok(suffix) = end.parse::<u64>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || size == 0 {
            return ByteRange::Unsatisfiable;
        }
        let length = suffix.min(size);
        return ByteRange::Partial {
            start: size - length,
            end: size - 1,
        };
    }

    let Ok(start) = start.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if end.is_empty() {
        None
    } else {
        match end.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            _ => return ByteRange::Full,
        }
    };
    if start >= size {
        return ByteRange::Unsatisfiable;
    }

    ByteRange::Partial {
        start,
        end: end.map_or(size - 1, |end| end.min(size - 1)),
    }
}
