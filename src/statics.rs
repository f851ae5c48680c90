//! Static file responder: containment-checked path resolution, conditional
//! requests, and single-range partial content.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// URL prefix served from the filesystem. Case-sensitive, trailing slash
/// included, so "/static" without the slash still reaches the gateway.
pub const STATIC_PREFIX: &str = "/static/";

/// Serves one static request to completion. Always produces a terminal
/// response: exactly one of 200, 206, 304, or 404.
pub async fn respond(req: &Request, static_root: &Path) -> Response {
    let Some(full_path) = resolve(&req.path, static_root).await else {
        return Response::not_found();
    };

    let mtime = match tokio::fs::metadata(&full_path)
        .await
        .and_then(|m| m.modified())
    {
        Ok(t) => t,
        Err(e) => {
            warn!("Failed to stat {}: {}", full_path.display(), e);
            return Response::not_found();
        }
    };

    let content = match tokio::fs::read(&full_path).await {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            warn!("Failed to read {}: {}", full_path.display(), e);
            return Response::not_found();
        }
    };

    let last_modified = httpdate::fmt_http_date(mtime);
    let etag = content_etag(&content);

    // Conditional evaluation is exact string comparison only: no tag lists,
    // no weak tags, no date ordering.
    let etag_matches = req
        .if_none_match
        .as_deref()
        .map(|v| v.trim_matches('"') == etag.trim_matches('"'))
        .unwrap_or(false);
    let date_matches = req.if_modified_since.as_deref() == Some(last_modified.as_str());

    if etag_matches || date_matches {
        return Response::not_modified();
    }

    let total = content.len();
    let (status, body, content_range) = match req.range.as_deref() {
        Some(header) => match parse_range(header, total) {
            Some((start, end)) => (
                StatusCode::PartialContent,
                content.slice(start..end.min(total - 1) + 1),
                Some(format!("bytes {start}-{end}/{total}")),
            ),
            None => {
                // Unsatisfiable ranges map to 404, matching the deployed
                // behavior rather than 416.
                warn!("Invalid Range header: {}", header);
                return Response::not_found();
            }
        },
        None => (StatusCode::Ok, content.clone(), None),
    };

    let mime_type = mime_guess::from_path(&full_path)
        .first_or_octet_stream()
        .to_string();

    let mut builder = ResponseBuilder::new(status)
        .header("Content-Type", mime_type)
        .header("Content-Length", body.len().to_string())
        .header("Last-Modified", last_modified)
        .header("ETag", etag)
        .header("Connection", "close");

    if let Some(content_range) = content_range {
        builder = builder.header("Content-Range", content_range);
    }

    // HEAD reports the same headers a GET would but sends no body.
    let body = if req.is_head() { Bytes::new() } else { body };

    builder.body(body.to_vec()).build()
}

/// Resolves a request path to a file strictly contained under the static
/// root. Traversal escapes, missing files, and directories without an
/// index.html all resolve to `None`.
async fn resolve(path: &str, static_root: &Path) -> Option<PathBuf> {
    let root = tokio::fs::canonicalize(static_root).await.ok()?;

    let relative = path.strip_prefix(STATIC_PREFIX)?;
    let mut full = tokio::fs::canonicalize(root.join(relative)).await.ok()?;

    if !full.starts_with(&root) {
        return None;
    }

    if tokio::fs::metadata(&full).await.ok()?.is_dir() {
        full = full.join("index.html");
        if !tokio::fs::metadata(&full).await.map(|m| m.is_file()).unwrap_or(false) {
            return None;
        }
    }

    Some(full)
}

/// Entity tag: quoted hex SHA-256 of the full content, recomputed per
/// request.
fn content_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("\"{hex}\"")
}

/// Parses the single accepted form `bytes=<start>-<end>`, `<end>` optional
/// and defaulting to the last byte. Returns `None` for anything the server
/// rejects: unparseable specs, start > end, or start out of bounds.
fn parse_range(header: &str, total: usize) -> Option<(usize, usize)> {
    let spec = header.strip_prefix("bytes=")?;
    let (start_str, end_str) = spec.split_once('-')?;

    let start: usize = start_str.trim().parse().ok()?;
    let end: usize = if end_str.trim().is_empty() {
        total.checked_sub(1)?
    } else {
        end_str.trim().parse().ok()?
    };

    if start > end || start >= total {
        return None;
    }

    Some((start, end))
}
