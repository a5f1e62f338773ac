//! Directory listing and download endpoints
//!
//! Maps [`FileError`] to 403/404/500 with a short JSON detail.

use crate::config::AppState;
use crate::files::{FileEntry, FileError};
use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

/// Body of `GET /api/files`
#[derive(Debug, Serialize)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
    pub total: usize,
}

impl From<Vec<FileEntry>> for FileListing {
    fn from(files: Vec<FileEntry>) -> Self {
        Self {
            total: files.len(),
            files,
        }
    }
}

/// `GET /api/files`
pub async fn list_api(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.directory.list().await {
        Ok(entries) => {
            http::build_json_response(StatusCode::OK, &FileListing::from(entries), is_head)
        }
        Err(e) => error_response(&e, is_head),
    }
}

/// `GET /files`
pub async fn list_page(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.directory.list().await {
        Ok(entries) => http::build_html_response(render_listing_page(&entries), is_head),
        Err(e) => error_response(&e, is_head),
    }
}

/// `GET /download/{name}`
pub async fn download(state: &Arc<AppState>, name: &str, is_head: bool) -> Response<Full<Bytes>> {
    match state.directory.download(name).await {
        Ok(file) => http::build_attachment_response(file, is_head),
        Err(e) => error_response(&e, is_head),
    }
}

pub const fn status_for(error: &FileError) -> StatusCode {
    match error {
        FileError::AccessDenied(_) => StatusCode::FORBIDDEN,
        FileError::NotFound(_) => StatusCode::NOT_FOUND,
        FileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &FileError, is_head: bool) -> Response<Full<Bytes>> {
    let detail = match error {
        FileError::AccessDenied(_) => "Access denied".to_string(),
        FileError::NotFound(_) => "File not found".to_string(),
        FileError::Internal(_) => error.to_string(),
    };
    http::build_json_response(
        status_for(error),
        &serde_json::json!({ "detail": detail }),
        is_head,
    )
}

fn render_listing_page(entries: &[FileEntry]) -> String {
    let mut rows = String::new();
    for entry in entries {
        let _ = writeln!(
            rows,
            "            <tr><td><a href=\"{url}\">{name}</a></td><td class=\"size\">{size}</td></tr>",
            url = escape_html(&entry.download_url),
            name = escape_html(&entry.name),
            size = escape_html(&entry.formatted_size),
        );
    }
    if entries.is_empty() {
        rows.push_str("            <tr><td colspan=\"2\" class=\"empty\">No files available</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Files</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            margin: 40px auto;
            max-width: 800px;
            color: #1f2937;
        }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 8px 12px; border-bottom: 1px solid #e5e7eb; text-align: left; }}
        td.size {{ text-align: right; white-space: nowrap; }}
        td.empty {{ text-align: center; color: #6b7280; }}
        a {{ color: #2563eb; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <h1>Files</h1>
    <p>{count} file(s)</p>
    <table>
        <thead><tr><th>Name</th><th class="size">Size</th></tr></thead>
        <tbody>
{rows}        </tbody>
    </table>
</body>
</html>"#,
        count = entries.len(),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
