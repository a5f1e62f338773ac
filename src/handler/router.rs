//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, method
//! validation, dispatch, and access logging.

use crate::config::AppState;
use crate::handler::{files, share};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const READ_METHODS: &str = "GET, HEAD, OPTIONS";
const WRITE_METHODS: &str = "POST, OPTIONS";

/// Endpoints served by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Health,
    FilePage,
    FileApi,
    /// Percent-decoded file name after `/download/`
    Download(String),
    Share,
    Unknown,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" => Self::Greeting,
            "/healthz" => Self::Health,
            "/files" | "/files/" => Self::FilePage,
            "/api/files" => Self::FileApi,
            "/share" => Self::Share,
            _ => match path.strip_prefix("/download/") {
                Some(raw) => Self::Download(percent_decode_str(raw).decode_utf8_lossy().into_owned()),
                None => Self::Unknown,
            },
        }
    }

    const fn allowed_methods(&self) -> &'static str {
        match self {
            Self::Share => WRITE_METHODS,
            _ => READ_METHODS,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.access_log_enabled();

    let mut entry = access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.map_or_else(|| "-".to_string(), |a| a.ip().to_string()),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry
    });

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = route_request(req, &state).await;

    if let Ok(value) = state.config.http.server_name.parse() {
        response.headers_mut().insert(hyper::header::SERVER, value);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match the path, validate the method, and dispatch
async fn route_request<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let route = Route::from_path(req.uri().path());
    if route == Route::Unknown {
        return http::build_404_response();
    }

    let method = req.method().clone();
    let allow = route.allowed_methods();
    if method == Method::OPTIONS {
        return http::build_options_response(allow, state.config.http.enable_cors);
    }

    let is_head = method == Method::HEAD;
    let is_read = method == Method::GET || is_head;
    match route {
        Route::Share if method == Method::POST => share::share_post(req, state).await,
        Route::Share => method_not_allowed(&method, allow),
        _ if !is_read => method_not_allowed(&method, allow),
        Route::Greeting => http::build_json_response(
            hyper::StatusCode::OK,
            &serde_json::json!({ "message": state.config.http.greeting }),
            is_head,
        ),
        Route::Health => http::build_health_response("ok"),
        Route::FilePage => files::list_page(state, is_head).await,
        Route::FileApi => files::list_api(state, is_head).await,
        Route::Download(name) => files::download(state, &name, is_head).await,
        Route::Unknown => http::build_404_response(),
    }
}

fn method_not_allowed(method: &Method, allow: &str) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Method not allowed: {method}"));
    http::build_405_response(allow)
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
