//! `POST /share`: relay a post to the external posting service
//!
//! The upstream status and body are returned unchanged, the body wrapped as
//! `{"post_status": ...}`. Only a failed exchange becomes a 502. Upstream
//! statuses that forbid a body (1xx, 204, 205, 304) are answered with 200 so
//! the wrapper still reaches the caller.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::relay::ShareRequest;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

pub async fn share_post<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if exceeds_content_length(&req, max_body_size) {
        return http::build_413_response();
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large (max: {max_body_size} bytes)"
            ));
            return http::build_413_response();
        }
        Err(e) => return bad_request(&format!("Failed to read request body: {e}")),
    };

    let share: ShareRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return bad_request(&format!("Invalid share request: {e}")),
    };

    match state.relay.post(&share).await {
        Ok(upstream) => {
            let status = reply_status(upstream.status);
            if !status.is_success() {
                logger::log_warning(&format!(
                    "Posting service answered {status} for platforms {:?}",
                    share.platforms
                ));
            }
            http::build_json_response(
                status,
                &serde_json::json!({ "post_status": upstream.body }),
                false,
            )
        }
        Err(e) => {
            logger::log_error(&format!("Relay to {} failed: {e}", state.relay.api_url()));
            http::build_json_response(
                StatusCode::BAD_GATEWAY,
                &serde_json::json!({ "detail": e.to_string() }),
                false,
            )
        }
    }
}

/// Status sent back for an upstream status code
fn reply_status(upstream: u16) -> StatusCode {
    match StatusCode::from_u16(upstream) {
        Ok(status)
            if status.is_informational()
                || matches!(
                    status,
                    StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
                ) =>
        {
            StatusCode::OK
        }
        Ok(status) => status,
        Err(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Reject early when the declared Content-Length is over the limit
fn exceeds_content_length<B>(req: &Request<B>, max_body_size: u64) -> bool {
    let Some(content_length) = req.headers().get("content-length") else {
        return false;
    };
    match content_length.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Some(_) => false,
        None => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            false
        }
    }
}

fn bad_request(message: &str) -> Response<Full<Bytes>> {
    logger::log_warning(message);
    http::build_json_response(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({ "detail": message }),
        false,
    )
}
