use axum::http::StatusCode;
use axum::Json;
use tracing::error;

/// Every rejected request carries a `{"detail": ...}` body so clients can
/// show the message verbatim.
pub fn detail_response(status: StatusCode, detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "detail": detail })))
}

pub fn bad_request(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    detail_response(StatusCode::BAD_REQUEST, detail)
}

pub fn unauthorized(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    detail_response(StatusCode::UNAUTHORIZED, detail)
}

pub fn forbidden(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    detail_response(StatusCode::FORBIDDEN, detail)
}

pub fn not_found(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    detail_response(StatusCode::NOT_FOUND, detail)
}

/// Log the underlying failure and hand the caller a generic message.
pub fn internal_server_error<E: std::fmt::Display>(e: E) -> (StatusCode, Json<serde_json::Value>) {
    error!("Internal server error: {}", e);
    detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
