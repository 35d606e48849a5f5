use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Alive {
    pub status: String,
    pub message: String,
    pub service: String,
    pub version: String,
}

impl Default for Alive {
    fn default() -> Self {
        Alive {
            status: "OK".to_string(),
            message: "API is running".to_string(),
            service: "WestCambios API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// Implement IntoResponse for Alive
impl IntoResponse for Alive {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
