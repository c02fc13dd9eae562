/**
 * Error Conversion
 *
 * This module provides the HTTP response conversion for chat errors,
 * allowing handlers to return `Result<_, ChatError>` directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "only the group owner can do this",
 *   "kind": "not_owner",
 *   "status": 403
 * }
 * ```
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::ChatError;

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!("[Http] {}", self);
        } else {
            tracing::debug!("[Http] request failed: {} ({})", self, self.kind());
        }

        let body = serde_json::json!({
            "error": self.message(),
            "kind": self.kind(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
