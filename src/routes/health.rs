use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::dto::envelope::ApiResponse;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, ApiResponse::ok(json!({ "status": "ok" })))
}
