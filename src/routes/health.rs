use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// Returns a simple JSON response indicating the server is operational.
/// Used by load balancers, monitoring systems, and container orchestrators
/// to verify service availability.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status":"pong"}`
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}
