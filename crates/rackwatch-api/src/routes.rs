use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

/// Accepts one reading and returns the pipeline's response with its status
/// code mapped onto the HTTP layer.
pub async fn ingest(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let Value::Object(reading) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "request body must be a JSON object" })),
        )
            .into_response();
    };

    let outcome = state.pipeline.handle(reading).await;

    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&outcome.body)
        .unwrap_or_else(|_| Value::String(outcome.body.clone()));
    (status, Json(body)).into_response()
}
