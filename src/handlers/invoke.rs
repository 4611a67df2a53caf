use crate::dispatch::{self, InvokeRequest, InvokeResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /invoke - Execute one tool invocation.
///
/// Always responds 200: business failures (unknown tool, bad parameters,
/// safety rejection, backend failure) are carried inside the envelope.
/// Malformed JSON is rejected by the extractor before this handler runs.
pub async fn invoke_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> Json<InvokeResponse> {
    Json(dispatch::invoke(&state, request).await)
}
