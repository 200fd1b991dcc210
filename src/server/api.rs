use super::{ApiError, AppState};
use crate::format::ApiPrediction;
use crate::normalize::RawInput;
use crate::pipeline;
use axum::{body::Bytes, extract::State, Json};
use serde_json::{Map, Value};

// Body is a flat object of feature -> number | null; absent keys read as 0.0.
// Parsed by hand so a missing model answers 503 whatever the body looks like.
pub(super) async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiPrediction>, ApiError> {
    state.model.artifact()?;
    let body: Map<String, Value> =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    let raw = RawInput::from_json(body);
    let p = pipeline::predict(&state.model, &raw)?;
    Ok(Json(p.result.into()))
}
