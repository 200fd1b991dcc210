//! HTTP surfaces over the shared prediction pipeline.
//!
//! * `GET  /`            form page, one input per schema feature
//! * `POST /predict`     urlencoded form -> HTML result page
//! * `POST /api/predict` JSON object -> JSON label + class probabilities
//! * `GET  /health`      liveness and model status

mod api;
mod error;
mod form;
mod pages;

pub use error::{ApiError, FormError};

use crate::model::ModelState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelState>,
}

impl AppState {
    pub fn new(model: ModelState) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form::index))
        .route("/predict", post(form::predict))
        .route("/api/predict", post(api::predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    timestamp: i64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.model.is_ready(),
        timestamp: now_ms,
    })
}
