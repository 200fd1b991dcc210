use crate::error::PredictError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// `PredictError` rendered for the form surface: plain-text body.
#[derive(Debug)]
pub struct FormError(pub PredictError);

/// Failure on the JSON surface, rendered as a `{"detail": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    Predict(PredictError),
    /// Body is not a JSON object.
    MalformedBody(String),
}

impl From<PredictError> for FormError {
    fn from(e: PredictError) -> Self {
        Self(e)
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        Self::Predict(e)
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PredictError::ModelUnavailable { reason } => {
                tracing::error!("form request with no model loaded: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error: the model has not been loaded. Check the server logs.".to_string(),
                )
            }
            PredictError::InvalidFeatureValue { .. } => (
                StatusCode::BAD_REQUEST,
                format!("An error occurred during prediction: {}", self.0),
            ),
            PredictError::Inference(_) => {
                tracing::error!("form prediction failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred during prediction: {}", self.0),
                )
            }
        };
        (status, message).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::MalformedBody(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("request body must be a JSON object of feature values: {}", msg),
            ),
            ApiError::Predict(PredictError::ModelUnavailable { reason }) => {
                tracing::error!("api request with no model loaded: {}", reason);
                (StatusCode::SERVICE_UNAVAILABLE, "Model is not loaded.".to_string())
            }
            ApiError::Predict(e @ PredictError::InvalidFeatureValue { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Predict(e @ PredictError::Inference(_)) => {
                tracing::error!("api prediction failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error during prediction: {}", e),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
