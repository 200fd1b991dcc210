use thiserror::Error;

/// Failure of a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The artifact failed to load at startup; nothing is served until restart.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("invalid value for feature '{feature}': {value:?}")]
    InvalidFeatureValue { feature: String, value: String },

    /// Scaler/classifier/decoder failure not caused by the caller's input.
    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}

impl PredictError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable { reason: reason.into() }
    }

    pub fn invalid(feature: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFeatureValue {
            feature: feature.into(),
            value: value.into(),
        }
    }

    /// True for errors caused by the request payload.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFeatureValue { .. })
    }
}

impl From<anyhow::Error> for PredictError {
    fn from(e: anyhow::Error) -> Self {
        Self::Inference(e)
    }
}
