use crate::pipeline::{Prediction, PredictionResult};
use crate::schema::FeatureSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Body returned by the JSON surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiPrediction {
    pub predicted_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, f64>>,
}

impl From<PredictionResult> for ApiPrediction {
    fn from(r: PredictionResult) -> Self {
        Self {
            predicted_class: r.label,
            probabilities: r.probabilities,
        }
    }
}

/// Data behind the human-facing result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub prediction: String,
    /// Post-normalization values in schema order, for auditing what the model saw.
    pub system_data: Vec<(String, f64)>,
}

impl FormView {
    pub fn new(p: &Prediction, schema: &FeatureSchema) -> Self {
        Self {
            prediction: p.result.label.clone(),
            system_data: p
                .input
                .named(schema)
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}
