//! Availability check, normalization, scaling, classification and decoding
//! for a single request.

use crate::error::PredictError;
use crate::model::{ModelArtifact, ModelState};
use crate::normalize::{normalize, NormalizedInput, RawInput};
use crate::schema::FeatureSchema;
use anyhow::anyhow;
use std::collections::BTreeMap;

/// Allowed drift of a probability row's sum from 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: String,
    /// Class label -> probability, when the classifier exposes them.
    pub probabilities: Option<BTreeMap<String, f64>>,
}

/// A prediction together with the vector the model actually saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub input: NormalizedInput,
    pub result: PredictionResult,
}

/// Scale, classify and decode one normalized row.
pub fn infer(artifact: &ModelArtifact, input: &NormalizedInput) -> Result<PredictionResult, PredictError> {
    let scaled = artifact.scaler().transform(input.values())?;
    // A finite input can still overflow once centred and divided by a small scale.
    if let Some(i) = scaled.iter().position(|x| !x.is_finite()) {
        let feature = artifact.schema().names().get(i).map_or("?", String::as_str);
        return Err(PredictError::invalid(feature, input.values()[i].to_string()));
    }
    let scores = artifact.classifier().predict(&scaled)?;
    let decoder = artifact.decoder();
    let label = decoder.decode(scores.class_index)?.to_string();

    let probabilities = match scores.probabilities {
        None => None,
        Some(p) => {
            check_probabilities(&p, decoder.len())?;
            Some(decoder.classes().iter().cloned().zip(p).collect())
        }
    };

    Ok(PredictionResult { label, probabilities })
}

fn check_probabilities(p: &[f64], n_classes: usize) -> Result<(), PredictError> {
    if p.len() != n_classes {
        return Err(anyhow!(
            "classifier returned {} probabilities for {} classes",
            p.len(),
            n_classes
        )
        .into());
    }
    if p.iter().any(|x| !x.is_finite() || *x < 0.0) {
        return Err(anyhow!("classifier returned invalid probabilities: {:?}", p).into());
    }
    let sum: f64 = p.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(anyhow!("probabilities sum to {}, not 1", sum).into());
    }
    Ok(())
}

/// Full request path. Fails with `ModelUnavailable` before touching the input.
pub fn predict(state: &ModelState, raw: &RawInput) -> Result<Prediction, PredictError> {
    let artifact = state.artifact()?;
    let schema = artifact.schema();

    for k in raw.unknown_keys(schema) {
        tracing::debug!(feature = k, "ignoring feature not in schema");
    }

    let input = normalize(raw, schema)?;
    trace_input(&input, schema);

    let result = infer(artifact, &input)?;
    tracing::debug!(label = %result.label, "prediction");
    Ok(Prediction { input, result })
}

// Summary of what reaches the model, so all-zero requests stand out.
fn trace_input(input: &NormalizedInput, schema: &FeatureSchema) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let v = input.values();
    let nz = v.iter().filter(|x| **x != 0.0).count();
    let mean = if v.is_empty() { 0.0 } else { v.iter().sum::<f64>() / v.len() as f64 };
    let std = if v.len() < 2 {
        0.0
    } else {
        (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / v.len() as f64).sqrt()
    };
    let sample: Vec<String> = input
        .named(schema)
        .take(6)
        .map(|(name, x)| format!("{}={:.3}", name, x))
        .collect();
    tracing::debug!(
        "in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        v.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
