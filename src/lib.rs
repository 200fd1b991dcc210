//! Serving layer for a fitted KOI disposition classifier.
//!
//! A request flows `RawInput -> normalize -> scale -> classify -> decode`,
//! and the result is shaped for either the HTML form or the JSON API.

pub mod classifier;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod scaler;
pub mod schema;
pub mod server;
#[cfg(feature = "torch")]
pub mod torch;

pub use error::PredictError;
pub use model::{ModelArtifact, ModelState};
pub use normalize::{normalize, NormalizedInput, RawInput, RawValue};
pub use pipeline::{predict, Prediction, PredictionResult};
pub use schema::FeatureSchema;
