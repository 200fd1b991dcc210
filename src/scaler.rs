use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Fitted per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Transform a single row. Zero-variance columns (scale 0) are only centered.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if self.scale.len() != self.mean.len() {
            bail!(
                "scaler is inconsistent: {} means, {} scales",
                self.mean.len(),
                self.scale.len()
            );
        }
        if row.len() != self.width() {
            bail!(
                "feature length mismatch: got {}, expected {}",
                row.len(),
                self.width()
            );
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }
}
