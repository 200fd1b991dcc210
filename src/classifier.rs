use anyhow::{bail, Result};

/// Raw classifier output for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    /// Index into the label decoder's class list.
    pub class_index: usize,
    /// One probability per class, in class-index order, when the backend has them.
    pub probabilities: Option<Vec<f64>>,
}

/// A fitted classifier over already-scaled rows.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;
    fn n_classes(&self) -> usize;
    fn predict(&self, row: &[f64]) -> Result<ClassScores>;
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::INFINITY {
        // all mass is shared by the +inf logits
        let n = logits.iter().filter(|z| **z == f64::INFINITY).count() as f64;
        return logits
            .iter()
            .map(|z| if *z == f64::INFINITY { 1.0 / n } else { 0.0 })
            .collect();
    }
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Logistic regression: one coefficient row per class (softmax), or a single
/// row for a binary model (sigmoid over class 1).
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            bail!("linear classifier has no coefficient rows");
        }
        if coefficients.len() != intercepts.len() {
            bail!(
                "coefficient rows ({}) != intercepts ({})",
                coefficients.len(),
                intercepts.len()
            );
        }
        let n_features = coefficients[0].len();
        if let Some(bad) = coefficients.iter().position(|r| r.len() != n_features) {
            bail!(
                "coefficient row {} has {} columns, expected {}",
                bad,
                coefficients[bad].len(),
                n_features
            );
        }
        Ok(Self {
            coefficients,
            intercepts,
            n_features,
        })
    }

    fn decision_function(&self, row: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        if self.coefficients.len() == 1 {
            2
        } else {
            self.coefficients.len()
        }
    }

    fn predict(&self, row: &[f64]) -> Result<ClassScores> {
        if row.len() != self.n_features {
            bail!(
                "feature length mismatch: got {}, expected {}",
                row.len(),
                self.n_features
            );
        }
        let z = self.decision_function(row);
        let probs = if z.len() == 1 {
            let p = 1.0 / (1.0 + (-z[0]).exp());
            vec![1.0 - p, p]
        } else {
            softmax(&z)
        };
        let Some(class_index) = argmax(&probs) else {
            bail!("classifier produced no scores");
        };
        Ok(ClassScores {
            class_index,
            probabilities: Some(probs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1000.0, 999.0, -5.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p.iter().all(|x| *x >= 0.0));
        assert!(p[0] > p[1] && p[1] > p[2]);
    }

    #[test]
    fn softmax_handles_infinite_logits() {
        assert_eq!(softmax(&[f64::INFINITY, 3.0, f64::NEG_INFINITY]), vec![1.0, 0.0, 0.0]);
        assert_eq!(softmax(&[f64::INFINITY, f64::INFINITY]), vec![0.5, 0.5]);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn multiclass_picks_highest_logit() {
        let clf = LinearClassifier::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(clf.n_classes(), 3);
        let out = clf.predict(&[0.0, 3.0]).unwrap();
        assert_eq!(out.class_index, 1);
        let p = out.probabilities.unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn binary_row_uses_sigmoid() {
        let clf = LinearClassifier::new(vec![vec![2.0]], vec![0.0]).unwrap();
        assert_eq!(clf.n_classes(), 2);
        let out = clf.predict(&[1.0]).unwrap();
        assert_eq!(out.class_index, 1);
        let p = out.probabilities.unwrap();
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);

        let out = clf.predict(&[-1.0]).unwrap();
        assert_eq!(out.class_index, 0);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(LinearClassifier::new(vec![], vec![]).is_err());
        assert!(LinearClassifier::new(vec![vec![1.0]], vec![0.0, 1.0]).is_err());
        assert!(LinearClassifier::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0.0, 0.0]).is_err());

        let clf = LinearClassifier::new(vec![vec![1.0, 1.0]], vec![0.0]).unwrap();
        assert!(clf.predict(&[1.0]).is_err());
    }
}
