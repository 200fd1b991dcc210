use crate::classifier::{Classifier, LinearClassifier};
use crate::error::PredictError;
use crate::normalize::NormalizedInput;
use crate::schema::FeatureSchema;
use crate::scaler::StandardScaler;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Deserialize)]
struct ManifestJson {
    features: Vec<String>,
    scaler: StandardScaler,
    classes: Vec<String>,
    classifier: ClassifierJson,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ClassifierJson {
    Linear {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    Torchscript {
        path: PathBuf,
    },
}

/// Maps classifier output indices back to disposition labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    /// Class labels in classifier output order; must be non-empty and unique.
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            bail!("label decoder has no classes");
        }
        let mut seen = HashSet::with_capacity(classes.len());
        for c in &classes {
            if !seen.insert(c.as_str()) {
                bail!("duplicate class label: {}", c);
            }
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("class index {} out of range (0..{})", index, self.classes.len()))
    }
}

/// Everything needed to turn a normalized row into a label. Immutable once built.
pub struct ModelArtifact {
    schema: FeatureSchema,
    scaler: StandardScaler,
    classifier: Box<dyn Classifier>,
    decoder: LabelDecoder,
}

impl ModelArtifact {
    pub fn new(
        schema: FeatureSchema,
        scaler: StandardScaler,
        classifier: Box<dyn Classifier>,
        decoder: LabelDecoder,
    ) -> Self {
        Self {
            schema,
            scaler,
            classifier,
            decoder,
        }
    }

    /// Read a JSON manifest. Widths are not cross-checked here; `ModelState::ready`
    /// does that before its warmup inference.
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read model manifest at {}", path.display()))?;
        let manifest: ManifestJson = serde_json::from_str(&txt)
            .with_context(|| format!("failed to parse model manifest {}", path.display()))?;

        let schema = FeatureSchema::new(manifest.features)?;
        let classifier: Box<dyn Classifier> = match manifest.classifier {
            ClassifierJson::Linear {
                coefficients,
                intercepts,
            } => Box::new(LinearClassifier::new(coefficients, intercepts)?),
            ClassifierJson::Torchscript { path: model_path } => {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                load_torchscript(&base.join(model_path), schema.len())?
            }
        };

        Ok(Self::new(
            schema,
            manifest.scaler,
            classifier,
            LabelDecoder::new(manifest.classes)?,
        ))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn decoder(&self) -> &LabelDecoder {
        &self.decoder
    }
}

#[cfg(feature = "torch")]
fn load_torchscript(path: &Path, in_dim: usize) -> Result<Box<dyn Classifier>> {
    Ok(Box::new(crate::torch::TorchClassifier::load(path, in_dim)?))
}

#[cfg(not(feature = "torch"))]
fn load_torchscript(path: &Path, _in_dim: usize) -> Result<Box<dyn Classifier>> {
    anyhow::bail!(
        "manifest references TorchScript model {} but this build lacks the `torch` feature",
        path.display()
    )
}

fn check_shapes(artifact: &ModelArtifact) -> Result<()> {
    let width = artifact.schema().len();
    if artifact.scaler().width() != width {
        bail!(
            "scaler width {} does not match {} schema features",
            artifact.scaler().width(),
            width
        );
    }
    if artifact.classifier().n_features() != width {
        bail!(
            "classifier width {} does not match {} schema features",
            artifact.classifier().n_features(),
            width
        );
    }
    if artifact.classifier().n_classes() != artifact.decoder().len() {
        bail!(
            "classifier has {} classes but {} labels are defined",
            artifact.classifier().n_classes(),
            artifact.decoder().len()
        );
    }
    Ok(())
}

/// Process-wide model handle, decided once at startup.
pub enum ModelState {
    Ready(Arc<ModelArtifact>),
    Unavailable { reason: String },
}

impl ModelState {
    /// Load and warm up the artifact. Any failure yields `Unavailable`.
    pub fn load(path: &Path) -> Self {
        let artifact = match ModelArtifact::load(path) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(path = %path.display(), "model load failed: {:#}", e);
                return Self::unavailable(format!("{:#}", e));
            }
        };
        Self::ready(artifact)
    }

    /// Accept an in-memory artifact if its parts agree on shape and an all-zero
    /// row runs through it.
    pub fn ready(artifact: ModelArtifact) -> Self {
        if let Err(e) = check_shapes(&artifact) {
            tracing::error!("model rejected: {:#}", e);
            return Self::unavailable(format!("{:#}", e));
        }
        let zeros = NormalizedInput::from(vec![0.0; artifact.schema().len()]);
        if let Err(e) = crate::pipeline::infer(&artifact, &zeros) {
            tracing::error!("model warmup failed: {}", e);
            return Self::unavailable(format!("warmup failed: {}", e));
        }
        tracing::info!(
            "loaded model; features[{}]: {:?}; classes: {:?}",
            artifact.schema().len(),
            artifact.schema().names(),
            artifact.decoder().classes()
        );
        Self::Ready(Arc::new(artifact))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn artifact(&self) -> Result<&ModelArtifact, PredictError> {
        match self {
            Self::Ready(a) => Ok(a.as_ref()),
            Self::Unavailable { reason } => Err(PredictError::unavailable(reason.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r#"{
        "features": ["a", "b"],
        "scaler": { "mean": [0.0, 0.0], "scale": [1.0, 1.0] },
        "classes": ["NO", "YES"],
        "classifier": { "kind": "linear", "coefficients": [[1.0, 1.0]], "intercepts": [0.0] }
    }"#;

    fn write_manifest(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn decoder_maps_indices() {
        let d = LabelDecoder::new(vec!["A".into(), "B".into()]).unwrap();
        assert_eq!(d.decode(1).unwrap(), "B");
        assert!(d.decode(2).is_err());
    }

    #[test]
    fn decoder_rejects_empty_and_duplicate_classes() {
        assert!(LabelDecoder::new(vec![]).is_err());
        let err = LabelDecoder::new(vec!["A".into(), "A".into(), "B".into()]).unwrap_err();
        assert!(err.to_string().contains("duplicate class label: A"));
    }

    #[test]
    fn duplicate_classes_in_manifest_fail_to_load() {
        let f = write_manifest(
            r#"{
            "features": ["a", "b"],
            "scaler": { "mean": [0.0, 0.0], "scale": [1.0, 1.0] },
            "classes": ["A", "A", "B"],
            "classifier": { "kind": "linear",
                            "coefficients": [[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
                            "intercepts": [0.0, 0.0, 0.0] }
        }"#,
        );
        assert!(ModelArtifact::load(f.path()).is_err());
        assert!(!ModelState::load(f.path()).is_ready());
    }

    #[test]
    fn loads_linear_manifest() {
        let f = write_manifest(MANIFEST);
        let a = ModelArtifact::load(f.path()).unwrap();
        assert_eq!(a.schema().names(), &["a", "b"]);
        assert_eq!(a.decoder().classes(), &["NO", "YES"]);
        assert_eq!(a.classifier().n_classes(), 2);
        assert_eq!(a.scaler().width(), 2);

        let state = ModelState::load(f.path());
        assert!(state.is_ready());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let state = ModelState::load(Path::new("/definitely/not/here.json"));
        assert!(!state.is_ready());
        match state.artifact() {
            Err(PredictError::ModelUnavailable { reason }) => {
                assert!(reason.contains("failed to read model manifest"))
            }
            _ => panic!("expected ModelUnavailable"),
        }
    }

    #[test]
    fn width_mismatch_is_unavailable() {
        let f = write_manifest(
            r#"{
            "features": ["a", "b", "c"],
            "scaler": { "mean": [0.0, 0.0], "scale": [1.0, 1.0] },
            "classes": ["NO", "YES"],
            "classifier": { "kind": "linear", "coefficients": [[1.0, 1.0]], "intercepts": [0.0] }
        }"#,
        );
        assert!(ModelArtifact::load(f.path()).is_ok());
        let state = ModelState::load(f.path());
        assert!(matches!(
            state,
            ModelState::Unavailable { ref reason } if reason.contains("scaler width 2 does not match 3")
        ));
    }

    #[test]
    fn class_count_mismatch_is_unavailable() {
        let f = write_manifest(
            r#"{
            "features": ["a", "b"],
            "scaler": { "mean": [0.0, 0.0], "scale": [1.0, 1.0] },
            "classes": ["A", "B", "C"],
            "classifier": { "kind": "linear", "coefficients": [[1.0, 1.0]], "intercepts": [0.0] }
        }"#,
        );
        let state = ModelState::load(f.path());
        assert!(matches!(
            state,
            ModelState::Unavailable { ref reason } if reason.contains("2 classes but 3 labels")
        ));
    }

    #[test]
    fn garbage_manifest_is_unavailable() {
        let f = write_manifest("{ not json");
        assert!(!ModelState::load(f.path()).is_ready());

        let f = write_manifest(
            r#"{ "features": [], "scaler": {"mean": [], "scale": []},
                 "classes": [], "classifier": {"kind": "linear", "coefficients": [], "intercepts": []} }"#,
        );
        assert!(ModelArtifact::load(f.path()).is_err());
    }

    #[cfg(not(feature = "torch"))]
    #[test]
    fn torchscript_needs_feature() {
        let f = write_manifest(
            r#"{ "features": ["a"], "scaler": {"mean": [0.0], "scale": [1.0]},
                 "classes": ["NO", "YES"], "classifier": {"kind": "torchscript", "path": "m.pt"} }"#,
        );
        let err = ModelArtifact::load(f.path()).err().unwrap();
        assert!(err.to_string().contains("torch"));
    }
}
