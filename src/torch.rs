//! TorchScript-backed classifier (cargo feature `torch`).

use crate::classifier::{argmax, ClassScores, Classifier};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

/// A scripted module mapping a `[1, in_dim]` float row to `[1, n_classes]` logits.
pub struct TorchClassifier {
    model: CModule,
    device: Device,
    in_dim: i64,
    n_classes: i64,
}

impl TorchClassifier {
    pub fn load(model_path: &Path, in_dim: usize) -> Result<Self> {
        let device = Device::Cpu;

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path.display()))?;

        // Check output shape with a dummy forward; expect [B=1, C]
        let in_dim = in_dim as i64;
        let dummy = Tensor::zeros([1, in_dim], (Kind::Float, device));
        let t = model.forward_ts(&[dummy])?;
        let sz = t.size();
        if sz.len() != 2 || sz[0] != 1 || sz[1] < 2 {
            bail!("unexpected model output size: {:?}", sz);
        }

        Ok(Self {
            model,
            device,
            in_dim,
            n_classes: sz[1],
        })
    }
}

impl Classifier for TorchClassifier {
    fn n_features(&self) -> usize {
        self.in_dim as usize
    }

    fn n_classes(&self) -> usize {
        self.n_classes as usize
    }

    fn predict(&self, row: &[f64]) -> Result<ClassScores> {
        if row.len() as i64 != self.in_dim {
            bail!(
                "feature length mismatch: got {}, expected {}",
                row.len(),
                self.in_dim
            );
        }

        let x: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&x)
            .reshape([1, self.in_dim])
            .to_device(self.device);

        // Forward: [1, C] logits -> probabilities over C
        let logits = self.model.forward_ts(&[input])?;
        let probs = logits.softmax(-1, Kind::Double).squeeze_dim(0);
        let probs = Vec::<f64>::try_from(&probs)?;

        let Some(class_index) = argmax(&probs) else {
            bail!("model produced an empty output row");
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
    use crate::model::{ModelArtifact, ModelState};
    use std::path::PathBuf;

    // Trace `x @ w` for a [in_dim, out] weight and save it under `dir`.
    fn save_linear(dir: &Path, name: &str, w: Tensor, flatten: bool) -> PathBuf {
        let in_dim = w.size()[0];
        let example = Tensor::zeros([1, in_dim], (Kind::Float, Device::Cpu));
        let m = CModule::create_by_tracing("linear", "forward", &[example], &mut |xs| {
            let out = xs[0].matmul(&w);
            vec![if flatten { out.squeeze_dim(0) } else { out }]
        })
        .unwrap();
        let path = dir.join(name);
        m.save(&path).unwrap();
        path
    }

    #[test]
    fn missing_module_fails_to_load() {
        let err = TorchClassifier::load(Path::new("/definitely/not/here.pt"), 3)
            .err()
            .unwrap();
        assert!(err.to_string().contains("failed to load TorchScript"));
    }

    #[test]
    fn traced_module_predicts_probabilities() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_linear(dir.path(), "m.pt", Tensor::eye(3, (Kind::Float, Device::Cpu)), false);

        let clf = TorchClassifier::load(&path, 3).unwrap();
        assert_eq!(clf.n_features(), 3);
        assert_eq!(clf.n_classes(), 3);

        let s = clf.predict(&[0.0, 4.0, 0.0]).unwrap();
        assert_eq!(s.class_index, 1);
        let p = s.probabilities.unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);

        let err = clf.predict(&[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("feature length mismatch"));
    }

    #[test]
    fn rejects_module_without_batch_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_linear(dir.path(), "flat.pt", Tensor::eye(3, (Kind::Float, Device::Cpu)), true);
        let err = TorchClassifier::load(&path, 3).err().unwrap();
        assert!(err.to_string().contains("unexpected model output size"));
    }

    #[test]
    fn manifest_resolves_module_next_to_it() {
        let dir = tempfile::tempdir().unwrap();
        save_linear(dir.path(), "m.pt", Tensor::eye(2, (Kind::Float, Device::Cpu)), false);
        let manifest = dir.path().join("model.json");
        std::fs::write(
            &manifest,
            r#"{ "features": ["a", "b"], "scaler": {"mean": [0.0, 0.0], "scale": [1.0, 1.0]},
                 "classes": ["NO", "YES"], "classifier": {"kind": "torchscript", "path": "m.pt"} }"#,
        )
        .unwrap();

        let a = ModelArtifact::load(&manifest).unwrap();
        assert_eq!(a.classifier().n_classes(), 2);
        assert!(ModelState::ready(a).is_ready());
    }
}
