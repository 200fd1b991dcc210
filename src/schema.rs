use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Ordered feature names the fitted scaler and classifier expect.
///
/// The order is the column order used at fit time and is load-bearing:
/// every vector handed to the model is laid out in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            bail!("feature schema is empty");
        }
        let mut seen = HashSet::with_capacity(names.len());
        for n in &names {
            if !seen.insert(n.as_str()) {
                bail!("duplicate feature in schema: {}", n);
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Plain-language explanation of a KOI column, shown next to form inputs.
pub fn legend(feature: &str) -> Option<&'static str> {
    let text = match feature {
        "koi_period" => "How often the star's \"blink\" (transit) occurs. This is the planet's \"year\".",
        "koi_duration" => "How long the star's light dims during each transit.",
        "koi_depth" => "How much the star's light dims. This is the main clue about the planet's size.",
        "koi_prad" => "The radius of the planet in Earth radii (2.0 = twice the Earth's radius).",
        "koi_teq" => "Estimated average surface temperature of the planet. Helps place it relative to the habitable zone.",
        "koi_insol" => "How much energy the planet receives from its star. A high value means it is being \"toasted\".",
        "koi_steff" => "Surface temperature of the star. Hotter and cooler stars have different habitable zones.",
        "koi_slogg" => "Surface gravity of the star. Helps confirm the star type.",
        "koi_srad" => "Radius of the star. Needed to turn transit depth into an actual planet size.",
        "koi_impact" => "Whether the planet crossed the star's center (about 0) or grazed its edge (about 1).",
        "koi_model_snr" => "Signal-to-noise ratio of the transit. A high value means a strong, reliable signal.",
        "koi_fpflag_nt" => "NASA flag: the shape of the \"blink\" does not look like a planetary transit.",
        "koi_fpflag_ss" => "NASA flag: the event looks more like an eclipse between two stars.",
        "koi_fpflag_co" => "NASA flag: the light source seems to shift, indicating a nearby contaminating star.",
        "koi_fpflag_ec" => "NASA flag: the signal is contaminated by light from another nearby stellar event.",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KOI_FEATURES: [&str; 15] = [
        "koi_period",
        "koi_duration",
        "koi_depth",
        "koi_prad",
        "koi_teq",
        "koi_insol",
        "koi_steff",
        "koi_slogg",
        "koi_srad",
        "koi_impact",
        "koi_model_snr",
        "koi_fpflag_nt",
        "koi_fpflag_ss",
        "koi_fpflag_co",
        "koi_fpflag_ec",
    ];

    #[test]
    fn keeps_given_order() {
        let s = FeatureSchema::new(["c", "a", "b"]).unwrap();
        assert_eq!(s.names(), &["c", "a", "b"]);
        assert_eq!(s.len(), 3);
        assert!(s.contains("a"));
        assert!(!s.contains("d"));
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(FeatureSchema::new(Vec::<String>::new()).is_err());
        let err = FeatureSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn every_koi_feature_has_a_legend() {
        for f in FeatureSchema::new(KOI_FEATURES).unwrap().iter() {
            assert!(legend(f).is_some(), "missing legend for {f}");
        }
        assert!(legend("not_a_column").is_none());
    }
}
