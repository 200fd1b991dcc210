//! Mapping of partial, untyped request input onto the model's feature order.

use crate::error::PredictError;
use crate::schema::FeatureSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Value used for any schema feature the caller left out or sent as null.
///
/// Zero-fill is the serving policy; it is not an imputation of the
/// training distribution.
pub const MISSING_FEATURE_DEFAULT: f64 = 0.0;

/// One externally supplied feature value, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Number(f64),
    Text(String),
    /// JSON booleans, arrays and objects.
    Unsupported(String),
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawValue::Null,
            Value::Number(n) => match n.as_f64() {
                Some(x) => RawValue::Number(x),
                None => RawValue::Unsupported(n.to_string()),
            },
            Value::String(s) => RawValue::Text(s),
            other => RawValue::Unsupported(other.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Number(x)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Per-request mapping of feature name to whatever the caller sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    values: HashMap<String, RawValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(feature.into(), value.into());
    }

    pub fn with(mut self, feature: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(feature, value);
        self
    }

    pub fn get(&self, feature: &str) -> Option<&RawValue> {
        self.values.get(feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Form fields: every value arrives as text.
    pub fn from_form(fields: HashMap<String, String>) -> Self {
        fields
            .into_iter()
            .map(|(k, v)| (k, RawValue::Text(v)))
            .collect()
    }

    pub fn from_json(body: serde_json::Map<String, Value>) -> Self {
        body.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect()
    }

    /// Keys the schema does not know about; they are ignored by `normalize`.
    pub fn unknown_keys<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = &'a str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(move |k| !schema.contains(k))
    }
}

impl FromIterator<(String, RawValue)> for RawInput {
    fn from_iter<T: IntoIterator<Item = (String, RawValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Dense input vector in schema order, ready for the scaler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedInput(Vec<f64>);

impl NormalizedInput {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(feature, value)` pairs in schema order.
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> {
        schema.iter().zip(self.0.iter().copied())
    }

    /// Re-express as a fully populated `RawInput`.
    pub fn to_raw(&self, schema: &FeatureSchema) -> RawInput {
        self.named(schema)
            .map(|(k, v)| (k.to_string(), RawValue::Number(v)))
            .collect()
    }
}

impl From<Vec<f64>> for NormalizedInput {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

fn parse_value(feature: &str, value: &RawValue) -> Result<f64, PredictError> {
    match value {
        RawValue::Null => Ok(MISSING_FEATURE_DEFAULT),
        RawValue::Number(x) if x.is_finite() => Ok(*x),
        RawValue::Number(x) => Err(PredictError::invalid(feature, x.to_string())),
        RawValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(x),
            _ => Err(PredictError::invalid(feature, s.as_str())),
        },
        RawValue::Unsupported(s) => Err(PredictError::invalid(feature, s.as_str())),
    }
}

/// Lay `raw` out in schema order, zero-filling absent or null features.
///
/// Fails on the first schema feature (in schema order) whose value is not a
/// finite number.
pub fn normalize(raw: &RawInput, schema: &FeatureSchema) -> Result<NormalizedInput, PredictError> {
    let mut v = Vec::with_capacity(schema.len());
    for k in schema.iter() {
        let x = match raw.get(k) {
            Some(value) => parse_value(k, value)?,
            None => MISSING_FEATURE_DEFAULT,
        };
        v.push(x);
    }
    Ok(NormalizedInput(v))
}
