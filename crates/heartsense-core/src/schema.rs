//! Feature schema, request payloads and validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw prediction payload: feature name → JSON value.
///
/// Anything other than a JSON object fails to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest(BTreeMap<String, Value>);

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature value, replacing any previous value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PredictionRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Declared type of a single feature.
///
/// | Kind | Accepts | Encoded as |
/// |------|---------|------------|
/// | `numeric` | numbers, booleans | the number (`true` → 1) |
/// | `categorical` | level names, level indices | the level index |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Continuous or ordinal value with optional inclusive bounds.
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Reject values with a fractional part.
        #[serde(default)]
        integer: bool,
    },
    /// One of a fixed set of named levels.
    Categorical { levels: Vec<String> },
}

impl FeatureKind {
    /// Unbounded numeric feature.
    pub fn numeric() -> Self {
        Self::Numeric { min: None, max: None, integer: false }
    }

    /// Numeric feature bounded to `[min, max]`.
    pub fn numeric_range(min: f64, max: f64) -> Self {
        Self::Numeric { min: Some(min), max: Some(max), integer: false }
    }

    /// Integer feature bounded to `[min, max]`.
    pub fn integer_range(min: i64, max: i64) -> Self {
        Self::Numeric {
            min: Some(min as f64),
            max: Some(max as f64),
            integer: true,
        }
    }

    /// Categorical feature with the given levels, in index order.
    pub fn categorical<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Encodes a JSON value as the number handed to the model.
    fn encode(&self, value: &Value) -> Result<f64, String> {
        match self {
            Self::Numeric { min, max, integer } => {
                let x = match value {
                    Value::Number(n) => n
                        .as_f64()
                        .ok_or_else(|| format!("number {} is not representable", n))?,
                    Value::Bool(b) => f64::from(u8::from(*b)),
                    other => return Err(format!("expected a number, got {}", json_type(other))),
                };
                if *integer && x.fract() != 0.0 {
                    return Err(format!("expected an integer, got {}", x));
                }
                if let Some(min) = *min {
                    if x < min {
                        return Err(format!("value {} is below minimum {}", x, min));
                    }
                }
                if let Some(max) = *max {
                    if x > max {
                        return Err(format!("value {} is above maximum {}", x, max));
                    }
                }
                Ok(x)
            }
            Self::Categorical { levels } => match value {
                Value::String(s) => levels
                    .iter()
                    .position(|level| level == s)
                    .map(|idx| idx as f64)
                    .ok_or_else(|| {
                        format!("unknown level '{}', expected one of: {}", s, levels.join(", "))
                    }),
                Value::Number(n) => match n.as_u64() {
                    Some(idx) if (idx as usize) < levels.len() => Ok(idx as f64),
                    _ => Err(format!(
                        "level index {} out of range 0..{}",
                        n,
                        levels.len()
                    )),
                },
                other => Err(format!(
                    "expected a level name or index, got {}",
                    json_type(other)
                )),
            },
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A named feature and its declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// Ordered feature set expected by a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    /// Checks a request against the schema and encodes it in schema order.
    ///
    /// Every missing, unexpected or ill-typed feature is reported, not just the first.
    pub fn validate(&self, request: &PredictionRequest) -> Result<Features, ValidationError> {
        let mut issues = Vec::new();
        let mut values = Vec::with_capacity(self.features.len());

        for spec in &self.features {
            match request.get(&spec.name) {
                None => issues.push(FieldIssue::new(&spec.name, "missing required feature")),
                Some(value) => match spec.kind.encode(value) {
                    Ok(x) => values.push(x),
                    Err(message) => issues.push(FieldIssue::new(&spec.name, message)),
                },
            }
        }

        for key in request.keys().filter(|key| !self.contains(key)) {
            issues.push(FieldIssue::new(key, "unexpected feature"));
        }

        if issues.is_empty() {
            Ok(Features { values })
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Feature values in schema order, produced by [`FeatureSchema::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    values: Vec<f64>,
}

impl Features {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A problem with one field of a prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A prediction request did not match the model's feature schema.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid prediction request: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Single issue not tied to a specific field.
    pub fn body(message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new("body", message)],
        }
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
