//! Connector descriptors: the configuration mapping identifying a connector's
//! kind and parameters.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Identifies a connector kind plus its kind-specific parameters.
///
/// Deserialized from a mapping of the shape
/// `{ "type": <kind>, ...kind-specific fields... }`; every key other than
/// `type` lands in `params` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ConnectorDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Attach a parameter, builder-style.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Optional string parameter; `None` if absent or not a string.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(serde_json::Value::as_str)
    }

    /// Required string parameter.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Configuration` naming the field and the
    /// connector kind if the parameter is absent or empty.
    pub fn require_str(&self, key: &str) -> Result<&str, PipelineError> {
        match self.param_str(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(PipelineError::Configuration(format!(
                "connector kind '{}' requires a '{}' parameter",
                self.kind, key
            ))),
        }
    }

    /// Optional non-negative integer parameter.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Configuration` if the parameter is present but
    /// not a non-negative integer.
    pub fn param_usize(&self, key: &str) -> Result<Option<usize>, PipelineError> {
        match self.params.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(|v| Some(v as usize))
                .ok_or_else(|| {
                    PipelineError::Configuration(format!(
                        "connector kind '{}': parameter '{}' must be a non-negative integer, got {}",
                        self.kind, key, value
                    ))
                }),
        }
    }
}
