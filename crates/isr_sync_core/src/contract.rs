use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every synced variable is applied to all three deployment targets.
pub const DEPLOYMENT_TARGETS: [&str; 3] = ["production", "preview", "development"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncRequest {
    #[serde(default)]
    pub variables: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub revalidate: Option<RevalidateRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    Create,
    Update,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileAction::Create => "create",
            ReconcileAction::Update => "update",
        }
    }
}

/// Per-key result of one reconciliation attempt. Lives only long enough to
/// build the aggregate response message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub key: String,
    pub succeeded: bool,
    pub action: ReconcileAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReconcileOutcome {
    pub fn success(key: impl Into<String>, action: ReconcileAction) -> Self {
        Self {
            key: key.into(),
            succeeded: true,
            action,
            error: None,
        }
    }

    pub fn failure(
        key: impl Into<String>,
        action: ReconcileAction,
        error: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            succeeded: false,
            action,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates that every variable value is numeric-coercible and converts the
/// batch into remote-ready key/value strings. A single offending value rejects
/// the whole batch before any remote call is made.
pub fn validate_variables(
    variables: &BTreeMap<String, Value>,
) -> Result<Vec<(String, String)>, ValidationError> {
    let invalid: Vec<&str> = variables
        .iter()
        .filter(|(_, value)| !is_numeric_coercible(value))
        .map(|(key, _)| key.as_str())
        .collect();

    if !invalid.is_empty() {
        return Err(ValidationError::new(format!(
            "Invalid input: The following variables do not represent numbers: {}",
            invalid.join(", ")
        )));
    }

    Ok(variables
        .iter()
        .map(|(key, value)| (key.clone(), coerce_to_string(value)))
        .collect())
}

fn is_numeric_coercible(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => {
            let trimmed = text.trim();
            !trimmed.is_empty()
                && trimmed
                    .parse::<f64>()
                    .map(f64::is_finite)
                    .unwrap_or(false)
        }
        _ => false,
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}
