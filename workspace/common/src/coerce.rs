use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A JSON scalar that may arrive as a number or a numeric string.
///
/// The storage layer is not guaranteed to preserve numeric typing across
/// the local/remote split, so every amount and balance passes through this
/// type on its way into the record store. [`LooseNumber::as_minutes`]
/// never yields NaN: unparseable or non-finite input collapses to `0.0`
/// rather than poisoning downstream aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Coerce to a finite `f64`, defaulting to `0.0`.
    pub fn as_minutes(&self) -> f64 {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() { value } else { 0.0 }
    }
}

impl Default for LooseNumber {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
