use std::{fmt, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A decimal currency amount in its wire representation.
///
/// Payment processors exchange monetary values as decimal strings. Keeping the string form means values round-trip
/// through requests, signatures and order metadata without floating-point drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(String);

#[derive(Debug, Clone, Error)]
#[error("Invalid currency amount: {0}")]
pub struct AmountError(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value, for display and arithmetic. `0.0` if the stored text is somehow not a number.
    pub fn value(&self) -> f64 {
        self.0.parse().unwrap_or_default()
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Self(trimmed.to_string())),
            _ => Err(AmountError(s.to_string())),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(format!("{value:.2}"))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
