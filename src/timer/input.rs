//! Duration input parsing
//!
//! Clients submit minutes and seconds either as JSON numbers or as the raw
//! text of an input field. Both are folded into a total second count here,
//! before anything reaches the countdown.

use serde::{Deserialize, Serialize};

use crate::error::{PocketError, Result};

/// A single duration field as supplied by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Number(i64),
    Text(String),
}

impl DurationField {
    /// Parse the field into a signed integer; blank text counts as zero
    pub fn parse(&self, name: &str) -> Result<i64> {
        match self {
            DurationField::Number(n) => Ok(*n),
            DurationField::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(0);
                }
                trimmed.parse::<i64>().map_err(|_| {
                    PocketError::InvalidDuration(format!("{} is not a number: {:?}", name, text))
                })
            }
        }
    }
}

/// Minutes and seconds as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationInput {
    #[serde(default)]
    pub minutes: Option<DurationField>,
    #[serde(default)]
    pub seconds: Option<DurationField>,
}

impl DurationInput {
    pub fn new(minutes: i64, seconds: i64) -> Self {
        Self {
            minutes: Some(DurationField::Number(minutes)),
            seconds: Some(DurationField::Number(seconds)),
        }
    }

    /// Combine both fields into a positive number of seconds
    pub fn total_seconds(&self) -> Result<u64> {
        let minutes = Self::field(&self.minutes, "minutes")?;
        let seconds = Self::field(&self.seconds, "seconds")?;

        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(|| PocketError::InvalidDuration("duration overflows".to_string()))?;

        if total == 0 {
            return Err(PocketError::InvalidDuration("duration must be greater than zero".to_string()));
        }
        Ok(total)
    }

    fn field(field: &Option<DurationField>, name: &str) -> Result<u64> {
        let value = match field {
            Some(f) => f.parse(name)?,
            None => 0,
        };
        u64::try_from(value)
            .map_err(|_| PocketError::InvalidDuration(format!("{} must not be negative: {}", name, value)))
    }
}
