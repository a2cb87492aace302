//! Enable/disable status shared by every administrable record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a record takes part in the system.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "record_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Record is active.
    #[default]
    Enabled,
    /// Record is switched off by an administrator.
    Disabled,
}

impl RecordStatus {
    /// Whether the record is active.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = admin_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" | "1" => Ok(Self::Enabled),
            "disabled" | "0" => Ok(Self::Disabled),
            _ => Err(admin_core::AppError::validation(format!(
                "Invalid status: '{s}'. Expected one of: enabled, disabled"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_legacy_flags() {
        assert_eq!("1".parse::<RecordStatus>().unwrap(), RecordStatus::Enabled);
        assert_eq!("Disabled".parse::<RecordStatus>().unwrap(), RecordStatus::Disabled);
        assert!("paused".parse::<RecordStatus>().is_err());
    }
}
