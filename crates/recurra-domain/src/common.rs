//! Shared traits and enums for recurrence primitives.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Exposes a stable identifier for stored entities.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Raised when a wire name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Enumerates the cadences a recurrence rule can follow.
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Fixed day step for the week-based cadences.
    pub fn step_days(self) -> Option<i64> {
        match self {
            Frequency::Weekly => Some(7),
            Frequency::Biweekly => Some(14),
            Frequency::Monthly | Frequency::Yearly => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|freq| freq.as_str() == value)
            .ok_or_else(|| ParseEnumError::new("frequency", value))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Direction of the money flow for a rule and its instances.
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ParseEnumError::new("transaction kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Selects which materialized instances are removed together with a rule.
pub enum DeleteMode {
    /// Every instance tied to the rule.
    All,
    /// Instances dated on or after the first day of the current month.
    FutureAndCurrent,
    /// Instances dated on or after the first day of the next month.
    FutureOnly,
}

impl DeleteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeleteMode::All => "all",
            DeleteMode::FutureAndCurrent => "future_and_current",
            DeleteMode::FutureOnly => "future_only",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteMode {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(DeleteMode::All),
            "future_and_current" => Ok(DeleteMode::FutureAndCurrent),
            "future_only" => Ok(DeleteMode::FutureOnly),
            other => Err(ParseEnumError::new("delete mode", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Caller's answer when resuming into a month that already holds instances.
pub enum ConflictResolution {
    /// Generate the month again next to the existing instances.
    Create,
    /// Rewrite the existing instances in place and fill the gaps.
    Update,
}

impl ConflictResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictResolution::Create => "create",
            ConflictResolution::Update => "update",
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictResolution {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(ConflictResolution::Create),
            "update" => Ok(ConflictResolution::Update),
            other => Err(ParseEnumError::new("conflict resolution", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_wire_names_only() {
        assert_eq!("biweekly".parse::<Frequency>(), Ok(Frequency::Biweekly));
        assert_eq!("yearly".parse::<Frequency>(), Ok(Frequency::Yearly));
        let err = "daily".parse::<Frequency>().unwrap_err();
        assert_eq!(err.value, "daily");
        assert!("Monthly".parse::<Frequency>().is_err());
    }

    #[test]
    fn delete_mode_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&DeleteMode::FutureAndCurrent).unwrap();
        assert_eq!(json, "\"future_and_current\"");
        assert_eq!(
            "future_only".parse::<DeleteMode>(),
            Ok(DeleteMode::FutureOnly)
        );
    }

    #[test]
    fn week_based_frequencies_expose_their_step() {
        assert_eq!(Frequency::Weekly.step_days(), Some(7));
        assert_eq!(Frequency::Biweekly.step_days(), Some(14));
        assert_eq!(Frequency::Monthly.step_days(), None);
    }
}
