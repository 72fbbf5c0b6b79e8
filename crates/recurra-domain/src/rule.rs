//! Recurrence rules: the caller's draft and the persisted rule.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Money};

/// Rule as submitted by a caller, before validation.
///
/// `frequency` stays free text here so an unknown cadence can be reported
/// back instead of failing deserialisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRecurrenceRule {
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceRule {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_occurrences: Option<u32>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub is_active: bool,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurrenceRule {
    /// Builds an active rule from an already validated draft.
    pub fn from_draft(draft: NewRecurrenceRule, frequency: Frequency, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: draft.owner_id,
            category_id: draft.category_id,
            kind: draft.kind,
            amount: Money::new(draft.amount),
            description: draft.description,
            frequency,
            start_date: draft.start_date,
            end_date: draft.end_date,
            max_occurrences: draft.max_occurrences,
            day_of_month: draft.day_of_month,
            is_active: true,
            paused_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Day of month monthly rules land on; defaults to the start date's day.
    pub fn anchor_day(&self) -> u32 {
        self.day_of_month.unwrap_or_else(|| self.start_date.day())
    }

    /// A rule with a maximum occurrence count splits its amount into
    /// installments.
    pub fn is_installment_plan(&self) -> bool {
        self.max_occurrences.is_some()
    }

    pub fn status(&self) -> RuleStatus {
        if self.is_active {
            RuleStatus::Active
        } else {
            RuleStatus::Paused
        }
    }
}

impl Identifiable for RecurrenceRule {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    Active,
    Paused,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleStatus::Active => "active",
            RuleStatus::Paused => "paused",
        };
        f.write_str(label)
    }
}
