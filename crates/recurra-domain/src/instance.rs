//! Dated transactions materialized from recurrence rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Money, rule::RecurrenceRule};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionInstance {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    /// Owning rule; `None` for one-off transactions.
    #[serde(default)]
    pub rule_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionInstance {
    /// Materializes one occurrence of `rule` on `date`.
    pub fn for_rule(
        rule: &RecurrenceRule,
        date: NaiveDate,
        amount: Money,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: rule.owner_id,
            category_id: rule.category_id,
            kind: rule.kind,
            amount,
            description,
            date,
            rule_id: Some(rule.id),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewrites the rule-derived fields in place, keeping identity and date.
    pub fn reconcile_with(
        &mut self,
        rule: &RecurrenceRule,
        amount: Money,
        description: String,
        now: DateTime<Utc>,
    ) {
        self.kind = rule.kind;
        self.category_id = rule.category_id;
        self.amount = amount;
        self.description = description;
        self.updated_at = now;
    }

    pub fn belongs_to(&self, rule_id: Uuid) -> bool {
        self.rule_id == Some(rule_id)
    }
}

impl Identifiable for TransactionInstance {
    fn id(&self) -> Uuid {
        self.id
    }
}
