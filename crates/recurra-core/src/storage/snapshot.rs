use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recurra_domain::{Identifiable, Page, RecurrenceRule, RuleFilter, TransactionInstance};

use super::DatePredicate;
use crate::CoreError;

/// Complete store contents: one row per rule and one per instance.
///
/// Adapters wrap a snapshot behind a lock; every mutating method validates
/// the whole batch before touching any row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub rules: Vec<RecurrenceRule>,
    #[serde(default)]
    pub instances: Vec<TransactionInstance>,
}

impl Snapshot {
    pub fn insert_rule(&mut self, rule: &RecurrenceRule) -> Result<(), CoreError> {
        if position_of(&self.rules, rule.id).is_some() {
            return Err(CoreError::Storage(format!(
                "recurring rule {} already exists",
                rule.id
            )));
        }
        self.rules.push(rule.clone());
        Ok(())
    }

    pub fn find_rule(&self, id: Uuid) -> Option<&RecurrenceRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn set_active(
        &mut self,
        id: Uuid,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let position = position_of(&self.rules, id).ok_or(CoreError::RuleNotFound(id))?;
        let rule = &mut self.rules[position];
        rule.is_active = active;
        rule.paused_at = if active { None } else { Some(at) };
        rule.updated_at = at;
        Ok(())
    }

    pub fn delete_rule(&mut self, id: Uuid) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.id != id);
        self.rules.len() != before
    }

    pub fn list_rules(&self, owner_id: Uuid, filter: &RuleFilter) -> Page<RecurrenceRule> {
        let mut matching: Vec<RecurrenceRule> = self
            .rules
            .iter()
            .filter(|rule| rule.owner_id == owner_id && filter.matches(rule))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let (page, per_page) = filter.normalized();
        Page::slice(matching, page, per_page)
    }

    pub fn count_instances(&self, rule_id: Uuid, before: Option<NaiveDate>) -> usize {
        self.instances
            .iter()
            .filter(|txn| txn.belongs_to(rule_id))
            .filter(|txn| before.map_or(true, |cutoff| txn.date < cutoff))
            .count()
    }

    pub fn insert_instances(&mut self, batch: &[TransactionInstance]) -> Result<(), CoreError> {
        let existing: HashSet<Uuid> = self.instances.iter().map(Identifiable::id).collect();
        let mut seen = HashSet::with_capacity(batch.len());
        for txn in batch {
            if existing.contains(&txn.id) || !seen.insert(txn.id) {
                return Err(CoreError::Storage(format!(
                    "transaction {} already exists",
                    txn.id
                )));
            }
        }
        self.instances.extend_from_slice(batch);
        Ok(())
    }

    pub fn update_instances(&mut self, batch: &[TransactionInstance]) -> Result<(), CoreError> {
        let mut positions = Vec::with_capacity(batch.len());
        for txn in batch {
            let position = self
                .instances
                .iter()
                .position(|existing| existing.id == txn.id && existing.rule_id.is_some())
                .ok_or_else(|| {
                    CoreError::Storage(format!("recurring transaction {} not found", txn.id))
                })?;
            positions.push(position);
        }
        for (position, txn) in positions.into_iter().zip(batch) {
            self.instances[position] = txn.clone();
        }
        Ok(())
    }

    pub fn delete_instances(&mut self, rule_id: Uuid, predicate: DatePredicate) -> usize {
        let before = self.instances.len();
        self.instances
            .retain(|txn| !(txn.belongs_to(rule_id) && predicate.matches(txn.date)));
        before - self.instances.len()
    }

    pub fn find_instances(
        &self,
        rule_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<TransactionInstance> {
        let mut found: Vec<TransactionInstance> = self
            .instances
            .iter()
            .filter(|txn| txn.belongs_to(rule_id) && txn.date >= start && txn.date <= end)
            .cloned()
            .collect();
        found.sort_by_key(|txn| txn.date);
        found
    }

    pub fn list_instances(&self, rule_id: Uuid) -> Vec<TransactionInstance> {
        let mut found: Vec<TransactionInstance> = self
            .instances
            .iter()
            .filter(|txn| txn.belongs_to(rule_id))
            .cloned()
            .collect();
        found.sort_by_key(|txn| txn.date);
        found
    }
}

fn position_of<T: Identifiable>(rows: &[T], id: Uuid) -> Option<usize> {
    rows.iter().position(|row| row.id() == id)
}
