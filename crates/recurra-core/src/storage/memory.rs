use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use recurra_domain::{Page, RecurrenceRule, RuleFilter, TransactionInstance};

use super::{DatePredicate, InstanceStore, RuleStore, Snapshot};
use crate::CoreError;

/// In-process adapter; every call is serialised through one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl RuleStore for MemoryStore {
    fn insert_rule(&self, rule: &RecurrenceRule) -> Result<(), CoreError> {
        self.lock()?.insert_rule(rule)
    }

    fn find_rule(&self, id: Uuid) -> Result<Option<RecurrenceRule>, CoreError> {
        Ok(self.lock()?.find_rule(id).cloned())
    }

    fn set_active(&self, id: Uuid, active: bool, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.lock()?.set_active(id, active, at)
    }

    fn delete_rule(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(self.lock()?.delete_rule(id))
    }

    fn list_rules(
        &self,
        owner_id: Uuid,
        filter: &RuleFilter,
    ) -> Result<Page<RecurrenceRule>, CoreError> {
        Ok(self.lock()?.list_rules(owner_id, filter))
    }
}

impl InstanceStore for MemoryStore {
    fn count_instances(
        &self,
        rule_id: Uuid,
        before: Option<NaiveDate>,
    ) -> Result<usize, CoreError> {
        Ok(self.lock()?.count_instances(rule_id, before))
    }

    fn insert_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError> {
        self.lock()?.insert_instances(instances)
    }

    fn update_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError> {
        self.lock()?.update_instances(instances)
    }

    fn delete_instances(
        &self,
        rule_id: Uuid,
        predicate: DatePredicate,
    ) -> Result<usize, CoreError> {
        Ok(self.lock()?.delete_instances(rule_id, predicate))
    }

    fn find_instances(
        &self,
        rule_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransactionInstance>, CoreError> {
        Ok(self.lock()?.find_instances(rule_id, start, end))
    }

    fn list_instances(&self, rule_id: Uuid) -> Result<Vec<TransactionInstance>, CoreError> {
        Ok(self.lock()?.list_instances(rule_id))
    }
}
