//! Persistence-adapter seams consumed by the lifecycle manager.
//!
//! Every batch call is all-or-nothing: an adapter either applies the whole
//! batch or returns an error and leaves its state untouched.

mod memory;
mod snapshot;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use recurra_domain::{Page, RecurrenceRule, RuleFilter, TransactionInstance};

use crate::CoreError;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Date condition for range deletes by owning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePredicate {
    Any,
    OnOrAfter(NaiveDate),
}

impl DatePredicate {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DatePredicate::Any => true,
            DatePredicate::OnOrAfter(cutoff) => date >= *cutoff,
        }
    }
}

/// Storage of recurrence rule rows.
pub trait RuleStore: Send + Sync {
    fn insert_rule(&self, rule: &RecurrenceRule) -> Result<(), CoreError>;
    fn find_rule(&self, id: Uuid) -> Result<Option<RecurrenceRule>, CoreError>;
    /// Flips the lifecycle flag. Pausing stamps `paused_at = at`, resuming
    /// clears it; both set `updated_at = at`.
    fn set_active(&self, id: Uuid, active: bool, at: DateTime<Utc>) -> Result<(), CoreError>;
    fn delete_rule(&self, id: Uuid) -> Result<bool, CoreError>;
    /// An owner's rules, newest first.
    fn list_rules(
        &self,
        owner_id: Uuid,
        filter: &RuleFilter,
    ) -> Result<Page<RecurrenceRule>, CoreError>;
}

/// Storage of materialized transaction instances.
pub trait InstanceStore: Send + Sync {
    /// Instances tied to `rule_id`, optionally only those dated before `before`.
    fn count_instances(&self, rule_id: Uuid, before: Option<NaiveDate>) -> Result<usize, CoreError>;
    fn insert_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError>;
    fn update_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError>;
    fn delete_instances(&self, rule_id: Uuid, predicate: DatePredicate) -> Result<usize, CoreError>;
    /// Instances of `rule_id` dated within `[start, end]`, ascending by date.
    fn find_instances(
        &self,
        rule_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransactionInstance>, CoreError>;
    fn list_instances(&self, rule_id: Uuid) -> Result<Vec<TransactionInstance>, CoreError>;
}

/// Everything the lifecycle manager needs from one backend.
pub trait RecurrenceStore: RuleStore + InstanceStore {}

impl<T: RuleStore + InstanceStore> RecurrenceStore for T {}
