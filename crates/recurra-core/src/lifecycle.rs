//! Rule lifecycle: create, pause, resume, and delete recurring rules while
//! keeping their materialized instances consistent with the schedule.
//!
//! Every operation takes `now` from the caller and reads it nowhere else, so
//! month cutoffs are computed once per call and the manager stays
//! deterministic under test.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use recurra_domain::{
    first_day_of_month, first_day_of_next_month, ConflictResolution, DeleteMode, Money, MonthCursor,
    NewRecurrenceRule, Page, RecurrenceRule, RuleFilter, TransactionInstance,
};

use crate::{
    installment::occurrence_terms,
    projector::Projection,
    storage::{DatePredicate, RecurrenceStore},
    validation::validate,
    window::{remaining_occurrences, EngineSettings, ProjectionWindow},
    CoreError,
};

/// Instances written by one generation or reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedRule {
    pub rule: RecurrenceRule,
    pub generated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PauseReport {
    pub rule_id: Uuid,
    /// Instances dated on or after this day were removed.
    pub cutoff: NaiveDate,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeReport {
    pub rule_id: Uuid,
    /// The resolution that was applied; `None` when there was no conflict.
    pub resolution: Option<ConflictResolution>,
    pub generation: GenerationReport,
}

/// Result of a resume call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResumeOutcome {
    Applied(ResumeReport),
    /// The current month already holds instances of the rule and the caller
    /// did not say what to do with them. Nothing was written.
    NeedsDecision {
        rule_id: Uuid,
        existing: Vec<TransactionInstance>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub rule_id: Uuid,
    pub mode: DeleteMode,
    pub removed: usize,
}

/// One projected occurrence with the terms it would be materialized with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledEntry {
    /// One-based position in the rule's whole schedule.
    pub ordinal: usize,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
}

/// Orchestrates rule state transitions against a [`RecurrenceStore`].
pub struct RecurrenceService<S> {
    store: S,
    settings: EngineSettings,
}

impl<S: RecurrenceStore> RecurrenceService<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, EngineSettings::default())
    }

    pub fn with_settings(store: S, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validates and persists a rule, then materializes its schedule from the
    /// start date onward.
    pub fn create(
        &self,
        draft: NewRecurrenceRule,
        now: DateTime<Utc>,
    ) -> Result<CreatedRule, CoreError> {
        let frequency = validate(&draft)?;
        let rule = RecurrenceRule::from_draft(draft, frequency, now);
        self.store.insert_rule(&rule)?;
        let generated = self.generate_from(&rule, rule.start_date, now)?;
        info!(
            "created recurring rule {} ({}, {}) with {} instance(s)",
            rule.id, rule.kind, rule.frequency, generated
        );
        Ok(CreatedRule { rule, generated })
    }

    /// Stops an active rule. Instances from the first day of next month
    /// onward are removed; the current month is left as is.
    pub fn pause(&self, rule_id: Uuid, now: DateTime<Utc>) -> Result<PauseReport, CoreError> {
        let rule = self.require_rule(rule_id)?;
        if !rule.is_active {
            return Err(CoreError::AlreadyPaused(rule_id));
        }
        let cutoff = first_day_of_next_month(now.date_naive());
        let removed = self
            .store
            .delete_instances(rule_id, DatePredicate::OnOrAfter(cutoff))?;
        self.store.set_active(rule_id, false, now)?;
        info!(
            "paused recurring rule {}: removed {} instance(s) from {}",
            rule_id, removed, cutoff
        );
        Ok(PauseReport {
            rule_id,
            cutoff,
            removed,
        })
    }

    /// Restarts a paused rule from the first day of the current month.
    ///
    /// When that month already holds instances of the rule (pausing keeps the
    /// current month) and no `resolution` is given, nothing is written and
    /// the existing instances are handed back for the caller to decide.
    pub fn resume(
        &self,
        rule_id: Uuid,
        resolution: Option<ConflictResolution>,
        now: DateTime<Utc>,
    ) -> Result<ResumeOutcome, CoreError> {
        let mut rule = self.require_rule(rule_id)?;
        if rule.is_active {
            return Err(CoreError::AlreadyActive(rule_id));
        }

        let month = MonthCursor::of(now.date_naive());
        let (first_day, last_day) = (month.first_day(), month.last_day());
        let existing = self.store.find_instances(rule_id, first_day, last_day)?;

        let applied = match (existing.is_empty(), resolution) {
            (true, _) => None,
            (false, None) => {
                warn!(
                    "resume of recurring rule {} blocked: {} instance(s) already in {}-{:02}",
                    rule_id,
                    existing.len(),
                    month.year(),
                    month.month()
                );
                return Ok(ResumeOutcome::NeedsDecision { rule_id, existing });
            }
            (false, Some(choice)) => Some(choice),
        };

        rule.is_active = true;
        rule.paused_at = None;

        let generation = match applied {
            Some(ConflictResolution::Update) => {
                let mut report = self.reconcile_month(&rule, &existing, first_day, last_day, now)?;
                report.inserted += self.generate_from(&rule, month.next().first_day(), now)?;
                report
            }
            Some(ConflictResolution::Create) | None => GenerationReport {
                inserted: self.generate_from(&rule, first_day, now)?,
                updated: 0,
            },
        };

        self.store.set_active(rule_id, true, now)?;
        info!(
            "resumed recurring rule {}: {} inserted, {} updated",
            rule_id, generation.inserted, generation.updated
        );
        Ok(ResumeOutcome::Applied(ResumeReport {
            rule_id,
            resolution: applied,
            generation,
        }))
    }

    /// Removes a rule and, depending on `mode`, its materialized instances.
    /// Works whether the rule is active or paused.
    pub fn delete(
        &self,
        rule_id: Uuid,
        mode: DeleteMode,
        now: DateTime<Utc>,
    ) -> Result<DeleteReport, CoreError> {
        self.require_rule(rule_id)?;
        let predicate = deletion_predicate(mode, now.date_naive());
        let removed = self.store.delete_instances(rule_id, predicate)?;
        self.store.delete_rule(rule_id)?;
        info!(
            "deleted recurring rule {} ({}): removed {} instance(s)",
            rule_id, mode, removed
        );
        Ok(DeleteReport {
            rule_id,
            mode,
            removed,
        })
    }

    pub fn get_rule(&self, rule_id: Uuid) -> Result<RecurrenceRule, CoreError> {
        self.require_rule(rule_id)
    }

    pub fn list_rules(
        &self,
        owner_id: Uuid,
        filter: &RuleFilter,
    ) -> Result<Page<RecurrenceRule>, CoreError> {
        self.store.list_rules(owner_id, filter)
    }

    /// Every materialized instance of the rule, ascending by date.
    pub fn instances_for_rule(&self, rule_id: Uuid) -> Result<Vec<TransactionInstance>, CoreError> {
        self.require_rule(rule_id)?;
        self.store.list_instances(rule_id)
    }

    /// Projects a draft over `[from, to]` without persisting anything.
    ///
    /// Installment numbering counts the occurrences between the start date
    /// and `from`, matching what generation would produce.
    pub fn preview(
        &self,
        draft: NewRecurrenceRule,
        from: NaiveDate,
        to: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledEntry>, CoreError> {
        let frequency = validate(&draft)?;
        let rule = RecurrenceRule::from_draft(draft, frequency, now);
        let from = from.max(rule.start_date);
        let window = ProjectionWindow::resolve(&rule, from, &self.settings).clamp_end(to);
        let preceding = match from.checked_sub_signed(Duration::days(1)) {
            Some(day_before) => {
                Projection::new(&rule, rule.start_date, day_before.min(window.end)).count()
            }
            None => 0,
        };
        let cap = remaining_occurrences(&rule, preceding).unwrap_or(usize::MAX);
        let entries = Projection::new(&rule, from, window.end)
            .take(cap)
            .enumerate()
            .map(|(offset, date)| {
                let (amount, description) = occurrence_terms(&rule, preceding + offset);
                ScheduledEntry {
                    ordinal: preceding + offset + 1,
                    date,
                    amount,
                    description,
                }
            })
            .collect();
        Ok(entries)
    }

    fn require_rule(&self, rule_id: Uuid) -> Result<RecurrenceRule, CoreError> {
        self.store
            .find_rule(rule_id)?
            .ok_or(CoreError::RuleNotFound(rule_id))
    }

    /// Materializes the rule's schedule from `from` up to the resolved window
    /// end, honouring the occurrence cap. Returns the number of instances
    /// inserted.
    fn generate_from(
        &self,
        rule: &RecurrenceRule,
        from: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let window = ProjectionWindow::resolve(rule, from, &self.settings);
        if window.is_empty() {
            debug!("recurring rule {} has nothing left after {}", rule.id, from);
            return Ok(0);
        }

        let (start_ordinal, cap) = if rule.is_installment_plan() {
            let materialized = self.store.count_instances(rule.id, None)?;
            match remaining_occurrences(rule, materialized) {
                Some(0) => {
                    debug!(
                        "recurring rule {} already has {} instance(s), cap reached",
                        rule.id, materialized
                    );
                    return Ok(0);
                }
                cap => (materialized, cap),
            }
        } else {
            (0, None)
        };

        let dates: Vec<NaiveDate> = Projection::new(rule, window.start, window.end)
            .take(cap.unwrap_or(usize::MAX))
            .collect();
        debug!(
            "projected {} date(s) for recurring rule {} over {}..={}",
            dates.len(),
            rule.id,
            window.start,
            window.end
        );
        if dates.is_empty() {
            return Ok(0);
        }

        let instances: Vec<TransactionInstance> = dates
            .into_iter()
            .enumerate()
            .map(|(offset, date)| {
                let (amount, description) = occurrence_terms(rule, start_ordinal + offset);
                TransactionInstance::for_rule(rule, date, amount, description, now)
            })
            .collect();
        self.store.insert_instances(&instances)?;
        Ok(instances.len())
    }

    /// Brings the current month in line with the rule: instances on projected
    /// dates are rewritten in place, missing dates are filled. Instances on
    /// dates the schedule no longer produces are left alone.
    fn reconcile_month(
        &self,
        rule: &RecurrenceRule,
        existing: &[TransactionInstance],
        first_day: NaiveDate,
        last_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<GenerationReport, CoreError> {
        let start_ordinal = if rule.is_installment_plan() {
            self.store.count_instances(rule.id, Some(first_day))?
        } else {
            0
        };
        let window = ProjectionWindow::resolve(rule, first_day, &self.settings).clamp_end(last_day);
        let cap = remaining_occurrences(rule, start_ordinal).unwrap_or(usize::MAX);

        let mut by_date: HashMap<NaiveDate, &TransactionInstance> = HashMap::new();
        for txn in existing {
            by_date.entry(txn.date).or_insert(txn);
        }

        let mut to_update = Vec::new();
        let mut to_create = Vec::new();
        let dates = Projection::new(rule, window.start, window.end).take(cap);
        for (offset, date) in dates.enumerate() {
            let (amount, description) = occurrence_terms(rule, start_ordinal + offset);
            match by_date.get(&date) {
                Some(found) => {
                    let mut txn = (*found).clone();
                    txn.reconcile_with(rule, amount, description, now);
                    to_update.push(txn);
                }
                None => to_create.push(TransactionInstance::for_rule(
                    rule,
                    date,
                    amount,
                    description,
                    now,
                )),
            }
        }

        if !to_update.is_empty() {
            self.store.update_instances(&to_update)?;
        }
        if !to_create.is_empty() {
            self.store.insert_instances(&to_create)?;
        }
        debug!(
            "reconciled recurring rule {} in {}..={}: {} updated, {} created",
            rule.id,
            first_day,
            last_day,
            to_update.len(),
            to_create.len()
        );
        Ok(GenerationReport {
            inserted: to_create.len(),
            updated: to_update.len(),
        })
    }
}

/// Maps a delete mode onto the instance dates it removes, relative to `today`.
pub fn deletion_predicate(mode: DeleteMode, today: NaiveDate) -> DatePredicate {
    match mode {
        DeleteMode::All => DatePredicate::Any,
        DeleteMode::FutureAndCurrent => DatePredicate::OnOrAfter(first_day_of_month(today)),
        DeleteMode::FutureOnly => DatePredicate::OnOrAfter(first_day_of_next_month(today)),
    }
}
