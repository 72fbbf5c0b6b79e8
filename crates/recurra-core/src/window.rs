//! Generation window resolution.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use recurra_domain::{add_years_clamped, RecurrenceRule};

/// Ceiling that bounds open-ended rules to a finite, storable sequence.
pub const MAX_PROJECTION_YEARS: u32 = 50;

/// Knobs the lifecycle manager reads when resolving windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub projection_years: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            projection_years: MAX_PROJECTION_YEARS,
        }
    }
}

/// Closed date range one generation pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ProjectionWindow {
    /// `[from, min(from + projection_years, rule.end_date)]`.
    pub fn resolve(rule: &RecurrenceRule, from: NaiveDate, settings: &EngineSettings) -> Self {
        let years = i32::try_from(settings.projection_years).unwrap_or(i32::MAX);
        let ceiling = add_years_clamped(from, years).unwrap_or(NaiveDate::MAX);
        let end = match rule.end_date {
            Some(end_date) if end_date < ceiling => end_date,
            _ => ceiling,
        };
        Self { start: from, end }
    }

    /// Pulls the end back to `limit` when it lies later.
    pub fn clamp_end(self, limit: NaiveDate) -> Self {
        Self {
            start: self.start,
            end: self.end.min(limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// How many more instances a count-bounded rule may materialize.
///
/// `None` means the rule has no occurrence cap; `Some(0)` means generation is
/// a no-op.
pub fn remaining_occurrences(rule: &RecurrenceRule, materialized: usize) -> Option<usize> {
    rule.max_occurrences
        .map(|max| (max as usize).saturating_sub(materialized))
}
