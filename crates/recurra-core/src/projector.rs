//! Date projection: turns a rule's cadence into concrete calendar dates.

use chrono::{Datelike, Duration, NaiveDate};

use recurra_domain::{clamped_date, Frequency, MonthCursor, RecurrenceRule};

/// Projects every date on which `rule` falls inside the closed window
/// `[window_start, window_end]`, ascending and without duplicates.
///
/// The schedule is a function of the rule alone, so projecting again from a
/// later `window_start` yields a suffix of the same sequence.
pub fn project(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<NaiveDate> {
    Projection::new(rule, window_start, window_end).collect()
}

/// Lazy iterator behind [`project`]; callers that only need the first `n`
/// dates can `take(n)` without walking the whole window.
#[derive(Debug, Clone)]
pub struct Projection {
    start_date: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
    cursor: Option<Cursor>,
}

#[derive(Debug, Clone)]
enum Cursor {
    Stepped { next: Option<NaiveDate>, step_days: i64 },
    Monthly { month: MonthCursor, day: u32 },
    Yearly { year: i32, month: u32, day: u32 },
}

impl Projection {
    pub fn new(rule: &RecurrenceRule, window_start: NaiveDate, window_end: NaiveDate) -> Self {
        let cursor = (window_start <= window_end).then(|| Cursor::open(rule, window_start));
        Self {
            start_date: rule.start_date,
            window_start,
            window_end,
            cursor,
        }
    }
}

impl Iterator for Projection {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let candidate = match self.cursor.as_mut() {
                Some(cursor) => {
                    let current = cursor.current();
                    cursor.advance();
                    current
                }
                None => return None,
            };
            match candidate {
                Some(date) if date <= self.window_end => {
                    if date >= self.window_start && date >= self.start_date {
                        return Some(date);
                    }
                }
                _ => {
                    self.cursor = None;
                    return None;
                }
            }
        }
    }
}

impl Cursor {
    fn open(rule: &RecurrenceRule, window_start: NaiveDate) -> Cursor {
        match rule.frequency {
            Frequency::Weekly | Frequency::Biweekly => {
                let step_days = rule.frequency.step_days().unwrap_or(7);
                Cursor::Stepped {
                    next: first_step_on_or_after(rule.start_date, window_start, step_days),
                    step_days,
                }
            }
            Frequency::Monthly => Cursor::Monthly {
                month: MonthCursor::of(window_start),
                day: rule.anchor_day(),
            },
            Frequency::Yearly => {
                let (month, day) = (rule.start_date.month(), rule.start_date.day());
                let mut year = window_start.year();
                if clamped_date(year, month, day).is_some_and(|date| date < window_start) {
                    year += 1;
                }
                Cursor::Yearly { year, month, day }
            }
        }
    }

    /// Candidate for the current position; `None` once past chrono's range.
    fn current(&self) -> Option<NaiveDate> {
        match self {
            Cursor::Stepped { next, .. } => *next,
            Cursor::Monthly { month, day } => clamped_date(month.year(), month.month(), *day),
            Cursor::Yearly { year, month, day } => clamped_date(*year, *month, *day),
        }
    }

    fn advance(&mut self) {
        match self {
            Cursor::Stepped { next, step_days } => {
                *next = next.and_then(|date| date.checked_add_signed(Duration::days(*step_days)));
            }
            Cursor::Monthly { month, .. } => *month = month.next(),
            Cursor::Yearly { year, .. } => *year += 1,
        }
    }
}

/// First date of the `start + k * step` series that is not before `target`.
fn first_step_on_or_after(
    start: NaiveDate,
    target: NaiveDate,
    step_days: i64,
) -> Option<NaiveDate> {
    if start >= target {
        return Some(start);
    }
    let behind = (target - start).num_days();
    let steps = (behind + step_days - 1) / step_days;
    start.checked_add_signed(Duration::days(steps * step_days))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use recurra_domain::{NewRecurrenceRule, TransactionKind};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, start: NaiveDate, day_of_month: Option<u32>) -> RecurrenceRule {
        let draft = NewRecurrenceRule {
            owner_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            kind: TransactionKind::Expense,
            amount: Decimal::new(5000, 2),
            description: String::new(),
            frequency: frequency.to_string(),
            start_date: start,
            end_date: None,
            max_occurrences: None,
            day_of_month,
        };
        RecurrenceRule::from_draft(draft, frequency, Utc::now())
    }

    #[test]
    fn monthly_day_31_clamps_to_short_months() {
        let rule = rule(Frequency::Monthly, date(2023, 1, 31), Some(31));
        assert_eq!(
            project(&rule, date(2023, 1, 1), date(2023, 3, 31)),
            vec![date(2023, 1, 31), date(2023, 2, 28), date(2023, 3, 31)]
        );
    }

    #[test]
    fn monthly_clamps_to_leap_february() {
        let rule = rule(Frequency::Monthly, date(2024, 1, 30), None);
        assert_eq!(
            project(&rule, date(2024, 1, 1), date(2024, 3, 31)),
            vec![date(2024, 1, 30), date(2024, 2, 29), date(2024, 3, 30)]
        );
    }

    #[test]
    fn monthly_skips_candidates_before_start_date() {
        let rule = rule(Frequency::Monthly, date(2025, 3, 20), Some(5));
        assert_eq!(
            project(&rule, date(2025, 3, 1), date(2025, 5, 31)),
            vec![date(2025, 4, 5), date(2025, 5, 5)]
        );
    }

    #[test]
    fn monthly_crosses_year_boundary() {
        let rule = rule(Frequency::Monthly, date(2024, 11, 15), None);
        assert_eq!(
            project(&rule, date(2024, 11, 1), date(2025, 1, 31)),
            vec![date(2024, 11, 15), date(2024, 12, 15), date(2025, 1, 15)]
        );
    }

    #[test]
    fn weekly_steps_from_start_date_into_window() {
        let rule = rule(Frequency::Weekly, date(2025, 1, 1), None);
        assert_eq!(
            project(&rule, date(2025, 1, 10), date(2025, 1, 31)),
            vec![date(2025, 1, 15), date(2025, 1, 22), date(2025, 1, 29)]
        );
    }

    #[test]
    fn biweekly_keeps_its_phase() {
        let rule = rule(Frequency::Biweekly, date(2025, 1, 3), None);
        assert_eq!(
            project(&rule, date(2025, 1, 17), date(2025, 2, 28)),
            vec![date(2025, 1, 17), date(2025, 1, 31), date(2025, 2, 14), date(2025, 2, 28)]
        );
    }

    #[test]
    fn week_based_rules_never_emit_before_start() {
        let rule = rule(Frequency::Weekly, date(2025, 6, 10), None);
        let dates = project(&rule, date(2025, 6, 1), date(2025, 6, 30));
        assert_eq!(dates.first(), Some(&date(2025, 6, 10)));
        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn yearly_rolls_to_next_year_when_anchor_precedes_window() {
        let rule = rule(Frequency::Yearly, date(2020, 3, 10), None);
        assert_eq!(
            project(&rule, date(2025, 4, 1), date(2027, 12, 31)),
            vec![date(2026, 3, 10), date(2027, 3, 10)]
        );
    }

    #[test]
    fn yearly_leap_day_clamps_to_feb_28_in_common_years() {
        let rule = rule(Frequency::Yearly, date(2024, 2, 29), None);
        assert_eq!(
            project(&rule, date(2024, 1, 1), date(2028, 12, 31)),
            vec![
                date(2024, 2, 29),
                date(2025, 2, 28),
                date(2026, 2, 28),
                date(2027, 2, 28),
                date(2028, 2, 29),
            ]
        );
    }

    #[test]
    fn yearly_leap_day_window_starting_on_clamped_date() {
        let rule = rule(Frequency::Yearly, date(2024, 2, 29), None);
        assert_eq!(
            project(&rule, date(2025, 2, 28), date(2025, 12, 31)),
            vec![date(2025, 2, 28)]
        );
    }

    #[test]
    fn restarting_later_yields_a_suffix() {
        for frequency in Frequency::ALL {
            let rule = rule(frequency, date(2024, 1, 31), None);
            let end = date(2030, 12, 31);
            let full = project(&rule, date(2024, 1, 1), end);
            for restart in [date(2024, 2, 29), date(2025, 7, 4), date(2028, 2, 1)] {
                let tail = project(&rule, restart, end);
                assert!(full.ends_with(&tail), "{frequency} restart at {restart}");
                assert!(tail.iter().all(|d| *d >= restart));
                let skipped = full.iter().filter(|d| **d < restart).count();
                assert_eq!(skipped + tail.len(), full.len());
            }
        }
    }

    #[test]
    fn empty_or_inverted_window_yields_nothing() {
        let rule = rule(Frequency::Weekly, date(2025, 1, 1), None);
        assert!(project(&rule, date(2025, 2, 1), date(2025, 1, 1)).is_empty());
        assert!(project(&rule, date(2025, 1, 2), date(2025, 1, 7)).is_empty());
    }

    #[test]
    fn projection_is_lazy() {
        let rule = rule(Frequency::Weekly, date(2025, 1, 1), None);
        let first_two: Vec<_> = Projection::new(&rule, date(2025, 1, 1), NaiveDate::MAX)
            .take(2)
            .collect();
        assert_eq!(first_two, vec![date(2025, 1, 1), date(2025, 1, 8)]);
    }
}
