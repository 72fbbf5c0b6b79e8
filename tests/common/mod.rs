#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use recurra::{
    domain::{NewRecurrenceRule, TransactionKind},
    engine::FixedClock,
    App,
};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated application home.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let home = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    home
}

/// Opens the home with the clock pinned at `now`.
pub fn open_app(home: &Path, now: DateTime<Utc>) -> App<FixedClock> {
    App::open_with_clock(home, FixedClock(now)).expect("open app")
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 30, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn draft(frequency: &str, start: NaiveDate, amount: &str) -> NewRecurrenceRule {
    NewRecurrenceRule {
        owner_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        kind: TransactionKind::Expense,
        amount: amount.parse::<Decimal>().expect("decimal amount"),
        description: "Rent".into(),
        frequency: frequency.into(),
        start_date: start,
        end_date: None,
        max_occurrences: None,
        day_of_month: None,
    }
}
