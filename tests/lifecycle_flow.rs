mod common;

use std::collections::HashSet;

use common::{at, date, draft, open_app, temp_home};
use recurra::{
    config::{Config, ConfigManager},
    domain::{ConflictResolution, DeleteMode, Money},
    engine::ResumeOutcome,
    AppError,
};

#[test]
fn pause_and_resume_survive_reopening_the_home() {
    let home = temp_home();
    let mut rent = draft("monthly", date(2025, 1, 5), "1500.00");
    rent.end_date = Some(date(2025, 12, 31));

    let rule_id = {
        let app = open_app(&home, at(2025, 1, 1));
        let created = app.create(rent).expect("create rule");
        assert_eq!(created.generated, 12);
        created.rule.id
    };

    {
        let app = open_app(&home, at(2025, 4, 20));
        let report = app.pause(rule_id).expect("pause");
        assert_eq!(report.removed, 8);
    }

    let app = open_app(&home, at(2025, 4, 25));
    assert!(!app.rule(rule_id).unwrap().is_active);

    let blocked = app.resume(rule_id, None).expect("resume without decision");
    assert!(matches!(
        blocked,
        ResumeOutcome::NeedsDecision { ref existing, .. } if existing.len() == 1
    ));
    assert!(!app.rule(rule_id).unwrap().is_active);

    let applied = app
        .resume(rule_id, Some(ConflictResolution::Update))
        .expect("resume with update");
    let ResumeOutcome::Applied(report) = applied else {
        panic!("expected the resume to apply");
    };
    assert_eq!(report.generation.updated, 1);
    assert_eq!(report.generation.inserted, 8);

    let reopened = open_app(&home, at(2025, 4, 26));
    let instances = reopened.instances(rule_id).unwrap();
    let dates: HashSet<_> = instances.iter().map(|txn| txn.date).collect();
    assert_eq!(instances.len(), 12);
    assert_eq!(dates.len(), 12);
    assert!(instances.iter().all(|txn| txn.amount == Money::from_cents(150_000)));
    assert!(reopened.rule(rule_id).unwrap().is_active);
}

#[test]
fn configured_ceiling_bounds_open_ended_rules() {
    let home = temp_home();
    let manager = ConfigManager::with_home(&home).unwrap();
    manager
        .save(&Config {
            projection_years: 1,
            ..Config::default()
        })
        .unwrap();

    let app = open_app(&home, at(2025, 1, 1));
    assert_eq!(app.service().settings().projection_years, 1);
    let created = app.create(draft("weekly", date(2025, 1, 1), "25.00")).unwrap();
    assert_eq!(created.generated, 53);
}

#[test]
fn data_dir_override_moves_the_snapshot() {
    let home = temp_home();
    let elsewhere = temp_home().join("shared");
    ConfigManager::with_home(&home)
        .unwrap()
        .save(&Config {
            data_dir: Some(elsewhere.clone()),
            ..Config::default()
        })
        .unwrap();

    let app = open_app(&home, at(2025, 1, 1));
    app.create(draft("yearly", date(2025, 3, 1), "99.90")).unwrap();
    assert!(elsewhere.join("recurra.json").exists());
    assert!(!home.join("data").join("recurra.json").exists());
}

#[test]
fn deleting_future_only_keeps_history_on_disk() {
    let home = temp_home();
    let mut salary = draft("monthly", date(2025, 1, 25), "4200.00");
    salary.end_date = Some(date(2025, 12, 31));

    let rule_id = open_app(&home, at(2025, 1, 1)).create(salary).unwrap().rule.id;
    let report = open_app(&home, at(2025, 3, 10))
        .delete(rule_id, DeleteMode::FutureOnly)
        .unwrap();
    assert_eq!(report.removed, 9);

    let app = open_app(&home, at(2025, 3, 11));
    assert!(matches!(app.rule(rule_id), Err(AppError::Core(ref err)) if err.is_not_found()));
    let left = app.service().store().snapshot().unwrap().instances;
    assert_eq!(left.len(), 3);
    assert!(left.iter().all(|txn| txn.rule_id == Some(rule_id)));
}

#[test]
fn projecting_a_draft_writes_nothing() {
    let home = temp_home();
    let app = open_app(&home, at(2025, 1, 1));
    let entries = app
        .project(draft("biweekly", date(2025, 1, 3), "80.00"), date(2025, 1, 1), date(2025, 2, 28))
        .unwrap();
    let dates: Vec<_> = entries.iter().map(|entry| entry.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 1, 3),
            date(2025, 1, 17),
            date(2025, 1, 31),
            date(2025, 2, 14),
            date(2025, 2, 28),
        ]
    );
    assert!(app.service().store().snapshot().unwrap().rules.is_empty());

    let err = app
        .project(draft("weekly", date(2025, 1, 1), "1.00"), date(2025, 3, 1), date(2025, 2, 1))
        .unwrap_err();
    assert!(matches!(err, AppError::Input(_)));
}
