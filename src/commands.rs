//! Non-interactive command runner behind `recurra_cli`.
//!
//! Results are printed to stdout as JSON; status lines go to stderr.

use std::{
    env,
    io::{self, Read, Write},
    str::FromStr,
};

use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use recurra_core::{Clock, ResumeOutcome};
use recurra_domain::{
    ConflictResolution, DeleteMode, NewRecurrenceRule, ParseEnumError, RuleFilter, TransactionKind,
};

use crate::{app::App, errors::AppError, init_with_filter, paths::app_home};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// A resume was blocked by instances already in the current month.
pub const EXIT_NEEDS_DECISION: i32 = 2;

pub const USAGE: &str = "Usage: recurra_cli <command>\n\
Commands:\n  \
create < rule.json\n  \
list <owner-id> [--kind income|expense] [--active|--paused] [--page N] [--per-page N]\n  \
show <rule-id>\n  \
instances <rule-id>\n  \
pause <rule-id>\n  \
resume <rule-id> [create|update]\n  \
delete <rule-id> <all|future_and_current|future_only>\n  \
project <from> <to> < rule.json\n  \
help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create,
    List { owner_id: Uuid, filter: RuleFilter },
    Show(Uuid),
    Instances(Uuid),
    Pause(Uuid),
    Resume {
        rule_id: Uuid,
        resolution: Option<ConflictResolution>,
    },
    Delete { rule_id: Uuid, mode: DeleteMode },
    Project { from: NaiveDate, to: NaiveDate },
    Help,
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<Command, AppError> {
    let mut args = args.iter().map(String::as_str);
    let name = args.next().unwrap_or("help");
    let command = match name {
        "create" => Command::Create,
        "list" => {
            let owner_id = parse_uuid(args.next(), "owner id")?;
            let mut filter = RuleFilter::default();
            while let Some(flag) = args.next() {
                match flag {
                    "--kind" => {
                        let raw = required(args.next(), "--kind value")?;
                        filter.kind = Some(parse_enum::<TransactionKind>(raw)?);
                    }
                    "--active" => filter.is_active = Some(true),
                    "--paused" => filter.is_active = Some(false),
                    "--page" => filter.page = parse_number(args.next(), "--page")?,
                    "--per-page" => filter.per_page = parse_number(args.next(), "--per-page")?,
                    other => return Err(AppError::input(format!("unknown list option `{other}`"))),
                }
            }
            return Ok(Command::List { owner_id, filter });
        }
        "show" => Command::Show(parse_uuid(args.next(), "rule id")?),
        "instances" => Command::Instances(parse_uuid(args.next(), "rule id")?),
        "pause" => Command::Pause(parse_uuid(args.next(), "rule id")?),
        "resume" => Command::Resume {
            rule_id: parse_uuid(args.next(), "rule id")?,
            resolution: args.next().map(parse_enum).transpose()?,
        },
        "delete" => Command::Delete {
            rule_id: parse_uuid(args.next(), "rule id")?,
            mode: parse_enum(required(args.next(), "delete mode")?)?,
        },
        "project" => Command::Project {
            from: parse_date(args.next(), "from date")?,
            to: parse_date(args.next(), "to date")?,
        },
        "help" | "--help" | "-h" => Command::Help,
        other => return Err(AppError::input(format!("unknown command `{other}`"))),
    };
    match args.next() {
        Some(extra) => Err(AppError::input(format!("unexpected argument `{extra}`"))),
        None => Ok(command),
    }
}

/// Runs one command and returns the process exit code.
pub fn execute<C: Clock>(
    app: &App<C>,
    command: Command,
    input: &mut impl Read,
    out: &mut impl Write,
) -> Result<i32, AppError> {
    match command {
        Command::Create => {
            let draft = read_draft(input)?;
            let created = app.create(draft)?;
            write_json(out, &created)?;
            status(&format!(
                "Created recurring rule {} with {} instance(s)",
                created.rule.id, created.generated
            ));
        }
        Command::List { owner_id, filter } => write_json(out, &app.rules(owner_id, &filter)?)?,
        Command::Show(rule_id) => write_json(out, &app.rule(rule_id)?)?,
        Command::Instances(rule_id) => write_json(out, &app.instances(rule_id)?)?,
        Command::Pause(rule_id) => {
            let report = app.pause(rule_id)?;
            write_json(out, &report)?;
            status(&format!(
                "Paused rule {}: removed {} instance(s) from {}",
                rule_id, report.removed, report.cutoff
            ));
        }
        Command::Resume { rule_id, resolution } => {
            let outcome = app.resume(rule_id, resolution)?;
            write_json(out, &outcome)?;
            match outcome {
                ResumeOutcome::Applied(report) => status(&format!(
                    "Resumed rule {}: {} inserted, {} updated",
                    rule_id, report.generation.inserted, report.generation.updated
                )),
                ResumeOutcome::NeedsDecision { existing, .. } => {
                    let message = format!(
                        "Rule {} already has {} instance(s) this month; \
                         rerun with `create` or `update`",
                        rule_id,
                        existing.len()
                    );
                    eprintln!("{}", message.yellow());
                    return Ok(EXIT_NEEDS_DECISION);
                }
            }
        }
        Command::Delete { rule_id, mode } => {
            let report = app.delete(rule_id, mode)?;
            write_json(out, &report)?;
            status(&format!(
                "Deleted rule {} ({}): removed {} instance(s)",
                rule_id, mode, report.removed
            ));
        }
        Command::Project { from, to } => {
            let draft = read_draft(input)?;
            write_json(out, &app.project(draft, from, to)?)?;
        }
        Command::Help => writeln!(out, "{USAGE}")?,
    }
    Ok(EXIT_OK)
}

/// Entry point used by the binary: parses `env::args`, opens the home
/// directory and runs the command against stdin/stdout.
pub fn run_cli() -> Result<i32, AppError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(EXIT_OK);
    }

    let app = App::open(&app_home())?;
    init_with_filter(&app.config().log_filter);
    if !app.config().color_output {
        colored::control::set_override(false);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&app, command, &mut io::stdin().lock(), &mut out)
}

fn status(message: &str) {
    eprintln!("{}", message.green());
}

fn read_draft(input: &mut impl Read) -> Result<NewRecurrenceRule, AppError> {
    let mut buffer = String::new();
    input.read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Err(AppError::input("expected a rule as JSON on stdin"));
    }
    Ok(serde_json::from_str(&buffer)?)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, AppError> {
    value.ok_or_else(|| AppError::input(format!("missing {what}")))
}

fn parse_uuid(value: Option<&str>, what: &str) -> Result<Uuid, AppError> {
    let raw = required(value, what)?;
    Uuid::parse_str(raw).map_err(|_| AppError::input(format!("invalid {what} `{raw}`")))
}

fn parse_date(value: Option<&str>, what: &str) -> Result<NaiveDate, AppError> {
    let raw = required(value, what)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::input(format!("invalid {what} `{raw}`, expected YYYY-MM-DD")))
}

fn parse_enum<T: FromStr<Err = ParseEnumError>>(raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|err| AppError::input(err.to_string()))
}

fn parse_number(value: Option<&str>, what: &str) -> Result<u32, AppError> {
    let raw = required(value, what)?;
    raw.parse()
        .map_err(|_| AppError::input(format!("invalid {what} value `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, AppError> {
        let owned: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        parse_args(&owned)
    }

    #[test]
    fn no_arguments_means_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn list_flags_build_a_filter() {
        let owner = Uuid::new_v4();
        let owner_arg = owner.to_string();
        let command = parse(&[
            "list", &owner_arg, "--kind", "income", "--paused", "--page", "3",
        ])
        .unwrap();
        let Command::List { owner_id, filter } = command else {
            panic!("expected list command");
        };
        assert_eq!(owner_id, owner);
        assert_eq!(filter.kind, Some(TransactionKind::Income));
        assert_eq!(filter.is_active, Some(false));
        assert_eq!(filter.page, 3);
    }

    #[test]
    fn resume_resolution_is_optional() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            parse(&["resume", &id]).unwrap(),
            Command::Resume { resolution: None, .. }
        ));
        assert!(matches!(
            parse(&["resume", &id, "update"]).unwrap(),
            Command::Resume {
                resolution: Some(ConflictResolution::Update),
                ..
            }
        ));
        assert!(parse(&["resume", &id, "merge"]).is_err());
    }

    #[test]
    fn delete_requires_a_known_mode() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            parse(&["delete", &id, "future_only"]).unwrap(),
            Command::Delete {
                mode: DeleteMode::FutureOnly,
                ..
            }
        ));
        assert!(matches!(parse(&["delete", &id]), Err(AppError::Input(_))));
        assert!(matches!(parse(&["delete", &id, "later"]), Err(AppError::Input(_))));
    }

    #[test]
    fn malformed_arguments_are_input_errors() {
        assert!(matches!(parse(&["show", "not-a-uuid"]), Err(AppError::Input(_))));
        assert!(matches!(parse(&["project", "2025-13-01", "2025-12-31"]), Err(AppError::Input(_))));
        assert!(matches!(parse(&["frobnicate"]), Err(AppError::Input(_))));
        let id = Uuid::new_v4().to_string();
        assert!(matches!(parse(&["pause", &id, "now"]), Err(AppError::Input(_))));
    }
}
