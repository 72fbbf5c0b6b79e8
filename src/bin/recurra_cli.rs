use std::process;

use colored::Colorize;
use recurra::{
    commands::{run_cli, EXIT_FAILURE},
    AppError,
};

fn main() {
    match run_cli() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{} {err}", "Error:".red());
            if matches!(err, AppError::Input(_)) {
                eprintln!("Run `recurra_cli help` for usage.");
            }
            process::exit(EXIT_FAILURE);
        }
    }
}
