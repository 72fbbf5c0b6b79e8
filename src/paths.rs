use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "RECURRA_HOME";
const DEFAULT_DIR_NAME: &str = ".recurra";

/// Returns the application home, `$RECURRA_HOME` when set and non-empty,
/// otherwise `~/.recurra`.
pub fn app_home() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME),
    }
}
