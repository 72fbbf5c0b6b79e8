//! recurra-config
//!
//! User configuration for the recurring transaction engine and its on-disk
//! persistence with backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
