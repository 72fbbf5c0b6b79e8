#![doc(test(attr(deny(warnings))))]

//! Recurra turns recurring income and expense rules into dated transaction
//! instances and keeps them consistent as rules are paused, resumed and
//! deleted.
//!
//! The engine lives in `recurra-core`; this crate wires it to the JSON store
//! and user configuration and hosts the command-line runner.

pub mod app;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod paths;
pub mod utils;

pub use recurra_config as config;
pub use recurra_core as engine;
pub use recurra_domain as domain;
pub use recurra_storage_json as storage;

pub use app::{engine_settings, App};
pub use clock::SystemClock;
pub use errors::AppError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Initializes global tracing once; later calls are no-ops whatever their
/// filter.
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("recurra tracing initialized");
    });
}
