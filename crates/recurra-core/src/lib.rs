//! recurra-core
//!
//! The recurring transaction engine: date projection, installment
//! allocation, and the rule lifecycle (create, pause, resume, delete).
//! Depends on recurra-domain. No CLI, no terminal I/O; persistence is reached
//! only through the [`storage`] traits.

pub mod error;
pub mod installment;
pub mod lifecycle;
pub mod projector;
pub mod storage;
pub mod time;
pub mod validation;
pub mod window;

pub use error::CoreError;
pub use installment::*;
pub use lifecycle::*;
pub use projector::*;
pub use storage::{DatePredicate, InstanceStore, MemoryStore, RecurrenceStore, RuleStore, Snapshot};
pub use time::{Clock, FixedClock};
pub use validation::validate;
pub use window::*;
