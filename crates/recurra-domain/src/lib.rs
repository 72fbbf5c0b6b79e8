//! recurra-domain
//!
//! Pure domain models for recurring bookkeeping (rules, materialized
//! instances, money, calendar arithmetic, listing filters).
//! No I/O, no storage. Only data types and core enums.

pub mod calendar;
pub mod common;
pub mod filter;
pub mod instance;
pub mod money;
pub mod rule;

pub use calendar::*;
pub use common::*;
pub use filter::*;
pub use instance::*;
pub use money::*;
pub use rule::*;
