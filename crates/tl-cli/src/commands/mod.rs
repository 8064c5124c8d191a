//! CLI subcommand implementations.

pub mod add;
pub mod export;
pub mod report;
pub mod sent;
pub mod tasks;
pub mod totals;
pub mod undo;
pub mod util;
