//! Timelog CLI library.
//!
//! This crate provides the `tl` command-line interface on top of `tl-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ExportFormat, PeriodArgs, ReportArgs, TotalsArgs};
pub use config::Config;
