//! Core log engine for the timelog time tracker.
//!
//! This crate contains the types and logic for:
//! - Log storage: the append-only activity log and its time corrections
//! - Windows: bounded views deriving timed entries from raw log lines
//! - Grouping: merging, categorizing and totalling entries
//! - Reports: daily, weekly, monthly and custom-range plain-text reports
//! - The task list, the sent-report ledger, and iCalendar/CSV exports

pub mod error;
pub mod export;
mod grouping;
pub mod ledger;
mod report;
mod settings;
mod source;
mod store;
mod tasks;
pub mod time;
mod window;

pub use error::{Result, StoreError, ValidationError};
pub use grouping::{CategorizedEntries, EntryOrder, GroupedEntries, GroupedEntry, Totals, split_category};
pub use ledger::{ReportRecord, report_id};
pub use report::{Report, ReportGenerator, ReportKind, ReportStyle};
pub use settings::Settings;
pub use source::Source;
pub use store::{LogStore, RawItem, parse_line};
pub use tasks::{OTHER_GROUP, TaskGroup, TaskList, TaskOrder};
pub use window::{EXCLUDED_MARKER, Entries, Entry, SLACK_MARKER, Window, split_tags};
