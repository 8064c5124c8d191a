//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tl_core::time::virtual_day;
use tl_core::{LogStore, ReportKind, Source, Window};

use crate::cli::PeriodArgs;
use crate::config::Config;

/// Parses a date as `YYYY-MM-DD`, `today` or `yesterday`.
///
/// `today` is the virtual day, so shortly after midnight it still names the
/// previous date.
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    match s {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD, 'today' or 'yesterday'")),
    }
}

/// Period covered by a report or a totals query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day(NaiveDate),
    Week(NaiveDate),
    Month(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl Period {
    /// Resolves `--week`/`--month`/`--date` against the current virtual day.
    pub fn resolve(args: &PeriodArgs, today: NaiveDate) -> Result<Self> {
        let date = match &args.date {
            Some(s) => parse_date(s, today)?,
            None => today,
        };
        Ok(if args.week {
            Self::Week(date)
        } else if args.month {
            Self::Month(date)
        } else {
            Self::Day(date)
        })
    }

    /// Resolves an inclusive `FROM TO` range.
    pub fn range(from: &str, to: &str, today: NaiveDate) -> Result<Self> {
        let first = parse_date(from, today)?;
        let last = parse_date(to, today)?;
        anyhow::ensure!(first <= last, "Range start {first} is after its end {last}");
        Ok(Self::Range(first, last))
    }

    pub const fn kind(self) -> ReportKind {
        match self {
            Self::Day(_) => ReportKind::Daily,
            Self::Week(_) => ReportKind::Weekly,
            Self::Month(_) => ReportKind::Monthly,
            Self::Range(..) => ReportKind::CustomRange,
        }
    }

    /// The date the period was selected by; the first day for ranges.
    pub const fn anchor(self) -> NaiveDate {
        match self {
            Self::Day(d) | Self::Week(d) | Self::Month(d) | Self::Range(d, _) => d,
        }
    }

    pub fn window(self, store: &LogStore) -> Window {
        match self {
            Self::Day(d) => store.window_for_day(d),
            Self::Week(d) => store.window_for_week(d),
            Self::Month(d) => store.window_for_month(d),
            Self::Range(first, last) => store.window_for_date_range(first, last),
        }
    }
}

/// Today's virtual date.
pub fn today(config: &Config, now: NaiveDateTime) -> NaiveDate {
    virtual_day(now, config.virtual_midnight)
}

/// Creates the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Opens the activity log named by the configuration.
pub fn open_log(config: &Config) -> Result<LogStore> {
    LogStore::open(Source::path(&config.log_path), &config.settings())
        .with_context(|| format!("failed to open log {}", config.log_path.display()))
}
