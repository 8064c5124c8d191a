//! Export command: the whole log as iCalendar or CSV on stdout.

use std::io::{BufWriter, Write, stdout};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tl_core::export::{write_csv_complete, write_csv_daily, write_icalendar};

use super::util::open_log;
use crate::cli::ExportFormat;
use crate::config::Config;

/// Runs the export command.
pub fn run(config: &Config, format: ExportFormat, now: DateTime<Utc>) -> Result<()> {
    let store = open_log(config)?;
    let window = store.whole_history();
    tracing::debug!(items = window.len(), ?format, "exporting");

    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let written = match format {
        ExportFormat::Ics => write_icalendar(&window, &mut writer, &config.host(), now),
        ExportFormat::Csv => write_csv_complete(&window, &mut writer),
        ExportFormat::DailyCsv => write_csv_daily(&window, &mut writer),
    };
    written.context("failed to write export")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}
