//! `tl sent`: who a report was already sent to.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tl_core::{ReportKind, ReportRecord, report_id};

use super::util::{parse_date, today};
use crate::config::Config;

/// Runs the sent command.
pub fn run(config: &Config, kind: &str, date: Option<&str>, now: NaiveDateTime) -> Result<()> {
    let kind: ReportKind = kind.parse()?;
    let today = today(config, now);
    let date = match date {
        Some(s) => parse_date(s, today)?,
        None => today,
    };
    let Some(id) = report_id(kind, date) else {
        anyhow::bail!("{kind} reports are not recorded");
    };

    let mut ledger = ReportRecord::open(&config.ledger_path).context("failed to open ledger")?;
    let recipients = ledger
        .get_recipients(kind, date)
        .context("failed to read ledger")?;
    if recipients.is_empty() {
        println!("The {kind} report for {id} has not been sent.");
    } else {
        for recipient in recipients {
            println!("{recipient}");
        }
    }
    Ok(())
}
