//! Report command for generating time reports.
//!
//! This module implements `tl report` for a day, week, month or an explicit
//! date range. With `--to`, the report is printed as a mail and the send is
//! recorded in the ledger.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tl_core::{
    EntryOrder, LogStore, Report, ReportGenerator, ReportRecord, ReportStyle, Settings, Source,
    TaskList,
};

use super::util::{Period, ensure_parent_dir, open_log, today};
use crate::cli::ReportArgs;
use crate::config::Config;

/// Parses an `--order` value. `task-list` reads the task file.
pub fn parse_order(value: &str, config: &Config) -> Result<EntryOrder> {
    if value == "task-list" {
        let tasks = TaskList::open(Source::path(&config.tasks_path))
            .with_context(|| format!("failed to read task list {}", config.tasks_path.display()))?;
        return Ok(EntryOrder::TaskList(tasks.snapshot()));
    }
    Ok(value.parse()?)
}

/// Renders the report for `period`, in the configured style unless `style` is given.
pub fn render(
    store: &LogStore,
    settings: &Settings,
    period: Period,
    style: Option<ReportStyle>,
    order: Option<EntryOrder>,
) -> Report {
    let window = period.window(store);
    let mut generator = ReportGenerator::new(&window, settings);
    if let Some(order) = order {
        generator = generator.with_order(order);
    }
    match style {
        Some(style) => generator.report(period.kind(), style),
        None => generator.report_default(period.kind()),
    }
}

/// Records a send, warning when the report already went to `recipient`.
fn record_send(
    config: &Config,
    period: Period,
    recipient: &str,
    now: NaiveDateTime,
) -> Result<()> {
    ensure_parent_dir(&config.ledger_path)?;
    let mut ledger = ReportRecord::open(&config.ledger_path).context("failed to open ledger")?;
    let kind = period.kind();
    let date = period.anchor();

    let previous = ledger
        .get_recipients(kind, date)
        .context("failed to read ledger")?;
    if previous.iter().any(|r| r == recipient) {
        tracing::warn!(%kind, %date, recipient, "report was already sent to this recipient");
    }

    let recorded = ledger
        .record(kind, date, recipient, now)
        .context("failed to record sent report")?;
    if !recorded {
        tracing::debug!(%kind, "report kind is not tracked in the ledger");
    }
    Ok(())
}

/// Runs the report command.
pub fn run(config: &Config, args: &ReportArgs, now: NaiveDateTime) -> Result<()> {
    let today = today(config, now);
    let period = match args.range.as_deref() {
        Some([from, to]) => Period::range(from, to, today)?,
        Some(_) => anyhow::bail!("--range takes exactly two dates"),
        None => Period::resolve(&args.period, today)?,
    };
    let style: Option<ReportStyle> = args.style.as_deref().map(str::parse).transpose()?;
    let order = args
        .order
        .as_deref()
        .map(|o| parse_order(o, config))
        .transpose()?;

    let store = open_log(config)?;
    let report = render(&store, &config.settings(), period, style, order);

    if let Some(recipient) = &args.to {
        print!("{}", report.to_email(recipient));
        record_send(config, period, recipient, now)?;
    } else {
        print!("{}", report.body);
    }
    Ok(())
}
