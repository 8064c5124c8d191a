//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Plain-text time log.
///
/// Each line of the log records when an activity ended. Reports, totals and
/// exports are derived from the gaps between lines.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record that an activity just ended.
    ///
    /// A leading `HH:MM`, `-N` or `+N` corrects the time: an absolute time
    /// today, N minutes ago, or N minutes after the last entry.
    Add {
        /// Entry text, optionally with a time correction.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Comment out the last entry of today.
    Undo,

    /// Print a report, optionally as a mail to a recipient.
    Report(ReportArgs),

    /// Show total work and slacking time.
    Totals(TotalsArgs),

    /// Export the whole log to stdout.
    Export {
        /// Output format.
        #[arg(value_enum)]
        format: ExportFormat,
    },

    /// List the reference task groups.
    Tasks,

    /// List recipients a report was already sent to.
    Sent {
        /// Report kind (daily, weekly, monthly).
        kind: String,

        /// Any day in the reported period (default: today).
        #[arg(long)]
        date: Option<String>,
    },
}

/// Period selection shared by `report` and `totals`.
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Cover the week containing the date.
    #[arg(long, conflicts_with = "month")]
    pub week: bool,

    /// Cover the month containing the date.
    #[arg(long)]
    pub month: bool,

    /// Any day in the period (YYYY-MM-DD, today, yesterday).
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Cover an inclusive date range.
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"], conflicts_with_all = ["week", "month", "date"])]
    pub range: Option<Vec<String>>,

    /// Report style (plain, categorized).
    #[arg(long)]
    pub style: Option<String>,

    /// Entry order (start, name, duration, task-list).
    #[arg(long)]
    pub order: Option<String>,

    /// Render as a mail to this recipient and record the send.
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct TotalsArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Only count entries with this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Only count entries containing this text.
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// iCalendar, one event per entry.
    Ics,
    /// Minutes per task.
    Csv,
    /// Hours per day.
    DailyCsv,
}
