//! Plain-text report generation.
//!
//! Reports come in four kinds (daily, weekly, monthly, custom range) and two
//! styles. The plain style lists merged entries with long durations followed
//! by category and tag breakdowns; the categorized style groups entries under
//! category headers with `H:MM` subtotals.

use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::grouping::{CategorizedEntries, EntryOrder, GroupedEntry};
use crate::settings::Settings;
use crate::time::{format_duration_long, format_duration_short};
use crate::window::Window;

/// Width of the entry column in plain reports.
const ENTRY_WIDTH: usize = 62;

/// Width of a categorized report line.
const LINE_WIDTH: usize = 70;

/// Label for entries without a category in plain reports.
const NO_CATEGORY: &str = "(none)";

/// Header for entries without a category in categorized reports.
const NO_CATEGORY_HEADER: &str = "No category";

/// Period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Daily,
    Weekly,
    Monthly,
    CustomRange,
}

impl ReportKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::CustomRange => "custom-range",
        }
    }

    /// Word used in "No work done this ...".
    pub const fn period_name(&self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::CustomRange => "period",
        }
    }

    /// Default ordering of entries for this kind of report.
    pub fn default_order(&self) -> EntryOrder {
        match self {
            Self::Daily => EntryOrder::Start,
            _ => EntryOrder::Name,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "custom-range" => Ok(Self::CustomRange),
            _ => Err(ValidationError::UnknownReportKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Layout of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    #[default]
    Plain,
    Categorized,
}

impl ReportStyle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Categorized => "categorized",
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "categorized" => Ok(Self::Categorized),
            _ => Err(ValidationError::UnknownReportStyle {
                value: s.to_string(),
            }),
        }
    }
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    pub subject: String,
    pub body: String,
}

impl Report {
    /// Renders the report as a mail message with `To:` and `Subject:` headers.
    pub fn to_email(&self, recipient: &str) -> String {
        format!("To: {recipient}\nSubject: {}\n\n{}", self.subject, self.body)
    }
}

/// Renders reports for a window.
#[derive(Debug)]
pub struct ReportGenerator<'a> {
    window: &'a Window,
    name: &'a str,
    style: ReportStyle,
    order: Option<EntryOrder>,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(window: &'a Window, settings: &'a Settings) -> Self {
        Self {
            window,
            name: settings.name.as_str(),
            style: settings.report_style,
            order: None,
        }
    }

    /// Overrides the entry ordering used for every report kind.
    #[must_use]
    pub fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Renders a report in the configured style.
    pub fn report_default(&self, kind: ReportKind) -> Report {
        self.report(kind, self.style)
    }

    /// Renders a report of the given kind and style.
    pub fn report(&self, kind: ReportKind, style: ReportStyle) -> Report {
        let mut body = String::new();
        if self.window.is_empty() {
            writeln!(body, "No work done this {}.", kind.period_name()).unwrap();
        } else {
            match style {
                ReportStyle::Plain => self.plain(kind, &mut body),
                ReportStyle::Categorized => self.categorized(kind, &mut body),
            }
        }
        Report {
            kind,
            subject: self.subject(kind),
            body,
        }
    }

    /// Subject line for the report.
    pub fn subject(&self, kind: ReportKind) -> String {
        let first = self.window.min().date();
        let name = self.name;
        match kind {
            ReportKind::Daily => format!(
                "{} report for {name} ({}, week {:02})",
                first.format("%Y-%m-%d"),
                weekday_abbr(first.weekday()),
                first.iso_week().week()
            ),
            ReportKind::Weekly => {
                format!("Weekly report for {name} (week {:02})", first.iso_week().week())
            }
            ReportKind::Monthly => format!("Monthly report for {name} ({})", first.format("%Y/%m")),
            ReportKind::CustomRange => format!(
                "Custom date range report for {name} ({} - {})",
                first.format("%Y-%m-%d"),
                self.last_date().format("%Y-%m-%d")
            ),
        }
    }

    /// Last day covered by the window, inclusive.
    fn last_date(&self) -> NaiveDate {
        (self.window.max() - Duration::days(1)).date()
    }

    fn order(&self, kind: ReportKind) -> EntryOrder {
        self.order.clone().unwrap_or_else(|| kind.default_order())
    }

    fn write_start(&self, out: &mut String) {
        if let Some(first) = self.window.all_entries().next() {
            writeln!(out, "Start at {}", first.start.format("%H:%M")).unwrap();
            writeln!(out).unwrap();
        }
    }

    fn plain(&self, kind: ReportKind, out: &mut String) {
        let order = self.order(kind);
        let grouped = self.window.grouped_entries(true, &order);
        let totals = self.window.totals(None, None);

        if kind == ReportKind::Daily {
            self.write_start(out);
        }

        let mut wrote_rows = false;
        for entry in grouped.work.iter().filter(|e| !e.duration.is_zero()) {
            write_long_row(out, &capitalize(&entry.text), entry.duration);
            wrote_rows = true;
        }
        if wrote_rows {
            writeln!(out).unwrap();
        }
        writeln!(out, "{}{}", total_label(kind), format_duration_long(totals.work)).unwrap();

        let categorized = self.window.categorized_work_entries(&order);
        write_category_breakdown(out, &categorized);
        self.write_tags(out);

        if kind == ReportKind::Daily {
            let slack: Vec<&GroupedEntry> =
                grouped.slack.iter().filter(|e| !e.duration.is_zero()).collect();
            if !slack.is_empty() {
                writeln!(out).unwrap();
                writeln!(out, "Slacking:").unwrap();
                writeln!(out).unwrap();
                for entry in slack {
                    write_long_row(out, &capitalize(&entry.text), entry.duration);
                }
            }
            writeln!(out).unwrap();
            writeln!(out, "Time spent slacking: {}", format_duration_long(totals.slack)).unwrap();
        }
    }

    fn categorized(&self, kind: ReportKind, out: &mut String) {
        let order = self.order(kind);
        let categorized = self.window.categorized_work_entries(&order);
        let totals = self.window.totals(None, None);

        if kind == ReportKind::Daily {
            self.write_start(out);
        }

        for (category, entries) in categories_none_last(&categorized) {
            let subtotal = categorized.totals[category];
            if subtotal.is_zero() {
                continue;
            }
            writeln!(out, "{}:", category.as_deref().unwrap_or(NO_CATEGORY_HEADER)).unwrap();
            for entry in entries.iter().filter(|e| !e.duration.is_zero()) {
                writeln!(
                    out,
                    "  {:<width$}  {:>5}",
                    capitalize(&entry.text),
                    format_duration_short(entry.duration),
                    width = LINE_WIDTH - 9
                )
                .unwrap();
            }
            writeln!(out, "{}", "-".repeat(LINE_WIDTH)).unwrap();
            writeln!(out, "{:>LINE_WIDTH$}", format_duration_short(subtotal)).unwrap();
            writeln!(out).unwrap();
        }
        writeln!(out, "{}{}", total_label(kind), format_duration_short(totals.work)).unwrap();

        let mut ranking: Vec<(String, Duration)> = categorized
            .totals
            .iter()
            .filter(|(_, d)| !d.is_zero())
            .map(|(c, d)| (c.as_deref().unwrap_or(NO_CATEGORY_HEADER).to_string(), *d))
            .collect();
        if !ranking.is_empty() {
            ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let width = ranking.iter().map(|(c, _)| c.len()).max().unwrap_or(0) + 1;
            writeln!(out).unwrap();
            writeln!(out, "Categories by time spent:").unwrap();
            writeln!(out).unwrap();
            for (category, duration) in ranking {
                writeln!(
                    out,
                    "  {:<width$}  {:>5}",
                    format!("{category}:"),
                    format_duration_short(duration)
                )
                .unwrap();
            }
        }

        self.write_tags(out);
    }

    /// Work time per tag. Omitted when no entry carries a tag.
    fn write_tags(&self, out: &mut String) {
        let tags = self.window.set_of_all_tags();
        if tags.is_empty() {
            return;
        }
        let width = tags.iter().map(String::len).max().unwrap_or(0) + 1;
        writeln!(out).unwrap();
        writeln!(out, "Time spent in each area:").unwrap();
        writeln!(out).unwrap();
        for tag in &tags {
            let spent = self.window.totals(Some(tag.as_str()), None);
            writeln!(
                out,
                "  {:<width$}  {}",
                format!("{tag}:"),
                format_duration_long(spent.work)
            )
            .unwrap();
        }
        writeln!(out, "Note that area totals may not add up to the period totals,").unwrap();
        writeln!(out, "as each entry may belong to multiple areas (or none at all).").unwrap();
    }
}

fn total_label(kind: ReportKind) -> String {
    match kind {
        ReportKind::Daily => "Total work done: ".to_string(),
        _ => format!("Total work done this {}: ", kind.period_name()),
    }
}

fn write_long_row(out: &mut String, text: &str, duration: Duration) {
    writeln!(out, "{text:<ENTRY_WIDTH$}  {}", format_duration_long(duration)).unwrap();
}

fn write_category_breakdown(out: &mut String, categorized: &CategorizedEntries) {
    let has_category = categorized
        .totals
        .iter()
        .any(|(c, d)| c.is_some() && !d.is_zero());
    if !has_category {
        return;
    }
    writeln!(out).unwrap();
    writeln!(out, "By category:").unwrap();
    writeln!(out).unwrap();
    for (category, _) in categories_none_last(categorized) {
        let total = categorized.totals[category];
        if total.is_zero() {
            continue;
        }
        write_long_row(out, category.as_deref().unwrap_or(NO_CATEGORY), total);
    }
}

/// Named categories in alphabetical order, then the uncategorized bucket.
fn categories_none_last(
    categorized: &CategorizedEntries,
) -> impl Iterator<Item = (&Option<String>, &Vec<GroupedEntry>)> {
    let named = categorized.entries.iter().filter(|(c, _)| c.is_some());
    let unnamed = categorized.entries.iter().filter(|(c, _)| c.is_none());
    named.chain(unnamed)
}

/// Upper-cases the first character.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// English weekday abbreviation, independent of locale.
const fn weekday_abbr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
