//! `tl totals`: work and slacking time for a period.

use std::fmt::Write;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tl_core::LogStore;
use tl_core::time::{as_minutes, format_duration_long};

use super::util::{Period, open_log, today};
use crate::cli::TotalsArgs;
use crate::config::Config;

/// Computed totals for a period.
#[derive(Debug, Serialize)]
pub struct TotalsData {
    pub start: String,
    pub end: String,
    pub days: usize,
    pub work_minutes: i64,
    pub slack_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Computes totals for `period`, optionally restricted by tag and text.
pub fn compute(
    store: &LogStore,
    period: Period,
    tag: Option<&str>,
    filter: Option<&str>,
) -> TotalsData {
    let window = period.window(store);
    let totals = window.totals(tag, filter);
    TotalsData {
        start: window.min().date().format("%Y-%m-%d").to_string(),
        end: (window.max() - Duration::days(1))
            .date()
            .format("%Y-%m-%d")
            .to_string(),
        days: window.count_days(),
        work_minutes: as_minutes(totals.work),
        slack_minutes: as_minutes(totals.slack),
        tag: tag.map(String::from),
        filter: filter.map(String::from),
    }
}

/// Formats totals for humans.
pub fn format_totals(data: &TotalsData) -> String {
    let mut output = String::new();
    if data.start == data.end {
        writeln!(output, "Totals for {}", data.start).unwrap();
    } else {
        writeln!(output, "Totals for {} to {}", data.start, data.end).unwrap();
    }
    if let Some(tag) = &data.tag {
        writeln!(output, "Tag:         {tag}").unwrap();
    }
    if let Some(filter) = &data.filter {
        writeln!(output, "Filter:      {filter}").unwrap();
    }
    writeln!(output, "Days:        {}", data.days).unwrap();
    writeln!(
        output,
        "Work:        {}",
        format_duration_long(Duration::minutes(data.work_minutes))
    )
    .unwrap();
    writeln!(
        output,
        "Slacking:    {}",
        format_duration_long(Duration::minutes(data.slack_minutes))
    )
    .unwrap();
    output
}

/// Runs the totals command.
pub fn run(config: &Config, args: &TotalsArgs, now: NaiveDateTime) -> Result<()> {
    let period = Period::resolve(&args.period, today(config, now))?;
    let store = open_log(config)?;
    let data = compute(&store, period, args.tag.as_deref(), args.filter.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print!("{}", format_totals(&data));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use tl_core::{Settings, Source};

    use super::*;

    const LOG: &str = "\
2016-01-04 09:00: arrived
2016-01-04 10:00: Project: hacking -- dev
2016-01-04 10:30: coffee **
2016-01-04 11:00: reading news ***
2016-01-04 12:00: Project: review -- dev
";

    fn store() -> LogStore {
        LogStore::open(Source::text(LOG), &Settings::default()).unwrap()
    }

    fn day() -> Period {
        Period::Day(NaiveDate::from_ymd_opt(2016, 1, 4).unwrap())
    }

    #[test]
    fn test_totals_skip_excluded() {
        let data = compute(&store(), day(), None, None);
        assert_eq!(data.work_minutes, 120);
        assert_eq!(data.slack_minutes, 30);
        assert_eq!(data.days, 1);
    }

    #[test]
    fn test_totals_filters() {
        assert_eq!(compute(&store(), day(), Some("dev"), None).work_minutes, 120);
        assert_eq!(compute(&store(), day(), None, Some("review")).work_minutes, 60);
        assert_eq!(compute(&store(), day(), Some("ops"), None).work_minutes, 0);
    }

    #[test]
    fn test_format_totals() {
        let data = compute(&store(), day(), Some("dev"), None);
        assert_snapshot!(format_totals(&data), @r"
        Totals for 2016-01-04
        Tag:         dev
        Days:        1
        Work:        2 hours
        Slacking:    0 min
        ");
    }

    #[test]
    fn test_json_shape() {
        let data = compute(&store(), day(), None, None);
        let value: serde_json::Value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["start"], "2016-01-04");
        assert_eq!(value["end"], "2016-01-04");
        assert_eq!(value["work_minutes"], 120);
        assert!(value.get("tag").is_none());
    }
}
