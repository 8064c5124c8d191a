//! `tl add`: append an entry to the log.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tl_core::LogStore;
use tl_core::time::format_timestamp;

use super::util::{ensure_parent_dir, open_log};
use crate::config::Config;

/// Applies any time correction and appends the entry.
///
/// Returns the line as written, without the trailing newline.
pub fn add_entry(store: &mut LogStore, text: &str, now: NaiveDateTime) -> Result<String> {
    let (text, timestamp) = store.parse_correction(text.trim(), now);
    anyhow::ensure!(!text.trim().is_empty(), "Nothing to add: entry text is empty");
    let timestamp = store
        .append(&text, timestamp.unwrap_or(now))
        .context("failed to append entry")?;
    tracing::debug!(%timestamp, %text, "entry added");
    Ok(format!("{}: {text}", format_timestamp(timestamp)))
}

/// Runs the add command.
pub fn run(config: &Config, words: &[String], now: NaiveDateTime) -> Result<()> {
    ensure_parent_dir(&config.log_path)?;
    let mut store = open_log(config)?;
    let line = add_entry(&mut store, &words.join(" "), now)?;
    println!("{line}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tl_core::time::parse_timestamp;
    use tl_core::{Settings, Source};

    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn store(text: &str) -> LogStore {
        LogStore::open(Source::text(text), &Settings::default()).unwrap()
    }

    #[test]
    fn test_add_uses_now() {
        let mut store = store("");
        let line = add_entry(&mut store, "arrived", ts("2016-01-08 09:00")).unwrap();
        assert_eq!(line, "2016-01-08 09:00: arrived");
    }

    #[test]
    fn test_add_applies_correction() {
        let mut store = store("2016-01-08 09:00: arrived\n");
        let line = add_entry(&mut store, "-15 coffee **", ts("2016-01-08 10:00")).unwrap();
        assert_eq!(line, "2016-01-08 09:45: coffee **");
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_text() {
        let mut store = store("");
        assert!(add_entry(&mut store, "   ", ts("2016-01-08 10:00")).is_err());
        assert!(store.items().is_empty());
    }
}
