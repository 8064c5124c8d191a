//! The raw activity log.
//!
//! The log is a plain text file with one `YYYY-MM-DD HH:MM: text` line per
//! event. It is meant to be edited by hand, so anything that does not parse is
//! skipped and the surviving items are re-sorted by timestamp.

use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::Result;
use crate::settings::Settings;
use crate::source::{Backing, Source};
use crate::time::{
    different_days, first_of_month, format_timestamp, next_month, parse_timestamp,
    truncate_to_minute, virtual_day, week_start,
};
use crate::window::Window;

/// Leading `HH:MM ` absolute time correction.
static ABSOLUTE_CORRECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})\s+").unwrap());

/// Leading `+N ` / `-N ` minute offset, N in 1..=199.
static RELATIVE_CORRECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-+])([1-9]\d?|1\d\d)\s+").unwrap());

/// Prefix used to comment out a removed line.
const COMMENT_MARKER: &str = "# ";

/// A single `(timestamp, text)` line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub timestamp: NaiveDateTime,
    pub text: String,
}

/// Parses one log line. Returns `None` for anything that is not an entry.
pub fn parse_line(line: &str) -> Option<RawItem> {
    let (time, text) = line.split_once(": ")?;
    let timestamp = parse_timestamp(time)?;
    Some(RawItem {
        timestamp,
        text: text.trim().to_string(),
    })
}

/// Owner of the whole raw log history.
#[derive(Debug)]
pub struct LogStore {
    backing: Backing,
    virtual_midnight: NaiveTime,
    items: Vec<RawItem>,
    last_mtime: Option<SystemTime>,
}

impl LogStore {
    /// Opens the log and reads it.
    pub fn open(source: Source, settings: &Settings) -> Result<Self> {
        let mut store = Self {
            backing: Backing::open(source)?,
            virtual_midnight: settings.virtual_midnight,
            items: Vec::new(),
            last_mtime: None,
        };
        store.reread()?;
        Ok(store)
    }

    /// Re-parses the whole backing file.
    pub fn reread(&mut self) -> Result<()> {
        self.last_mtime = self.backing.mtime();
        let text = self.backing.read()?;
        let mut items: Vec<RawItem> = text.lines().filter_map(parse_line).collect();
        // Hand edits can leave lines out of order; the sort is stable.
        items.sort_by_key(|i| i.timestamp);
        tracing::debug!(items = items.len(), "log reread");
        self.items = items;
        Ok(())
    }

    /// Rereads the log if the file changed since it was last read.
    pub fn check_reload(&mut self) -> Result<bool> {
        if self.backing.mtime() == self.last_mtime {
            return Ok(false);
        }
        self.reread()?;
        Ok(true)
    }

    /// All raw items, sorted by timestamp.
    pub fn items(&self) -> &[RawItem] {
        &self.items
    }

    pub const fn virtual_midnight(&self) -> NaiveTime {
        self.virtual_midnight
    }

    /// Timestamp of the latest item.
    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.items.last().map(|i| i.timestamp)
    }

    /// Appends an entry at `timestamp` (truncated to the minute).
    ///
    /// A blank line is written first when the entry starts a new virtual day.
    pub fn append(&mut self, text: &str, timestamp: NaiveDateTime) -> Result<NaiveDateTime> {
        self.check_reload()?;
        let timestamp = truncate_to_minute(timestamp);
        let need_space = self
            .last_time()
            .is_some_and(|last| different_days(last, timestamp, self.virtual_midnight));

        let mut chunk = String::new();
        if need_space {
            chunk.push('\n');
        }
        chunk.push_str(&format_timestamp(timestamp));
        chunk.push_str(": ");
        chunk.push_str(text);
        chunk.push('\n');
        self.backing.append(&chunk)?;

        // Keep items sorted even when a correction backdates the entry.
        let at = self.items.partition_point(|i| i.timestamp <= timestamp);
        self.items.insert(
            at,
            RawItem {
                timestamp,
                text: text.to_string(),
            },
        );
        self.last_mtime = self.backing.mtime();
        tracing::debug!(%timestamp, need_space, "entry appended");
        Ok(timestamp)
    }

    /// Comments out the last entry of the current virtual day.
    ///
    /// Returns the removed text, or `None` (without touching the file) when
    /// the current virtual day has no entries.
    pub fn remove_last_entry(&mut self, now: NaiveDateTime) -> Result<Option<String>> {
        self.check_reload()?;
        let today = virtual_day(now, self.virtual_midnight);
        if self.window_for_day(today).is_empty() {
            return Ok(None);
        }

        let content = self.backing.read()?;
        let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
        let Some((idx, item)) = lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, line)| parse_line(line.trim_end_matches(['\n', '\r'])).map(|i| (idx, i)))
        else {
            return Ok(None);
        };

        let commented = format!("{COMMENT_MARKER}{}", lines[idx]);
        lines[idx] = &commented;
        self.backing.rewrite(&lines.concat())?;
        self.reread()?;
        tracing::debug!(text = %item.text, "entry removed");
        Ok(Some(item.text))
    }

    /// Recognizes a time correction at the start of `text`.
    ///
    /// `HH:MM text` sets an absolute time on the current virtual day, `-N text`
    /// backdates by N minutes from `now`, and `+N text` places the entry N
    /// minutes after the last entry. Anything else, including corrections that
    /// would land in the future or before the last entry, returns the text
    /// unchanged with no timestamp.
    pub fn parse_correction(&self, text: &str, now: NaiveDateTime) -> (String, Option<NaiveDateTime>) {
        let now = truncate_to_minute(now);

        if let Some(caps) = ABSOLUTE_CORRECTION_RE.captures(text) {
            let time = caps[1]
                .parse()
                .ok()
                .zip(caps[2].parse().ok())
                .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0));
            if let Some(time) = time {
                let mut date = virtual_day(now, self.virtual_midnight);
                if time < self.virtual_midnight {
                    date += Duration::days(1);
                }
                let timestamp = date.and_time(time);
                if self.valid_time(timestamp, now) {
                    return (text[caps[0].len()..].to_string(), Some(timestamp));
                }
            }
            return (text.to_string(), None);
        }

        if let Some(caps) = RELATIVE_CORRECTION_RE.captures(text) {
            let Ok(minutes) = caps[2].parse::<i64>() else {
                return (text.to_string(), None);
            };
            let timestamp = if &caps[1] == "+" {
                match self.last_time() {
                    Some(last) => last + Duration::minutes(minutes),
                    None => return (text.to_string(), None),
                }
            } else {
                now - Duration::minutes(minutes)
            };
            return (text[caps[0].len()..].to_string(), Some(timestamp));
        }

        (text.to_string(), None)
    }

    fn valid_time(&self, timestamp: NaiveDateTime, now: NaiveDateTime) -> bool {
        timestamp <= now && self.last_time().is_none_or(|last| timestamp >= last)
    }

    /// Window over `[min, max)`.
    pub fn window_for(&self, min: NaiveDateTime, max: NaiveDateTime) -> Window {
        Window::new(&self.items, self.virtual_midnight, min, max)
    }

    /// Window over a single virtual day.
    pub fn window_for_day(&self, date: NaiveDate) -> Window {
        let min = date.and_time(self.virtual_midnight);
        self.window_for(min, min + Duration::days(1))
    }

    /// Window over the ISO week (Monday to Sunday) containing `date`.
    pub fn window_for_week(&self, date: NaiveDate) -> Window {
        let min = week_start(date).and_time(self.virtual_midnight);
        self.window_for(min, min + Duration::days(7))
    }

    /// Window over the calendar month containing `date`.
    pub fn window_for_month(&self, date: NaiveDate) -> Window {
        let min = first_of_month(date).and_time(self.virtual_midnight);
        let max = next_month(date).and_time(self.virtual_midnight);
        self.window_for(min, max)
    }

    /// Window over the inclusive virtual-day range `first..=last`.
    pub fn window_for_date_range(&self, first: NaiveDate, last: NaiveDate) -> Window {
        let min = first.and_time(self.virtual_midnight);
        let max = last.and_time(self.virtual_midnight) + Duration::days(1);
        self.window_for(min, max)
    }

    /// Window spanning every item in the log.
    pub fn whole_history(&self) -> Window {
        match (self.items.first(), self.items.last()) {
            (Some(first), Some(last)) => {
                self.window_for(first.timestamp, last.timestamp + Duration::minutes(1))
            }
            _ => {
                let epoch = NaiveDateTime::MIN;
                self.window_for(epoch, epoch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "\
2010-01-30 09:00: start
2010-01-30 09:23: Bing: stuff
2010-01-30 12:54: Bong: other stuff
2010-01-30 13:32: lunch **
2010-01-30 15:46: misc
";

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn open_text(text: &str) -> LogStore {
        LogStore::open(Source::text(text), &Settings::default()).unwrap()
    }

    #[test]
    fn test_parse_line() {
        let item = parse_line("2010-01-30 09:23: Bing: stuff  ").unwrap();
        assert_eq!(item.timestamp, ts("2010-01-30 09:23"));
        assert_eq!(item.text, "Bing: stuff");
        assert!(parse_line("no separator here").is_none());
        assert!(parse_line("yesterday: did things").is_none());
        assert!(parse_line("# 2010-01-30 09:23: commented").is_none());
    }

    #[test]
    fn test_reread_skips_malformed_lines() {
        let store = open_text("garbage\n\n2010-01-30 09:00: start\nnot a date: x\n");
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn test_reread_sorts_stably() {
        let store = open_text(
            "2010-01-30 10:00: b\n2010-01-30 09:00: a\n2010-01-30 10:00: c\n2010-01-30 09:30: d\n",
        );
        let texts: Vec<_> = store.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            LogStore::open(Source::path(dir.path().join("timelog.txt")), &Settings::default())
                .unwrap();
        assert!(store.items().is_empty());
        assert!(store.last_time().is_none());
    }

    #[test]
    fn test_append_writes_blank_line_between_days() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelog.txt");
        let mut store = LogStore::open(Source::path(&path), &Settings::default()).unwrap();

        store.append("arrived", ts("2010-01-30 09:00")).unwrap();
        store.append("work", ts("2010-01-31 01:00")).unwrap();
        store.append("arrived", ts("2010-01-31 09:00")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2010-01-30 09:00: arrived\n2010-01-31 01:00: work\n\n2010-01-31 09:00: arrived\n"
        );
        assert_eq!(store.items().len(), 3);
    }

    #[test]
    fn test_append_truncates_to_minute() {
        let mut store = open_text("");
        let at = ts("2010-01-30 09:00") + Duration::seconds(42);
        assert_eq!(store.append("x", at).unwrap(), ts("2010-01-30 09:00"));
    }

    #[test]
    fn test_check_reload_detects_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelog.txt");
        fs::write(&path, SAMPLE).unwrap();
        let mut store = LogStore::open(Source::path(&path), &Settings::default()).unwrap();
        assert!(!store.check_reload().unwrap());

        fs::write(&path, "2010-01-30 09:00: start\n").unwrap();
        let file = fs::File::options().append(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH).unwrap();
        assert!(store.check_reload().unwrap());
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn test_append_sees_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelog.txt");
        fs::write(&path, "2010-01-30 09:00: arrived\n").unwrap();
        let mut store = LogStore::open(Source::path(&path), &Settings::default()).unwrap();

        let mut file = fs::File::options().append(true).open(&path).unwrap();
        file.write_all(b"2010-01-31 09:00: next day\n").unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH).unwrap();
        drop(file);

        store.append("work", ts("2010-01-31 10:00")).unwrap();

        let texts: Vec<_> = store.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["arrived", "next day", "work"]);
        // Same virtual day as the externally added entry: no separator.
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2010-01-30 09:00: arrived\n2010-01-31 09:00: next day\n2010-01-31 10:00: work\n"
        );
    }

    #[test]
    fn test_remove_last_entry_comments_out_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelog.txt");
        fs::write(&path, format!("{SAMPLE}# a real comment\n\n")).unwrap();
        let mut store = LogStore::open(Source::path(&path), &Settings::default()).unwrap();

        let removed = store.remove_last_entry(ts("2010-01-30 16:00")).unwrap();
        assert_eq!(removed.as_deref(), Some("misc"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# 2010-01-30 15:46: misc\n"));
        assert!(content.contains("\n# a real comment\n"));
        assert_eq!(store.last_time(), Some(ts("2010-01-30 13:32")));
    }

    #[test]
    fn test_remove_last_entry_without_entries_today_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelog.txt");
        fs::write(&path, SAMPLE).unwrap();
        let before = fs::read(&path).unwrap();
        let mut store = LogStore::open(Source::path(&path), &Settings::default()).unwrap();

        let removed = store.remove_last_entry(ts("2010-02-02 10:00")).unwrap();
        assert!(removed.is_none());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_absolute_correction() {
        let store = open_text(SAMPLE);
        let now = ts("2010-01-30 17:00");
        let (text, at) = store.parse_correction("16:30 meeting", now);
        assert_eq!(text, "meeting");
        assert_eq!(at, Some(ts("2010-01-30 16:30")));
    }

    #[test]
    fn test_absolute_correction_rejected_in_future_or_past() {
        let store = open_text(SAMPLE);
        let now = ts("2010-01-30 17:00");
        assert_eq!(
            store.parse_correction("17:30 later", now),
            ("17:30 later".to_string(), None)
        );
        assert_eq!(
            store.parse_correction("15:00 earlier", now),
            ("15:00 earlier".to_string(), None)
        );
        assert_eq!(
            store.parse_correction("25:00 bogus", now),
            ("25:00 bogus".to_string(), None)
        );
    }

    #[test]
    fn test_absolute_correction_after_midnight() {
        let store = open_text(SAMPLE);
        let now = ts("2010-01-31 01:30");
        let (text, at) = store.parse_correction("00:15 late fix", now);
        assert_eq!(text, "late fix");
        assert_eq!(at, Some(ts("2010-01-31 00:15")));
    }

    #[test]
    fn test_relative_corrections() {
        let store = open_text(SAMPLE);
        let now = ts("2010-01-30 17:00");
        assert_eq!(
            store.parse_correction("-10 coffee **", now),
            ("coffee **".to_string(), Some(ts("2010-01-30 16:50")))
        );
        assert_eq!(
            store.parse_correction("+20 call", now),
            ("call".to_string(), Some(ts("2010-01-30 16:06")))
        );
    }

    #[test]
    fn test_relative_correction_bounds() {
        let store = open_text(SAMPLE);
        let now = ts("2010-01-30 17:00");
        assert_eq!(store.parse_correction("-0 x", now).1, None);
        assert_eq!(store.parse_correction("-200 x", now).1, None);
        assert_eq!(
            store.parse_correction("-199 x", now).1,
            Some(now - Duration::minutes(199))
        );
        assert_eq!(store.parse_correction("-5x", now).1, None);
    }

    #[test]
    fn test_positive_offset_needs_last_entry() {
        let store = open_text("");
        let (text, at) = store.parse_correction("+5 x", ts("2010-01-30 17:00"));
        assert_eq!(text, "+5 x");
        assert!(at.is_none());
    }

    #[test]
    fn test_plain_text_is_not_a_correction() {
        let store = open_text(SAMPLE);
        let (text, at) = store.parse_correction("Bing: more stuff", ts("2010-01-30 17:00"));
        assert_eq!(text, "Bing: more stuff");
        assert!(at.is_none());
    }

    #[test]
    fn test_window_factories() {
        let store = open_text(
            "2010-01-24 10:00: sun\n2010-01-25 10:00: mon\n2010-01-31 23:00: sun\n\
             2010-02-01 01:00: still sun\n2010-02-01 10:00: feb\n",
        );
        assert_eq!(store.window_for_day(date("2010-01-31")).len(), 2);
        assert_eq!(store.window_for_week(date("2010-01-27")).len(), 3);
        assert_eq!(store.window_for_month(date("2010-01-15")).len(), 4);
        assert_eq!(
            store
                .window_for_date_range(date("2010-01-25"), date("2010-01-31"))
                .len(),
            3
        );
        assert_eq!(store.whole_history().len(), 5);
    }

    #[test]
    fn test_window_does_not_observe_later_appends() {
        let mut store = open_text(SAMPLE);
        let window = store.window_for_day(date("2010-01-30"));
        store.append("more", ts("2010-01-30 16:00")).unwrap();
        assert_eq!(window.len(), 5);
        assert_eq!(store.window_for_day(date("2010-01-30")).len(), 6);
    }
}
