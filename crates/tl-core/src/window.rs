//! Bounded views over the raw log and the entries derived from them.
//!
//! # Derivation
//!
//! Each raw item closes an entry that started at the previous item. The first
//! item of a window, and the first item after a virtual-midnight crossing,
//! produce a zero-length "arrival" entry instead.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::store::RawItem;
use crate::time::{different_days, virtual_day};

/// Separator between entry text and its tags.
const TAG_SEPARATOR: &str = " -- ";

/// Marker for entries that do not count as work.
pub const SLACK_MARKER: &str = "**";

/// Marker for entries dropped from every aggregate.
pub const EXCLUDED_MARKER: &str = "***";

/// An activity derived from two consecutive raw items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub duration: Duration,
    pub tags: BTreeSet<String>,
    pub text: String,
}

impl Entry {
    /// Returns true if the entry is excluded from aggregates (`***`).
    pub fn is_excluded(&self) -> bool {
        self.text.contains(EXCLUDED_MARKER)
    }

    /// Returns true if the entry is slacking (`**`).
    pub fn is_slack(&self) -> bool {
        self.text.contains(SLACK_MARKER)
    }
}

/// Splits a `" -- tag1 tag2"` suffix off entry text.
///
/// `**` and `***` among the tags are markers, so they are moved back onto the
/// text.
pub fn split_tags(text: &str) -> (String, BTreeSet<String>) {
    let Some((head, tail)) = text.split_once(TAG_SEPARATOR) else {
        return (text.to_string(), BTreeSet::new());
    };
    let mut entry = head.to_string();
    let mut tags: BTreeSet<String> = tail.split_whitespace().map(String::from).collect();
    for marker in [EXCLUDED_MARKER, SLACK_MARKER] {
        if tags.remove(marker) {
            entry.push(' ');
            entry.push_str(marker);
        }
    }
    (entry, tags)
}

fn derive_entry(prev: Option<NaiveDateTime>, item: &RawItem, virtual_midnight: NaiveTime) -> Entry {
    let stop = item.timestamp;
    let start = match prev {
        Some(prev) if !different_days(prev, stop, virtual_midnight) => prev,
        _ => stop,
    };
    let (text, tags) = split_tags(&item.text);
    Entry {
        start,
        stop,
        duration: stop - start,
        tags,
        text,
    }
}

/// A snapshot of the log restricted to `[min, max)`.
///
/// The window owns a copy of its items, so later changes to the store are not
/// observed.
#[derive(Debug, Clone)]
pub struct Window {
    items: Vec<RawItem>,
    min: NaiveDateTime,
    max: NaiveDateTime,
    virtual_midnight: NaiveTime,
}

impl Window {
    /// Builds a window over `items`, which must be sorted by timestamp.
    pub fn new(
        items: &[RawItem],
        virtual_midnight: NaiveTime,
        min: NaiveDateTime,
        max: NaiveDateTime,
    ) -> Self {
        let lo = items.partition_point(|i| i.timestamp < min);
        let hi = items.partition_point(|i| i.timestamp < max).max(lo);
        Self {
            items: items[lo..hi].to_vec(),
            min,
            max,
            virtual_midnight,
        }
    }

    pub const fn min(&self) -> NaiveDateTime {
        self.min
    }

    pub const fn max(&self) -> NaiveDateTime {
        self.max
    }

    pub const fn virtual_midnight(&self) -> NaiveTime {
        self.virtual_midnight
    }

    /// Raw items retained by the window.
    pub fn items(&self) -> &[RawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over derived entries. Call again to restart.
    pub fn all_entries(&self) -> Entries<'_> {
        Entries {
            items: self.items.iter(),
            prev: None,
            virtual_midnight: self.virtual_midnight,
        }
    }

    /// Timestamp of the last item.
    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.items.last().map(|i| i.timestamp)
    }

    /// The last derived entry; equal to `all_entries().last()`.
    pub fn last_entry(&self) -> Option<Entry> {
        let (last, rest) = self.items.split_last()?;
        let prev = rest.last().map(|i| i.timestamp);
        Some(derive_entry(prev, last, self.virtual_midnight))
    }

    /// Number of distinct virtual days with at least one item.
    pub fn count_days(&self) -> usize {
        self.items
            .iter()
            .map(|i| virtual_day(i.timestamp, self.virtual_midnight))
            .collect::<HashSet<_>>()
            .len()
    }

    /// All tags used by entries in the window, sorted.
    pub fn set_of_all_tags(&self) -> BTreeSet<String> {
        self.all_entries().flat_map(|e| e.tags).collect()
    }
}

/// Lazy iterator over a window's derived entries.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    items: std::slice::Iter<'a, RawItem>,
    prev: Option<NaiveDateTime>,
    virtual_midnight: NaiveTime,
}

impl Iterator for Entries<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        let item = self.items.next()?;
        let entry = derive_entry(self.prev, item, self.virtual_midnight);
        self.prev = Some(item.timestamp);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}
