//! Aggregation over a window's derived entries.
//!
//! Entries with identical text are merged, split into work and slacking
//! buckets, and optionally split again by their `Category: ` prefix.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};

use crate::error::ValidationError;
use crate::tasks::TaskOrder;
use crate::window::Window;

/// Ordering of grouped entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Earliest first.
    #[default]
    Start,
    /// Alphabetical by text.
    Name,
    /// Longest first.
    Duration,
    /// By position in the task list; unknown tasks last, by name.
    TaskList(TaskOrder),
}

impl EntryOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Name => "name",
            Self::Duration => "duration",
            Self::TaskList(_) => "task-list",
        }
    }

    fn sort(&self, entries: &mut [GroupedEntry]) {
        match self {
            Self::Start => entries.sort_by(|a, b| (a.start, &a.text).cmp(&(b.start, &b.text))),
            Self::Name => entries.sort_by(|a, b| a.text.cmp(&b.text)),
            Self::Duration => {
                entries.sort_by(|a, b| (Reverse(a.duration), &a.text).cmp(&(Reverse(b.duration), &b.text)));
            }
            Self::TaskList(order) => entries.sort_by(|a, b| {
                (order.position(&a.text), &a.text).cmp(&(order.position(&b.text), &b.text))
            }),
        }
    }
}

impl fmt::Display for EntryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryOrder {
    type Err = ValidationError;

    /// Parses every order except `task-list`, which needs a [`TaskOrder`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "name" => Ok(Self::Name),
            "duration" => Ok(Self::Duration),
            _ => Err(ValidationError::UnknownEntryOrder {
                value: s.to_string(),
            }),
        }
    }
}

/// Entries sharing the same text, merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    /// Start of the earliest occurrence.
    pub start: NaiveDateTime,
    pub text: String,
    /// Sum of all occurrences.
    pub duration: Duration,
}

/// Merged entries split into work and slacking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedEntries {
    pub work: Vec<GroupedEntry>,
    pub slack: Vec<GroupedEntry>,
}

/// Work entries split by category. `None` collects uncategorized entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedEntries {
    pub entries: BTreeMap<Option<String>, Vec<GroupedEntry>>,
    pub totals: BTreeMap<Option<String>, Duration>,
}

/// Work and slacking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub work: Duration,
    pub slack: Duration,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            work: Duration::zero(),
            slack: Duration::zero(),
        }
    }
}

/// Splits `Category: task` into its parts.
///
/// Text ending in a bare `:` is all category. Returns `None` as the category
/// when there is no prefix.
pub fn split_category(text: &str) -> (Option<&str>, &str) {
    if let Some((category, task)) = text.split_once(": ") {
        (Some(category), task)
    } else if let Some(category) = text.strip_suffix(':') {
        (Some(category), "")
    } else {
        (None, text)
    }
}

/// Accumulates merged entries, remembering first-seen order.
#[derive(Default)]
struct Bucket {
    entries: Vec<GroupedEntry>,
    index: HashMap<String, usize>,
}

impl Bucket {
    fn add(&mut self, start: NaiveDateTime, text: String, duration: Duration) {
        if let Some(&idx) = self.index.get(&text) {
            let existing = &mut self.entries[idx];
            existing.start = existing.start.min(start);
            existing.duration += duration;
        } else {
            self.index.insert(text.clone(), self.entries.len());
            self.entries.push(GroupedEntry {
                start,
                text,
                duration,
            });
        }
    }

    fn into_sorted(self, order: &EntryOrder) -> Vec<GroupedEntry> {
        let mut entries = self.entries;
        order.sort(&mut entries);
        entries
    }
}

impl Window {
    /// Merges entries with identical text into work and slacking lists.
    ///
    /// With `skip_first`, the window's first (arrival) entry is dropped.
    /// Entries marked `***` are excluded.
    pub fn grouped_entries(&self, skip_first: bool, order: &EntryOrder) -> GroupedEntries {
        let mut work = Bucket::default();
        let mut slack = Bucket::default();
        for entry in self.all_entries().skip(usize::from(skip_first)) {
            if entry.is_excluded() {
                continue;
            }
            let bucket = if entry.is_slack() { &mut slack } else { &mut work };
            bucket.add(entry.start, entry.text, entry.duration);
        }
        GroupedEntries {
            work: work.into_sorted(order),
            slack: slack.into_sorted(order),
        }
    }

    /// Splits merged work entries by category.
    ///
    /// Within each category entries keep the requested order; their text has
    /// the category prefix removed.
    pub fn categorized_work_entries(&self, order: &EntryOrder) -> CategorizedEntries {
        let mut result = CategorizedEntries::default();
        for entry in self.grouped_entries(true, order).work {
            let (category, task) = split_category(&entry.text);
            let key = category.map(String::from);
            *result
                .totals
                .entry(key.clone())
                .or_insert_with(Duration::zero) += entry.duration;
            result.entries.entry(key).or_default().push(GroupedEntry {
                start: entry.start,
                text: task.to_string(),
                duration: entry.duration,
            });
        }
        result
    }

    /// Total work and slacking time.
    ///
    /// Restricted to entries tagged `tag` and/or containing `filter_text`
    /// when given. Entries marked `***` never count.
    pub fn totals(&self, tag: Option<&str>, filter_text: Option<&str>) -> Totals {
        let mut totals = Totals::default();
        for entry in self.all_entries() {
            if tag.is_some_and(|t| !entry.tags.contains(t)) {
                continue;
            }
            if filter_text.is_some_and(|f| !entry.text.contains(f)) {
                continue;
            }
            if entry.is_excluded() {
                continue;
            }
            if entry.is_slack() {
                totals.slack += entry.duration;
            } else {
                totals.work += entry.duration;
            }
        }
        totals
    }
}
