//! Reference list of canonical task names.
//!
//! The task file has one task per line, either bare (`task`) or grouped
//! (`Group: task`). Lines starting with `#` are comments. Bare tasks are
//! collected under a final "Other" group.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::Result;
use crate::source::{Backing, Source};

/// Title of the group collecting bare tasks.
pub const OTHER_GROUP: &str = "Other";

/// A named group of tasks, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub name: String,
    pub tasks: Vec<String>,
}

/// Immutable snapshot of the task ordering.
///
/// Sorting goes through a snapshot so a reload of the task list cannot change
/// the order halfway through a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOrder {
    positions: Arc<HashMap<String, usize>>,
}

impl TaskOrder {
    /// Sort key returned for tasks not in the list.
    pub const UNKNOWN: usize = usize::MAX;

    /// Line index of `task`, or [`Self::UNKNOWN`].
    pub fn position(&self, task: &str) -> usize {
        self.positions.get(task).copied().unwrap_or(Self::UNKNOWN)
    }
}

/// The reference task list.
#[derive(Debug)]
pub struct TaskList {
    backing: Backing,
    groups: Vec<TaskGroup>,
    order: TaskOrder,
    last_mtime: Option<SystemTime>,
}

impl TaskList {
    pub fn open(source: Source) -> Result<Self> {
        let mut list = Self {
            backing: Backing::open(source)?,
            groups: Vec::new(),
            order: TaskOrder::default(),
            last_mtime: None,
        };
        list.reload()?;
        Ok(list)
    }

    /// Reloads the list if the file changed since it was last read.
    pub fn check_reload(&mut self) -> Result<bool> {
        if self.backing.mtime() == self.last_mtime {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// Re-reads the task file.
    pub fn reload(&mut self) -> Result<()> {
        self.last_mtime = self.backing.mtime();
        let text = self.backing.read()?;
        let (groups, positions) = parse_tasks(&text);
        tracing::debug!(groups = groups.len(), tasks = positions.len(), "task list loaded");
        self.groups = groups;
        self.order = TaskOrder {
            positions: Arc::new(positions),
        };
        Ok(())
    }

    /// Groups in first-seen order, "Other" last.
    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    /// Line index of an exact task string, or [`TaskOrder::UNKNOWN`].
    pub fn order(&self, task: &str) -> usize {
        self.order.position(task)
    }

    /// Snapshot of the current ordering.
    pub fn snapshot(&self) -> TaskOrder {
        self.order.clone()
    }
}

fn parse_tasks(text: &str) -> (Vec<TaskGroup>, HashMap<String, usize>) {
    let mut groups: Vec<TaskGroup> = Vec::new();
    let mut other: Vec<String> = Vec::new();
    let mut positions = HashMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let key = if let Some((group, task)) = line.split_once(':') {
            let (group, task) = (group.trim(), task.trim());
            match groups.iter_mut().find(|g| g.name == group) {
                Some(g) => g.tasks.push(task.to_string()),
                None => groups.push(TaskGroup {
                    name: group.to_string(),
                    tasks: vec![task.to_string()],
                }),
            }
            format!("{group}: {task}")
        } else {
            other.push(line.to_string());
            line.to_string()
        };
        positions.entry(key).or_insert(idx);
    }

    if !other.is_empty() {
        groups.push(TaskGroup {
            name: OTHER_GROUP.to_string(),
            tasks: other,
        });
    }
    (groups, positions)
}
