//! `tl tasks`: list the reference task groups.

use std::fmt::Write;

use anyhow::{Context, Result};
use tl_core::{Source, TaskGroup, TaskList};

use crate::config::Config;

/// Formats task groups, one indented task per line.
pub fn format_groups(groups: &[TaskGroup]) -> String {
    let mut output = String::new();
    if groups.is_empty() {
        writeln!(output, "No tasks defined.").unwrap();
        return output;
    }
    for group in groups {
        writeln!(output, "{}:", group.name).unwrap();
        for task in &group.tasks {
            writeln!(output, "  {task}").unwrap();
        }
    }
    output
}

/// Runs the tasks command.
pub fn run(config: &Config) -> Result<()> {
    let tasks = TaskList::open(Source::path(&config.tasks_path))
        .with_context(|| format!("failed to read task list {}", config.tasks_path.display()))?;
    print!("{}", format_groups(tasks.groups()));
    Ok(())
}
