//! `tl undo`: comment out today's last entry.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use super::util::open_log;
use crate::config::Config;

/// Runs the undo command.
pub fn run(config: &Config, now: NaiveDateTime) -> Result<()> {
    let mut store = open_log(config)?;
    match store
        .remove_last_entry(now)
        .context("failed to remove last entry")?
    {
        Some(text) => println!("Removed: {text}"),
        None => println!("Nothing to undo today."),
    }
    Ok(())
}
