//! Ledger of sent reports.
//!
//! Every send appends one `timestamp,kind,report_id,recipient` row. The file
//! is never rewritten.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::{Result, StoreError};
use crate::report::ReportKind;
use crate::source::{Backing, Source};

/// Period identifier of a report: `YYYY-MM-DD`, `<iso_year>/<iso_week>` or
/// `YYYY-MM`. Custom ranges have none.
pub fn report_id(kind: ReportKind, date: NaiveDate) -> Option<String> {
    match kind {
        ReportKind::Daily => Some(date.format("%Y-%m-%d").to_string()),
        ReportKind::Weekly => {
            let week = date.iso_week();
            Some(format!("{}/{}", week.year(), week.week()))
        }
        ReportKind::Monthly => Some(date.format("%Y-%m").to_string()),
        ReportKind::CustomRange => None,
    }
}

type RecordKey = (String, String);

/// The sent-report ledger.
#[derive(Debug)]
pub struct ReportRecord {
    backing: Backing,
    records: HashMap<RecordKey, Vec<String>>,
    loaded: bool,
    last_mtime: Option<SystemTime>,
}

impl ReportRecord {
    /// Opens the ledger. Nothing is read until recipients are requested.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            backing: Backing::open(Source::Path(path.into()))?,
            records: HashMap::new(),
            loaded: false,
            last_mtime: None,
        })
    }

    /// Re-reads every row.
    pub fn load(&mut self) -> Result<()> {
        self.last_mtime = self.backing.mtime();
        let text = self.backing.read()?;
        self.records.clear();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        for result in reader.records() {
            let record = match result {
                Ok(record) if record.len() == 4 => record,
                Ok(record) => {
                    let line = record.position().map(csv::Position::line);
                    tracing::debug!(?line, fields = record.len(), "skipping malformed ledger row");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed ledger row");
                    continue;
                }
            };
            self.records
                .entry((record[1].to_string(), record[2].to_string()))
                .or_default()
                .push(record[3].to_string());
        }
        self.loaded = true;
        Ok(())
    }

    fn reload_if_changed(&mut self) -> Result<()> {
        if !self.loaded || self.backing.mtime() != self.last_mtime {
            self.load()?;
        }
        Ok(())
    }

    /// Recipients the report for `date` was sent to, oldest first.
    pub fn get_recipients(&mut self, kind: ReportKind, date: NaiveDate) -> Result<Vec<String>> {
        self.reload_if_changed()?;
        let Some(id) = report_id(kind, date) else {
            return Ok(Vec::new());
        };
        Ok(self
            .records
            .get(&(kind.as_str().to_string(), id))
            .cloned()
            .unwrap_or_default())
    }

    /// Records a send. Returns false for kinds without a period id.
    pub fn record(
        &mut self,
        kind: ReportKind,
        date: NaiveDate,
        recipient: &str,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let Some(id) = report_id(kind, date) else {
            return Ok(false);
        };
        let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let row = encode_row(&[timestamp.as_str(), kind.as_str(), id.as_str(), recipient])?;
        self.backing.append(&row)?;

        // Two sends within one mtime tick would not trigger a reload, so
        // update the index in place.
        if self.loaded {
            self.records
                .entry((kind.as_str().to_string(), id))
                .or_default()
                .push(recipient.to_string());
            self.last_mtime = self.backing.mtime();
        }
        Ok(true)
    }
}

/// One CSV row with its line terminator.
fn encode_row(fields: &[&str]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
