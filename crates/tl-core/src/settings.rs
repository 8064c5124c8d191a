//! Engine settings.

use chrono::NaiveTime;

use crate::report::ReportStyle;

/// Settings shared by the log engine components.
///
/// Built once (usually from the CLI configuration) and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Time of day at which a new virtual day starts.
    pub virtual_midnight: NaiveTime,
    /// Report style used when the caller does not pick one.
    pub report_style: ReportStyle,
    /// Name used in report subjects.
    pub name: String,
}

impl Settings {
    /// Default virtual midnight (02:00).
    pub const DEFAULT_VIRTUAL_MIDNIGHT: NaiveTime = match NaiveTime::from_hms_opt(2, 0, 0) {
        Some(t) => t,
        None => NaiveTime::MIN,
    };
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            virtual_midnight: Self::DEFAULT_VIRTUAL_MIDNIGHT,
            report_style: ReportStyle::Plain,
            name: "me".to_string(),
        }
    }
}
