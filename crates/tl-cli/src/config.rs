//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::{ReportStyle, Settings};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the activity log.
    pub log_path: PathBuf,
    /// Path to the reference task list.
    pub tasks_path: PathBuf,
    /// Path to the sent-report ledger.
    pub ledger_path: PathBuf,
    /// Time of day at which a new day starts, as `HH:MM`.
    #[serde(with = "hhmm")]
    pub virtual_midnight: NaiveTime,
    /// Default report style.
    pub report_style: ReportStyle,
    /// Name used in report subjects.
    pub name: String,
    /// Host part of iCalendar UIDs. Defaults to the machine's hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let settings = Settings::default();
        Self {
            log_path: data_dir.join("timelog.txt"),
            tasks_path: data_dir.join("tasks.txt"),
            ledger_path: data_dir.join("sentreports.log"),
            virtual_midnight: settings.virtual_midnight,
            report_style: settings.report_style,
            name: settings.name,
            host: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TL_LOG_PATH, TL_VIRTUAL_MIDNIGHT, ...
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    /// Engine settings derived from this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            virtual_midnight: self.virtual_midnight,
            report_style: self.report_style,
            name: self.name.clone(),
        }
    }

    /// Host used in iCalendar UIDs.
    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string())
        })
    }
}

/// Returns the platform-specific config directory for timelog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timelog"))
}

/// Returns the platform-specific data directory for timelog.
///
/// On Linux: `~/.local/share/timelog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("timelog"))
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_timelog() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "timelog");
    }

    #[test]
    fn test_default_config_uses_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("timelog.txt"));
        assert_eq!(config.ledger_path, data_dir.join("sentreports.log"));
        assert_eq!(config.settings(), Settings::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "log_path = \"/tmp/log.txt\"\nvirtual_midnight = \"06:30\"\nreport_style = \"categorized\"\nname = \"Alice\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.as_path())).unwrap();
        assert_eq!(config.log_path, PathBuf::from("/tmp/log.txt"));
        assert_eq!(config.virtual_midnight, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(config.report_style, ReportStyle::Categorized);
        assert_eq!(config.name, "Alice");
    }

    #[test]
    fn test_invalid_virtual_midnight_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "virtual_midnight = \"late\"\n").unwrap();
        assert!(Config::load_from(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_explicit_host_wins() {
        let config = Config {
            host: Some("example.com".to_string()),
            ..Config::default()
        };
        assert_eq!(config.host(), "example.com");
    }
}
