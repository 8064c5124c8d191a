//! Whole-window exports: iCalendar events and two CSV summaries.

use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sha2::{Digest, Sha256};

use crate::grouping::EntryOrder;
use crate::time::{as_hours, as_minutes};
use crate::window::{Entry, Window};

const ICAL_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

fn ical_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
}

/// Content hash of an entry. Stable across runs for the same log line.
fn entry_uid(entry: &Entry, host: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.start.format(ICAL_TIME_FORMAT).to_string());
    hasher.update(entry.stop.format(ICAL_TIME_FORMAT).to_string());
    hasher.update(entry.text.as_bytes());
    let digest = hasher.finalize();
    format!("{}@{host}", hex::encode(&digest[..16]))
}

/// Writes every derived entry as a `VEVENT`.
pub fn write_icalendar(
    window: &Window,
    out: &mut impl Write,
    host: &str,
    dtstamp: DateTime<Utc>,
) -> io::Result<()> {
    let stamp = dtstamp.format("%Y%m%dT%H%M%SZ");
    write!(out, "BEGIN:VCALENDAR\r\n")?;
    write!(out, "PRODID:-//timelog//EN\r\n")?;
    write!(out, "VERSION:2.0\r\n")?;
    for entry in window.all_entries() {
        write!(out, "BEGIN:VEVENT\r\n")?;
        write!(out, "UID:{}\r\n", entry_uid(&entry, host))?;
        write!(out, "SUMMARY:{}\r\n", ical_escape(&entry.text))?;
        write!(out, "DTSTART:{}\r\n", entry.start.format(ICAL_TIME_FORMAT))?;
        write!(out, "DTEND:{}\r\n", entry.stop.format(ICAL_TIME_FORMAT))?;
        write!(out, "DTSTAMP:{stamp}\r\n")?;
        write!(out, "END:VEVENT\r\n")?;
    }
    write!(out, "END:VCALENDAR\r\n")
}

/// Writes merged work entries with their minutes, sorted by text.
pub fn write_csv_complete(window: &Window, out: &mut impl Write) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["task", "time (minutes)"])?;
    let grouped = window.grouped_entries(true, &EntryOrder::Name);
    for entry in grouped.work.iter().filter(|e| e.duration > Duration::zero()) {
        let minutes = as_minutes(entry.duration).to_string();
        writer.write_record([entry.text.as_str(), minutes.as_str()])?;
    }
    writer.flush()
}

#[derive(Debug, Default)]
struct DaySummary {
    day_start: Duration,
    slack: Duration,
    work: Duration,
}

/// Writes one row per calendar day: arrival time, slacking and work hours.
///
/// Days without entries between the first and last day get a zero row.
pub fn write_csv_daily(window: &Window, out: &mut impl Write) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["date", "day-start (hours)", "slacking (hours)", "work (hours)"])?;

    let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for entry in window.all_entries() {
        let date = entry.start.date();
        let day = days.entry(date).or_insert_with(|| DaySummary {
            day_start: entry.start - date.and_time(NaiveTime::MIN),
            ..DaySummary::default()
        });
        if entry.is_excluded() {
            continue;
        }
        if entry.is_slack() {
            day.slack += entry.duration;
        } else {
            day.work += entry.duration;
        }
    }

    let (Some(&first), Some(&last)) = (days.keys().next(), days.keys().next_back()) else {
        return writer.flush();
    };
    let empty = DaySummary::default();
    for date in first.iter_days().take_while(|d| *d <= last) {
        let day = days.get(&date).unwrap_or(&empty);
        writer.write_record([
            date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", as_hours(day.day_start)),
            format!("{:.2}", as_hours(day.slack)),
            format!("{:.2}", as_hours(day.work)),
        ])?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::RawItem;
    use crate::time::parse_timestamp;

    fn window(lines: &[(&str, &str)]) -> Window {
        let items: Vec<_> = lines
            .iter()
            .map(|(t, text)| RawItem {
                timestamp: parse_timestamp(t).unwrap(),
                text: (*text).to_string(),
            })
            .collect();
        Window::new(
            &items,
            NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
            parse_timestamp("2000-01-01 00:00").unwrap(),
            parse_timestamp("2100-01-01 00:00").unwrap(),
        )
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> Window {
        window(&[
            ("2014-05-27 10:03", "arrived"),
            ("2014-05-27 10:13", "Edx: introduce topic to new sysadmins"),
            ("2014-05-27 10:30", "email"),
            ("2014-05-27 12:11", "meeting; planning, review"),
            ("2014-05-27 13:14", "lunch **"),
            ("2014-05-27 15:46", "email"),
            ("2014-05-29 09:00", "arrived"),
            ("2014-05-29 09:30", "email"),
        ])
    }

    #[test]
    fn test_icalendar_events() {
        let stamp = Utc.with_ymd_and_hms(2014, 6, 1, 12, 0, 0).unwrap();
        let text = render(|buf| write_icalendar(&sample(), buf, "example.com", stamp));
        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(text.matches("BEGIN:VEVENT").count(), 8);
        assert!(text.contains("SUMMARY:meeting\\; planning\\, review\r\n"));
        assert!(text.contains("DTSTART:20140527T103000\r\nDTEND:20140527T121100\r\n"));
        assert!(text.contains("DTSTAMP:20140601T120000Z\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_icalendar_uids_are_stable() {
        let stamp = Utc.with_ymd_and_hms(2014, 6, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let uids = |text: &str| -> Vec<String> {
            text.lines()
                .filter(|l| l.starts_with("UID:"))
                .map(str::to_string)
                .collect()
        };
        let first = uids(&render(|buf| write_icalendar(&sample(), buf, "host", stamp)));
        let second = uids(&render(|buf| write_icalendar(&sample(), buf, "host", later)));
        assert_eq!(first, second);
        assert!(first[0].ends_with("@host"));
        // 16 hash bytes as hex, then the host
        assert_eq!(first[0].len(), "UID:".len() + 32 + "@host".len());
        // the two "email" entries differ in time
        assert_ne!(first[2], first[5]);
    }

    #[test]
    fn test_ical_escape() {
        assert_eq!(ical_escape(r"a\b;c,d"), r"a\\b\;c\,d");
    }

    #[test]
    fn test_csv_complete() {
        let text = render(|buf| write_csv_complete(&sample(), buf));
        assert_eq!(
            text,
            "task,time (minutes)\n\
             Edx: introduce topic to new sysadmins,10\n\
             email,199\n\
             \"meeting; planning, review\",101\n"
        );
    }

    #[test]
    fn test_csv_daily_fills_gaps() {
        let text = render(|buf| write_csv_daily(&sample(), buf));
        assert_eq!(
            text,
            "date,day-start (hours),slacking (hours),work (hours)\n\
             2014-05-27,10.05,1.05,4.67\n\
             2014-05-28,0.00,0.00,0.00\n\
             2014-05-29,9.00,0.00,0.50\n"
        );
    }

    #[test]
    fn test_empty_exports() {
        let empty = window(&[]);
        assert_eq!(
            render(|buf| write_csv_daily(&empty, buf)),
            "date,day-start (hours),slacking (hours),work (hours)\n"
        );
        assert_eq!(render(|buf| write_csv_complete(&empty, buf)), "task,time (minutes)\n");
    }
}
