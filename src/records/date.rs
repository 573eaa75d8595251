//! Date keys and storage partitions.
//!
//! Records are keyed by an ISO `YYYY-MM-DD` string. Storage backends place
//! each record in a partition derived from that key: one file per month
//! (`2024/03.json`) or, with the day layout, one file per day
//! (`2024/03/15.json`).

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format of every record date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    // chrono accepts unpadded fields; the key must stay zero-padded
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Today's date in local time, formatted as a record key.
pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Parse a four-digit year path segment.
pub fn parse_year(value: &str) -> Option<i32> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parse a month path segment, padded (`03`) or not (`3`).
pub fn parse_month(value: &str) -> Option<u32> {
    if value.is_empty() || value.len() > 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().filter(|m| (1..=12).contains(m))
}

/// How records are split into files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionLayout {
    /// `YYYY/MM.json`
    #[default]
    Month,
    /// `YYYY/MM/DD.json`
    Day,
}

/// A storage partition (one JSON file) holding a subset of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

impl Partition {
    /// Derive the partition for a record date. `None` if the date is invalid.
    pub fn of(date: &str, layout: PartitionLayout) -> Option<Self> {
        let parsed = parse_date(date)?;
        Some(Self {
            year: parsed.year(),
            month: parsed.month(),
            day: match layout {
                PartitionLayout::Month => None,
                PartitionLayout::Day => Some(parsed.day()),
            },
        })
    }

    /// Path of the partition file relative to the storage root.
    pub fn relative_path(&self) -> String {
        match self.day {
            Some(day) => format!("{:04}/{:02}/{:02}.json", self.year, self.month, day),
            None => format!("{:04}/{:02}.json", self.year, self.month),
        }
    }

    /// Whether a record with this date belongs to the partition.
    pub fn contains(&self, date: &str) -> bool {
        let Some(parsed) = parse_date(date) else {
            return false;
        };
        parsed.year() == self.year
            && parsed.month() == self.month
            && self.day.map_or(true, |d| parsed.day() == d)
    }
}

/// Whether `date` falls in the given year and month.
pub fn in_month(date: &str, year: i32, month: u32) -> bool {
    parse_date(date).is_some_and(|d| d.year() == year && d.month() == month)
}
