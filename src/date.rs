use crate::errors::EngineError;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date key (`YYYY-MM-DD`) built from local calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar date of `instant` as seen on the local wall clock.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Local).date_naive())
    }

    /// Accepts a bare `YYYY-MM-DD` key or an RFC 3339 timestamp; timestamps are
    /// converted to the local calendar date rather than truncated in UTC.
    pub fn parse_lenient(input: &str) -> Result<Self, EngineError> {
        let trimmed = input.trim();
        if let Ok(date) = trimmed.parse::<Self>() {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|instant| Self::from_instant(&instant))
            .map_err(|_| EngineError::InvalidDate(input.to_string()))
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn month_start(&self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn in_month(&self, year: i32, month: u32) -> bool {
        self.0.year() == year && self.0.month() == month
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CanonicalDate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| EngineError::InvalidDate(s.to_string()))
    }
}

impl TryFrom<String> for CanonicalDate {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalDate> for String {
    fn from(value: CanonicalDate) -> Self {
        value.to_string()
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

/// Parses a comma-separated list of date keys, ignoring blanks.
pub fn parse_date_list(raw: &str) -> Result<Vec<CanonicalDate>, EngineError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
