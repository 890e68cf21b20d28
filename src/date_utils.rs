use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A date-ish value as delivered by the backend: either something already
/// resolved to an instant or raw text in one of the supported formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateValue {
    Instant(DateTime<Utc>),
    Text(String),
}

impl DateValue {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        normalize(Some(self))
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<&str> for DateValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Naive date-time layouts tried after RFC 3339, all read as UTC.
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Resolve a date-ish value to an instant. Absence of a usable date is always
/// `None`, never a panic.
pub fn normalize(input: Option<&DateValue>) -> Option<DateTime<Utc>> {
    match input? {
        DateValue::Instant(instant) => Some(*instant),
        DateValue::Text(text) => normalize_str(text),
    }
}

/// Parse `DD/MM/YYYY[ HH:MM[:SS]]` or an ISO-8601 / RFC 3339 string.
pub fn normalize_str(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains('/') {
        parse_day_first(input)
    } else {
        parse_iso(input)
    }
}

fn parse_day_first(input: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = match input.split_once(' ') {
        Some((date, time)) => (date, Some(time.trim())),
        None => (input, None),
    };

    let mut parts = date_part.split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = match time_part {
        Some(time) if !time.is_empty() => parse_time(time)?,
        _ => NaiveTime::MIN,
    };

    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(input, format).ok())
}

fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(instant.with_timezone(&Utc));
    }

    if let Some(naive) = ISO_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Last representable millisecond (23:59:59.999) of the instant's calendar day.
/// `None` on the last day chrono can represent.
pub fn end_of_day(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let next_day = instant.date_naive().succ_opt()?;
    Utc.from_utc_datetime(&next_day.and_time(NaiveTime::MIN))
        .checked_sub_signed(Duration::milliseconds(1))
}

/// `DD/MM/YYYY`, the format the dashboard displays and exports.
pub fn format_day(instant: DateTime<Utc>) -> String {
    instant.format("%d/%m/%Y").to_string()
}

/// Which record date a date-range filter examines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    #[default]
    Purchase,
    Expiry,
}

impl FromStr for DateField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" | "purchase_date" => Ok(Self::Purchase),
            "expiry" | "expiry_date" => Ok(Self::Expiry),
            _ => Err(()),
        }
    }
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Expiry => "expiry",
        }
    }
}

/// Inclusive instant range; `end` already extended to the end of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Only yields a range when both bounds normalize and the end day can be
    /// extended to its last millisecond.
    pub fn resolve(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = normalize_str(start?)?;
        let end = end_of_day(normalize_str(end?)?)?;
        Some(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
