//! Date normalization: spreadsheet cells to UTC instants.
//!
//! A [`DateNormalizer`] holds an ordered list of [`ParseStrategy`] values and
//! returns the result of the first one that accepts the cell:
//!
//! 1. spreadsheet serial numbers (days since 1899-12-30),
//! 2. date-only formats (`8/22/2025`, `2025-08-22`, `Aug 22, 2025`, ...),
//! 3. date-time formats (`2025-08-22 14:03:00`, `8/22/2025 14:03`, ...),
//! 4. ISO-8601 with or without an offset.
//!
//! Values without a time of day are anchored at local noon before conversion,
//! so the instant stays on the same calendar day in UTC and in local reports
//! across DST transitions.

use std::sync::OnceLock;

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use tracing::trace;

use crate::cell::CellValue;
use crate::errors::UnparseableDate;

/// Local hour at which date-only values are anchored.
pub const DATE_ONLY_ANCHOR_HOUR: u32 = 12;

const SECONDS_PER_DAY: i64 = 86_400;

/// Serial of 9999-12-31; larger magnitudes are rejected outright.
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

const ISO_OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const ISO_NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const ISO_BASIC_DATE_FORMAT: &str = "%Y%m%d";

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

fn serial_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("invalid regex"))
}

fn builtin_date_formats() -> &'static [DateFormat] {
    static FORMATS: OnceLock<Vec<DateFormat>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        vec![
            DateFormat::shaped("M/D/YYYY", "%m/%d/%Y", r"^\d{1,2}/\d{1,2}/\d{4}$"),
            DateFormat::shaped("YYYY-MM-DD", "%Y-%m-%d", r"^\d{4}-\d{1,2}-\d{1,2}$"),
            DateFormat::shaped("M/D/YY", "%m/%d/%y", r"^\d{1,2}/\d{1,2}/\d{2}$"),
            DateFormat::shaped("Mon D, YYYY", "%b %d, %Y", r"^[A-Za-z]{3} \d{1,2}, \d{4}$"),
            DateFormat::shaped(
                "Month D, YYYY",
                "%B %d, %Y",
                r"^[A-Za-z]{3,9} \d{1,2}, \d{4}$",
            ),
        ]
    })
}

fn builtin_datetime_formats() -> &'static [DateFormat] {
    static FORMATS: OnceLock<Vec<DateFormat>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        vec![
            DateFormat::shaped(
                "YYYY-MM-DD HH:MM:SS",
                "%Y-%m-%d %H:%M:%S",
                r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{2}:\d{2}$",
            ),
            DateFormat::shaped(
                "M/D/YYYY HH:MM",
                "%m/%d/%Y %H:%M",
                r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}$",
            ),
            DateFormat::shaped(
                "M/D/YYYY HH:MM:SS",
                "%m/%d/%Y %H:%M:%S",
                r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}:\d{2}$",
            ),
        ]
    })
}

/// A chrono format string, optionally guarded by a shape regex.
///
/// chrono accepts fewer than four digits for `%Y`, so `8/22/25` would parse
/// as year 25 under `%m/%d/%Y`. The shape guard pins digit widths for the
/// built-in formats.
#[derive(Debug, Clone)]
pub struct DateFormat {
    name: String,
    pattern: String,
    shape: Option<Regex>,
}

impl DateFormat {
    /// Unguarded format; the chrono pattern doubles as its name.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            name: pattern.clone(),
            pattern,
            shape: None,
        }
    }

    fn shaped(name: &str, pattern: &str, shape: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            shape: Some(Regex::new(shape).expect("invalid regex")),
        }
    }

    /// Human-readable name (`M/D/YYYY`) or the raw pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// chrono format string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn admits(&self, text: &str) -> bool {
        self.shape.as_ref().map_or(true, |re| re.is_match(text))
    }

    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        if !self.admits(text) {
            return None;
        }
        NaiveDate::parse_from_str(text, &self.pattern).ok()
    }

    fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        if !self.admits(text) {
            return None;
        }
        NaiveDateTime::parse_from_str(text, &self.pattern).ok()
    }
}

/// Intermediate parse result, before time-zone resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Parsed {
    /// Wall-clock time in the requested zone.
    Local(NaiveDateTime),
    /// Instant that carried its own offset.
    Absolute(DateTime<FixedOffset>),
}

/// One way of reading a timestamp cell.
#[derive(Debug, Clone)]
pub enum ParseStrategy {
    /// Spreadsheet serial number, numeric cell or plain-number text.
    Serial,
    /// Date without time of day, anchored at local noon.
    DateOnly(DateFormat),
    /// Wall-clock date and time in the requested zone.
    DateTime(DateFormat),
    /// ISO-8601 / RFC 3339 fallback.
    Iso,
}

impl ParseStrategy {
    /// Name used in logs.
    pub fn name(&self) -> &str {
        match self {
            ParseStrategy::Serial => "serial",
            ParseStrategy::DateOnly(format) | ParseStrategy::DateTime(format) => format.name(),
            ParseStrategy::Iso => "iso-8601",
        }
    }

    fn attempt(&self, value: &CellValue) -> Option<Parsed> {
        match (self, value) {
            (ParseStrategy::Serial, CellValue::Number(serial)) => {
                serial_to_local(*serial).map(Parsed::Local)
            }
            (ParseStrategy::Serial, CellValue::Text(text)) => {
                let text = text.trim();
                if !serial_text_re().is_match(text) {
                    return None;
                }
                let serial = text.parse::<f64>().ok()?;
                serial_to_local(serial).map(Parsed::Local)
            }
            (ParseStrategy::DateOnly(format), CellValue::Text(text)) => format
                .parse_date(text.trim())
                .and_then(anchor_at_noon)
                .map(Parsed::Local),
            (ParseStrategy::DateTime(format), CellValue::Text(text)) => {
                format.parse_datetime(text.trim()).map(Parsed::Local)
            }
            (ParseStrategy::Iso, CellValue::Text(text)) => parse_iso(text.trim()),
            // Numbers outside the serial range, such as 20250822, are read as text.
            (_, CellValue::Number(_)) => {
                let text = CellValue::Text(value.as_text()?.into_owned());
                self.attempt(&text)
            }
            _ => None,
        }
    }
}

fn anchor_at_noon(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(DATE_ONLY_ANCHOR_HOUR, 0, 0)
}

/// Converts a spreadsheet serial into a local wall-clock time.
///
/// Whole serials are date-only and land on local noon. A fraction that rounds
/// to a full day carries into midnight of the next day.
fn serial_to_local(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }

    let whole = serial.floor();
    let mut days = whole as i64;
    let mut seconds = ((serial - whole) * SECONDS_PER_DAY as f64).round() as i64;

    if seconds == 0 {
        let date = serial_epoch().checked_add_signed(TimeDelta::try_days(days)?)?;
        return anchor_at_noon(date);
    }
    if seconds >= SECONDS_PER_DAY {
        days += 1;
        seconds -= SECONDS_PER_DAY;
    }

    let date = serial_epoch().checked_add_signed(TimeDelta::try_days(days)?)?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(u32::try_from(seconds).ok()?, 0)?;
    Some(date.and_time(time))
}

fn parse_iso(text: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Parsed::Absolute(dt));
    }
    for format in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(Parsed::Absolute(dt));
        }
    }
    for format in ISO_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Parsed::Local(naive));
        }
    }
    NaiveDate::parse_from_str(text, ISO_BASIC_DATE_FORMAT)
        .ok()
        .and_then(anchor_at_noon)
        .map(Parsed::Local)
}

/// Resolves a wall-clock time in `tz` to UTC.
///
/// Ambiguous times (repeated hour when clocks fall back) take the earlier
/// instant. Times skipped when clocks spring forward are read with the offset
/// in force before the gap.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _later) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            let probe = naive
                .checked_sub_signed(TimeDelta::days(1))
                .unwrap_or(naive);
            let offset = tz.offset_from_utc_datetime(&probe).fix();
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .unwrap_or(naive);
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Converts raw timestamp cells into UTC instants.
///
/// # Example
///
/// ```rust
/// use habitline_core::{CellValue, DateNormalizer, DEFAULT_TIMEZONE};
///
/// let normalizer = DateNormalizer::new();
/// let chicago = DEFAULT_TIMEZONE;
///
/// let from_text = normalizer.normalize(&CellValue::from("8/22/2025"), chicago)?;
/// let from_serial = normalizer.normalize(&CellValue::from(45891.0), chicago)?;
/// assert_eq!(from_text, from_serial);
/// assert_eq!(from_text.to_rfc3339(), "2025-08-22T17:00:00+00:00");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    strategies: Vec<ParseStrategy>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        let mut strategies = vec![ParseStrategy::Serial];
        strategies.extend(
            builtin_date_formats()
                .iter()
                .cloned()
                .map(ParseStrategy::DateOnly),
        );
        strategies.extend(
            builtin_datetime_formats()
                .iter()
                .cloned()
                .map(ParseStrategy::DateTime),
        );
        strategies.push(ParseStrategy::Iso);
        Self { strategies }
    }
}

impl DateNormalizer {
    /// Normalizer with the built-in strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a date-only format after the existing date-only formats.
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        let at = self
            .strategies
            .iter()
            .rposition(|s| matches!(s, ParseStrategy::DateOnly(_)))
            .map_or(1, |pos| pos + 1);
        self.strategies
            .insert(at, ParseStrategy::DateOnly(DateFormat::new(pattern)));
        self
    }

    /// Adds a date-time format after the existing date-time formats.
    pub fn with_datetime_format(mut self, pattern: impl Into<String>) -> Self {
        let at = self
            .strategies
            .iter()
            .rposition(|s| matches!(s, ParseStrategy::DateTime(_)))
            .map_or(self.strategies.len().saturating_sub(1), |pos| pos + 1);
        self.strategies
            .insert(at, ParseStrategy::DateTime(DateFormat::new(pattern)));
        self
    }

    /// Strategies in the order they are tried.
    pub fn strategies(&self) -> &[ParseStrategy] {
        &self.strategies
    }

    /// Normalizes a cell to a UTC instant, interpreting zone-less values in `tz`.
    ///
    /// # Errors
    ///
    /// Returns [`UnparseableDate`] when no strategy accepts the cell.
    pub fn normalize(&self, value: &CellValue, tz: Tz) -> Result<DateTime<Utc>, UnparseableDate> {
        for strategy in &self.strategies {
            if let Some(parsed) = strategy.attempt(value) {
                trace!(strategy = strategy.name(), %value, "timestamp parsed");
                return Ok(match parsed {
                    Parsed::Local(naive) => localize(naive, tz),
                    Parsed::Absolute(dt) => dt.with_timezone(&Utc),
                });
            }
        }
        Err(UnparseableDate::new(value.to_string()))
    }

    /// Normalizes a text value.
    pub fn normalize_str(&self, value: &str, tz: Tz) -> Result<DateTime<Utc>, UnparseableDate> {
        self.normalize(&CellValue::from(value), tz)
    }
}
