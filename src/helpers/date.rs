//! Date coercion and formatting helpers

use anyhow::{anyhow, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fmt::Write;

lazy_static! {
    /// ISO 8601 / YAML 1.1 timestamp: `T` or blanks between date and time,
    /// optional seconds and fraction, optional `Z` or `±h[h][[:]mm]` offset
    static ref TIMESTAMP_REGEX: Regex = Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{1,2})-(?P<d>\d{1,2})(?:[Tt]|[ \t]+)(?P<h>\d{1,2}):(?P<mi>\d{2})(?::(?P<s>\d{2})(?:\.(?P<frac>\d*))?)?(?:[ \t]*(?P<tz>[Zz]|[-+]\d{1,2}(?::?\d{2})?))?$"
    ).unwrap();

    /// `YYYY` or `YYYY-MM`
    static ref PARTIAL_DATE_REGEX: Regex =
        Regex::new(r"^(?P<y>\d{4})(?:-(?P<mo>\d{2}))?$").unwrap();
}

/// Slash-separated datetimes without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S%.f", "%Y/%m/%d %H:%M"];

/// Date-only layouts, read as midnight UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Format used when a configured date format cannot be rendered
const FALLBACK_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string in the layouts front-matter authors commonly write
///
/// Returns `None` when the string is not a valid calendar date, so
/// `2024-02-30` is rejected rather than rolled over.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(caps) = TIMESTAMP_REGEX.captures(s) {
        return timestamp_from_captures(&caps);
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return midnight_utc(d);
        }
    }

    if let Some(caps) = PARTIAL_DATE_REGEX.captures(s) {
        let year = caps["y"].parse().ok()?;
        let month = caps.name("mo").map_or(Some(1), |m| m.as_str().parse().ok())?;
        return midnight_utc(NaiveDate::from_ymd_opt(year, month, 1)?);
    }

    // e.g. "Mon, 15 Jan 2024 10:30:00 +0000"
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

fn midnight_utc(d: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?))
}

fn timestamp_from_captures(caps: &Captures) -> Option<DateTime<Utc>> {
    let number = |name: &str| -> Option<u32> {
        caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let date = NaiveDate::from_ymd_opt(caps["y"].parse().ok()?, number("mo")?, number("d")?)?;

    // Fraction digits beyond nanoseconds are dropped
    let nanos = match caps.name("frac") {
        Some(m) if !m.as_str().is_empty() => {
            let digits: String = m.as_str().chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        _ => 0,
    };
    let naive = date.and_hms_nano_opt(number("h")?, number("mi")?, number("s")?, nanos)?;

    let offset = match caps.name("tz").map(|m| m.as_str()) {
        None | Some("Z") | Some("z") => return Some(Utc.from_utc_datetime(&naive)),
        Some(tz) => parse_offset(tz)?,
    };
    let local = offset.from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}

/// Parse `+5`, `-05`, `+0530` or `+05:30`
fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let (sign, digits) = match tz.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits = digits.replace(':', "");
    let (hours, minutes) = if digits.len() <= 2 {
        (digits.as_str(), "0")
    } else {
        digits.split_at(digits.len() - 2)
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Interpret a number as milliseconds since the Unix epoch
pub fn from_timestamp_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let millis = millis.trunc();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Format a date using Moment.js-compatible format string
///
/// A format that chrono cannot render falls back to `YYYY-MM-DD`; use
/// [`check_date_format`] to reject such formats up front.
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    let mut out = String::new();
    if write!(out, "{}", date.format(&chrono_format)).is_ok() {
        return out;
    }

    tracing::debug!("Unrenderable date format {:?}, using {}", format, FALLBACK_FORMAT);
    date.format(FALLBACK_FORMAT).to_string()
}

/// Reject Moment.js-style formats chrono cannot render
pub fn check_date_format(format: &str) -> Result<()> {
    let chrono_format = moment_to_chrono_format(format);
    if StrftimeItems::new(&chrono_format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow!("Invalid date format: {:?}", format));
    }
    Ok(())
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date_only() {
        let dt = parse_date_string("2024-01-15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        let dt = parse_date_string("2024/01/15").unwrap();
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn test_parse_datetime_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15 10:30"), Some(expected));
        assert_eq!(
            parse_date_string("Mon, 15 Jan 2024 10:30:00 +0000"),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_partial_dates() {
        assert_eq!(
            parse_date_string("2024"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date_string("2024-03"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date_string("2024-13"), None);
    }

    #[test]
    fn test_parse_minute_precision_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_date_string("2024-01-15T10:30Z"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15 10:30Z"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30"), Some(expected));
    }

    #[test]
    fn test_parse_yaml_timestamps() {
        // Examples from the YAML 1.1 timestamp type
        let expected = Utc
            .with_ymd_and_hms(2001, 12, 15, 2, 59, 43)
            .unwrap()
            .with_nanosecond(100_000_000)
            .unwrap();
        assert_eq!(parse_date_string("2001-12-14 21:59:43.10 -5"), Some(expected));
        assert_eq!(parse_date_string("2001-12-14t21:59:43.10-05:00"), Some(expected));
        assert_eq!(parse_date_string("2001-12-15 2:59:43.10"), Some(expected));
        assert_eq!(parse_date_string("2001-12-15T02:59:43.1Z"), Some(expected));

        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap();
        assert_eq!(parse_date_string("2024-01-15 10:30:00 +0530"), Some(expected));
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert_eq!(parse_date_string("not-a-date"), None);
        assert_eq!(parse_date_string(""), None);
        assert_eq!(parse_date_string("2024-02-30"), None);
        assert_eq!(parse_date_string("2024-13-01"), None);
        assert_eq!(parse_date_string("2024-01-15T25:00"), None);
        assert_eq!(parse_date_string("2024-01-15 10:30:00 +05:75"), None);
    }

    #[test]
    fn test_from_timestamp_millis() {
        let dt = from_timestamp_millis(1_705_276_800_000.0).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(from_timestamp_millis(f64::NAN), None);
        assert_eq!(from_timestamp_millis(f64::INFINITY), None);
        assert_eq!(from_timestamp_millis(1e300), None);
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD"), "2024-01-15");
        assert_eq!(format_date(&date, "YYYY/MM/DD HH:mm"), "2024/01/15 10:30");
    }

    #[test]
    fn test_format_date_invalid_format_falls_back() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD 100%"), "2024-01-15");
    }

    #[test]
    fn test_check_date_format() {
        assert!(check_date_format("YYYY-MM-DD").is_ok());
        assert!(check_date_format("MMMM DD, YYYY HH:mm").is_ok());
        assert!(check_date_format("YYYY-MM-DD 100%").is_err());
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
