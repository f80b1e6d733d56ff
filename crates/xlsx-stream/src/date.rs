//! Date/time to serial-number conversion for the 1900 date system.
//!
//! Serial numbers count days since 1899-12-31 with the time of day as the fractional part.
//! Spreadsheet applications treat 1900 as a leap year, so every serial after
//! 1900-02-28 is one larger than the true day count and `60` names the nonexistent
//! 1900-02-29. The arithmetic below reproduces that exactly.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;

const EPOCH_YEAR: i64 = 1900;
const MAX_YEAR: i64 = 9999;
const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Convert a string holding a `YYYY-MM-DD` date and/or an `H:MM:SS` time to a serial number.
///
/// Both components are located anywhere in the input (first match wins). A missing time is
/// midnight; a missing date yields the bare time-of-day fraction. Dates outside
/// 1900-01-01..=9999-12-31 or naming a day that does not exist yield `0.0`.
pub fn excel_serial(input: &str) -> f64 {
    let fraction = parse_time(input).unwrap_or(0.0);
    match parse_date(input) {
        None => fraction,
        Some((year, month, day)) => match serial_day(year, month, day) {
            Some(days) => days as f64 + fraction,
            None => 0.0,
        },
    }
}

/// Serial number of a calendar date (no time component).
pub fn excel_serial_from_date(date: NaiveDate) -> f64 {
    serial_day(i64::from(date.year()), date.month(), date.day()).map_or(0.0, |days| days as f64)
}

/// Serial number of a date and time. Sub-second precision is kept.
pub fn excel_serial_from_datetime(datetime: NaiveDateTime) -> f64 {
    let seconds = f64::from(datetime.num_seconds_from_midnight())
        + f64::from(datetime.nanosecond() % 1_000_000_000) / 1e9;
    match serial_day(
        i64::from(datetime.year()),
        datetime.month(),
        datetime.day(),
    ) {
        Some(days) => days as f64 + seconds / SECONDS_PER_DAY,
        None => 0.0,
    }
}

/// Whole-day serial for a date, or `None` when the date is out of range.
pub fn serial_day(year: i64, month: u32, day: u32) -> Option<i64> {
    match (year, month, day) {
        // The epoch itself and the nominal day zero both map to 0.
        (1899, 12, 31) | (1900, 1, 0) => return Some(0),
        (1900, 2, 29) => return Some(60),
        _ => {}
    }

    if !(EPOCH_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }

    let leap = is_leap_year(year);
    let month_days: [i64; 12] = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let month_idx = (month - 1) as usize;
    if day < 1 || i64::from(day) > month_days[month_idx] {
        return None;
    }

    // Leap days are counted on the year offset from the epoch: 2000 becomes 100 for the
    // 4- and 100-year rules and is shifted by 300 for the 400-year rule.
    let range = year - EPOCH_YEAR;
    let mut days = i64::from(day);
    days += month_days[..month_idx].iter().sum::<i64>();
    days += range * 365;
    days += range / 4;
    days -= range / 100;
    days += (range + 300) / 400;
    days -= i64::from(leap);

    // 1900 was not a leap year, but the format says it was.
    if days > 59 {
        days += 1;
    }
    Some(days)
}

pub fn is_leap_year(year: i64) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

fn parse_date(input: &str) -> Option<(i64, u32, u32)> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE
        .get_or_init(|| Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("valid regex"));
    let caps = re.captures(input)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

fn parse_time(input: &str) -> Option<f64> {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let re = TIME_RE
        .get_or_init(|| Regex::new(r"([0-9]+):([0-9]{2}):([0-9]{2})").expect("valid regex"));
    let caps = re.captures(input)?;
    let hour: f64 = caps[1].parse().ok()?;
    let min: f64 = caps[2].parse().ok()?;
    let sec: f64 = caps[3].parse().ok()?;
    Some((hour * 3600.0 + min * 60.0 + sec) / SECONDS_PER_DAY)
}
