//! Backend timestamp parsing and human-readable relative formatting.
//!
//! The backend serializes instants as `YYYY-MM-DD HH:MM:SS[.fraction]` in UTC,
//! optionally followed by zone tokens which are ignored.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const UNITS: [(i64, &str); 7] = [
    (31_536_000, "year"),
    (2_592_000, "month"),
    (604_800, "week"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
    (1, "second"),
];

/// Parse a backend timestamp. Blank input maps to the unix epoch and
/// fractions are truncated to milliseconds. Returns `None` when malformed.
pub fn parse_backend_time(s: &str) -> Option<DateTime<Utc>> {
    if s.trim().is_empty() {
        return Some(DateTime::<Utc>::UNIX_EPOCH);
    }

    let mut parts = s.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;

    let mut ymd = date.split('-');
    let year: i32 = ymd.next()?.parse().ok()?;
    let month: u32 = ymd.next()?.parse().ok()?;
    let day: u32 = ymd.next()?.parse().ok()?;

    let mut hms = time.split(':');
    let hour: u32 = hms.next()?.parse().ok()?;
    let minute: u32 = hms.next()?.parse().ok()?;
    let seconds = hms.next()?;
    let (second, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let second: u32 = second.parse().ok()?;

    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut millis: String = fraction.chars().take(3).collect();
    while millis.len() < 3 {
        millis.push('0');
    }
    let millis: u32 = millis.parse().ok()?;

    let naive = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(year, month, day)?,
        NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?,
    );
    Some(Utc.from_utc_datetime(&naive))
}

/// Whether `instant` falls on the same local calendar day as `now`.
pub fn is_today(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let a = instant.with_timezone(&Local);
    let b = now.with_timezone(&Local);
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// Whole days from `now` until `instant`, rounded towards negative infinity.
pub fn days_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (instant - now).num_milliseconds() as f64 / 1000.0;
    (secs.round() as i64).div_euclid(86_400)
}

/// Describe `instant` relative to `now`, e.g. `3 hours ago` or `in 2 days`.
///
/// With `ignore_today` unset, differences below one day collapse to
/// `today`, `yesterday` or `tomorrow`.
pub fn relative_format(instant: DateTime<Utc>, now: DateTime<Utc>, ignore_today: bool) -> String {
    let diff_ms = (now - instant).num_milliseconds();
    let is_before = diff_ms > 0;
    let distance = ((diff_ms.abs() as f64) / 1000.0).round() as i64;

    let units: &[(i64, &str)] = if ignore_today { &UNITS } else { &UNITS[..4] };
    for (size, name) in units {
        let amount = distance / size;
        if amount > 0 {
            return phrase(amount, name, is_before);
        }
    }

    if ignore_today {
        phrase(distance, "second", is_before)
    } else if is_today(instant, now) {
        "today".to_string()
    } else if is_before {
        "yesterday".to_string()
    } else {
        "tomorrow".to_string()
    }
}

fn phrase(amount: i64, unit: &str, is_before: bool) -> String {
    let plural = if amount == 1 { "" } else { "s" };
    if is_before {
        format!("{} {}{} ago", amount, unit, plural)
    } else {
        format!("in {} {}{}", amount, unit, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_backend_format() {
        let t = parse_backend_time("2022-05-01 13:45:07.123456 +0000 UTC").unwrap();
        assert_eq!(t.to_rfc3339(), "2022-05-01T13:45:07.123+00:00");

        let t = parse_backend_time("2022-05-01 13:45:07").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 0);
        assert_eq!(t.timestamp(), 1_651_412_707);
    }

    #[test]
    fn blank_is_epoch_and_garbage_is_none() {
        assert_eq!(parse_backend_time("  ").unwrap().timestamp(), 0);
        assert!(parse_backend_time("yesterday").is_none());
        assert!(parse_backend_time("2022-13-01 00:00:00").is_none());
    }

    #[test]
    fn non_digit_fraction_is_none() {
        assert!(parse_backend_time("2022-05-01 13:45:07.12é").is_none());
        assert!(parse_backend_time("2022-05-01 13:45:07.éé").is_none());
        assert!(parse_backend_time("2022-05-01 13:45:07.1x").is_none());
    }

    #[test]
    fn relative_in_both_directions() {
        let now = Utc::now();
        assert_eq!(relative_format(now - Duration::hours(3), now, true), "3 hours ago");
        assert_eq!(relative_format(now + Duration::days(2), now, true), "in 2 days");
        assert_eq!(relative_format(now + Duration::minutes(1), now, true), "in 1 minute");
        assert_eq!(relative_format(now, now, true), "in 0 seconds");
    }

    #[test]
    fn relative_without_intraday_detail() {
        let now = Utc::now();
        assert_eq!(relative_format(now, now, false), "today");
        assert_eq!(relative_format(now - Duration::weeks(2), now, false), "2 weeks ago");
    }

    #[test]
    fn days_until_floors() {
        let now = Utc::now();
        assert_eq!(days_until(now + Duration::hours(49), now), 2);
        assert_eq!(days_until(now - Duration::hours(1), now), -1);
    }
}
