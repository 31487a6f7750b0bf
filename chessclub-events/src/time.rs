//! Time and date helpers pinned to the club's reference zone.
//!
//! Nothing in here consults the host's local zone, so display strings and
//! "today" are the same on a laptop and on the deployment box.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::{America::New_York, Tz};

use crate::{Error, Result};

pub const REFERENCE_ZONE: Tz = New_York;

/// Time used when the source gives a date but no time of day.
pub fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default()
}

/// Parses `h:mm AM` / `h:mm PM` into a wall-clock time.
pub fn to_twenty_four_hour(time_12h: &str) -> Result<NaiveTime> {
    let invalid = || Error::Format(time_12h.to_string());

    let mut parts = time_12h.split_whitespace();
    let clock = parts.next().ok_or_else(invalid)?;
    let modifier = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
    let hours = hours.parse::<u32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;

    if !(1..=12).contains(&hours) {
        return Err(invalid());
    }

    let hours = match modifier.to_ascii_uppercase().as_str() {
        "AM" if hours == 12 => 0,
        "AM" => hours,
        "PM" if hours == 12 => 12,
        "PM" => hours + 12,
        _ => return Err(invalid()),
    };

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Accepts `HH:MM` as well as the 12 hour form.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    match NaiveTime::parse_from_str(raw, "%H:%M") {
        Ok(time) => Ok(time),
        Err(_) => to_twenty_four_hour(raw),
    }
}

/// Noon of the given `YYYY-MM-DD` date in the reference zone.
///
/// Noon keeps the calendar date intact when the instant is later shifted by a
/// daylight saving transition or shown in another zone.
pub fn local_date_from_iso_date(iso_date: &str) -> Result<DateTime<Tz>> {
    let date = NaiveDate::parse_from_str(iso_date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Date(iso_date.to_string()))?;
    at_noon(date).ok_or_else(|| Error::Date(iso_date.to_string()))
}

pub(crate) fn at_noon(date: NaiveDate) -> Option<DateTime<Tz>> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    REFERENCE_ZONE.from_local_datetime(&noon).earliest()
}

/// `October 18, 2026`
pub fn format_display_date<Z: TimeZone>(instant: &DateTime<Z>) -> String {
    instant
        .with_timezone(&REFERENCE_ZONE)
        .format("%B %-d, %Y")
        .to_string()
}

/// `19:00` becomes `7:00 PM`.
pub fn format_display_time(time_24h: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(time_24h.trim(), "%H:%M")
        .map_err(|_| Error::Format(time_24h.to_string()))?;
    Ok(format_time_of_day(time))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let modifier = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {modifier}", time.minute())
}

pub fn today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&REFERENCE_ZONE).date_naive()
}

pub fn time_of_day_in_reference_zone<Z: TimeZone>(instant: &DateTime<Z>) -> NaiveTime {
    let local = instant.with_timezone(&REFERENCE_ZONE).time();
    NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(local)
}

/// Wall-clock `date` and `time` read in the reference zone.
pub fn in_reference_zone(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    REFERENCE_ZONE
        .from_local_datetime(&date.and_time(time))
        .earliest()
}

/// Midnight of `date` in the reference zone.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Tz>> {
    REFERENCE_ZONE
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn hm(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    #[test]
    fn twelve_hour_boundaries() {
        let cases = [
            ("12:00 AM", "00:00"),
            ("12:01 AM", "00:01"),
            ("11:59 AM", "11:59"),
            ("12:00 PM", "12:00"),
            ("12:01 PM", "12:01"),
            ("11:59 PM", "23:59"),
            ("7:30 pm", "19:30"),
        ];

        for (input, expected) in cases {
            assert_eq!(hm(to_twenty_four_hour(input).unwrap()), expected, "{input}");
        }
    }

    #[test]
    fn twelve_hour_rejects_garbage() {
        for input in ["7:30", "seven:30 PM", "7:xx PM", "13:00 PM", "0:15 AM", "7:60 AM", "7:30 XM", ""] {
            assert_eq!(
                to_twenty_four_hour(input),
                Err(Error::Format(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn time_of_day_accepts_both_forms() {
        assert_eq!(hm(parse_time_of_day("19:00").unwrap()), "19:00");
        assert_eq!(hm(parse_time_of_day(" 6:45 PM ").unwrap()), "18:45");
        assert!(parse_time_of_day("evening").is_err());
    }

    #[test]
    fn iso_date_is_anchored_at_noon() {
        let date = local_date_from_iso_date("2026-11-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 11, 1));
        assert_eq!(date.hour(), 12);
        assert_eq!(date.timezone(), REFERENCE_ZONE);

        assert!(local_date_from_iso_date("2026-02-30").is_err());
        assert!(local_date_from_iso_date("11/01/2026").is_err());
    }

    #[test]
    fn display_date_uses_reference_zone() {
        // 02:30 UTC is still the previous evening in New York
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 2, 30, 0).unwrap();
        assert_eq!(format_display_date(&instant), "October 18, 2026");

        let noon = local_date_from_iso_date("2027-01-05").unwrap();
        assert_eq!(format_display_date(&noon), "January 5, 2027");
    }

    #[test]
    fn display_time() {
        assert_eq!(format_display_time("19:00").unwrap(), "7:00 PM");
        assert_eq!(format_display_time("00:05").unwrap(), "12:05 AM");
        assert_eq!(format_display_time("12:30").unwrap(), "12:30 PM");
        assert_eq!(format_display_time("09:15").unwrap(), "9:15 AM");
        assert!(format_display_time("9pm").is_err());
    }

    #[test]
    fn today_follows_reference_zone() {
        let late_evening = Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap();
        assert_eq!(today(late_evening), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());

        let morning = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        assert_eq!(today(morning), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn wall_clock_in_reference_zone() {
        let instant = DateTime::parse_from_rfc3339("2026-10-22T23:00:00Z").unwrap();
        assert_eq!(hm(time_of_day_in_reference_zone(&instant)), "19:00");
    }
}
