//! Conversion between published maturity dates and Unix timestamps.
//!
//! Maturity dates are written as `D Mon YYYY, HH:MM TZ`, for example
//! `27 Sept 2024, 08:00 GMT`. The canonical form produced by
//! [`format_maturity`] always uses three-letter months and `GMT`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::MaturityError;

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

/// Parses a maturity date into Unix epoch seconds.
///
/// # Errors
///
/// Returns [`MaturityError`] when the text is not a valid
/// `D Mon YYYY, HH:MM TZ` date or lies before the epoch.
pub fn parse_maturity(text: &str) -> Result<u64, MaturityError> {
    let format_err = || MaturityError::Format(text.to_string());

    let (date_part, time_part) = text.trim().split_once(',').ok_or_else(format_err)?;

    let mut date_fields = date_part.split_whitespace();
    let (Some(day), Some(month), Some(year), None) = (
        date_fields.next(),
        date_fields.next(),
        date_fields.next(),
        date_fields.next(),
    ) else {
        return Err(format_err());
    };

    let mut time_fields = time_part.split_whitespace();
    let (Some(clock), Some(zone), None) =
        (time_fields.next(), time_fields.next(), time_fields.next())
    else {
        return Err(format_err());
    };

    let day: u32 = day.parse().map_err(|_| format_err())?;
    let year: i32 = year.parse().map_err(|_| format_err())?;
    let month = parse_month(month)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| MaturityError::Date(date_part.trim().to_string()))?;
    let time = NaiveTime::parse_from_str(clock, "%H:%M")
        .map_err(|_| MaturityError::Time(clock.to_string()))?;
    let offset = parse_zone(zone)?;

    let instant = offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(format_err)?;

    u64::try_from(instant.timestamp()).map_err(|_| MaturityError::BeforeEpoch)
}

/// Formats Unix epoch seconds as `D Mon YYYY, HH:MM GMT`.
///
/// # Errors
///
/// Returns [`MaturityError::OutOfRange`] for timestamps chrono cannot
/// represent.
pub fn format_maturity(timestamp: u64) -> Result<String, MaturityError> {
    let instant = to_datetime(timestamp)?;
    Ok(instant.format("%-d %b %Y, %H:%M GMT").to_string())
}

pub(crate) fn to_datetime(timestamp: u64) -> Result<DateTime<Utc>, MaturityError> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or(MaturityError::OutOfRange(timestamp))
}

fn parse_month(name: &str) -> Result<u32, MaturityError> {
    let lower = name.trim_end_matches('.').to_ascii_lowercase();
    // "Sept" is the common four-letter form
    let lower = if lower == "sept" { "sep".to_string() } else { lower };

    MONTHS
        .iter()
        .position(|(short, long)| lower == *short || lower == *long)
        .and_then(|index| u32::try_from(index + 1).ok())
        .ok_or_else(|| MaturityError::Month(name.to_string()))
}

fn parse_zone(zone: &str) -> Result<FixedOffset, MaturityError> {
    let zone_err = || MaturityError::Timezone(zone.to_string());

    match zone.to_ascii_uppercase().as_str() {
        "GMT" | "UTC" | "Z" => return FixedOffset::east_opt(0).ok_or_else(zone_err),
        _ => {}
    }

    let sign = match zone.as_bytes().first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(zone_err()),
    };
    let (hours, minutes) = zone[1..].split_once(':').ok_or_else(zone_err)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(zone_err());
    }
    let hours: i32 = hours.parse().map_err(|_| zone_err())?;
    let minutes: i32 = minutes.parse().map_err(|_| zone_err())?;
    if hours > 23 || minutes > 59 {
        return Err(zone_err());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(zone_err)
}
