// Rewrites date/time text to the viewer's timezone

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike};

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Longest stretch of skipped wall-clock time a zone transition may leave
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Wall-clock time `naive` in `tz`. Ambiguous times take the earlier
/// instant, times skipped by a transition take the first one after the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| {
        naive
            .checked_add_signed(TimeDelta::minutes(minutes))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
    })
}

fn is_bare_date(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

/// Reads `text` as an instant in `tz`. Bare dates are midnight in `tz`,
/// timestamps without an offset are wall-clock time in `tz`.
pub fn parse_display_time<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let text = text.trim();
    if is_bare_date(text) {
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        return resolve_local(tz, date.and_time(NaiveTime::MIN));
    }

    let with_offset = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|f| DateTime::parse_from_str(text, f).ok())
        });
    if let Some(instant) = with_offset {
        return Some(instant.with_timezone(tz));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .and_then(|naive| resolve_local(tz, naive))
}

/// Local date for instants at midnight, local date and time otherwise.
/// Text that is not a date comes back unchanged.
pub fn to_local_display<Tz: TimeZone>(text: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_display_time(text, tz) {
        Some(local) if local.hour() == 0 && local.minute() == 0 && local.second() == 0 => {
            local.format(DATE_FORMAT).to_string()
        }
        Some(local) => local.format(DATE_TIME_FORMAT).to_string(),
        None => text.to_string(),
    }
}
