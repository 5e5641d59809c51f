// Display helpers for lap times, distances and column names

use serde_json::Value;

use crate::laps::strict_number;

/// Number reading for chart ticks and tooltips: numbers, booleans, `null`
/// (as 0), and strings holding nothing but a numeric literal (blank as 0).
fn display_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1. } else { 0. }),
        Value::Null => Some(0.),
        Value::String(s) => numeric_literal(s.trim()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn numeric_literal(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(0.);
    }
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    const RADIX_PREFIXES: [(&str, u32); 6] = [
        ("0x", 16),
        ("0X", 16),
        ("0o", 8),
        ("0O", 8),
        ("0b", 2),
        ("0B", 2),
    ];
    if let Some((prefix, radix)) = RADIX_PREFIXES
        .into_iter()
        .find(|(prefix, _)| s.starts_with(prefix))
    {
        let digits = &s[prefix.len()..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        // folded as f64 so literals wider than 64 bits still read
        let value = digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0., |acc, d| acc * f64::from(radix) + f64::from(d));
        return Some(value);
    }
    // `inf` and `nan` are not literals here
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// `HH:MM:SS` for a number of seconds, hours unbounded. `None` for NaN and
/// infinities.
pub fn format_hms(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let h = (seconds / 3600.).floor() as i64;
    let m = ((seconds % 3600.) / 60.).floor() as i64;
    let s = (seconds % 60.).floor() as i64;
    Some(format!("{h:02}:{m:02}:{s:02}"))
}

/// Axis tick and tooltip text. Values that are not numbers come back as they
/// were given.
pub fn format_seconds_to_hms(value: &Value) -> String {
    match display_number(value).and_then(format_hms) {
        Some(text) => text,
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Lap duration as `H:MM:SS` from whole seconds, with a day count beyond
/// 24 hours. Unreadable values show as `00:00:00`.
pub fn format_duration(value: &Value) -> String {
    let Some(seconds) = strict_number(value) else {
        return "00:00:00".to_string();
    };
    let total = seconds.trunc() as i64;
    let days = total.div_euclid(86_400);
    let rem = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

/// Distance in meters, switching to kilometers from 1000 m
pub fn format_distance(value: &Value) -> String {
    let meters = strict_number(value).unwrap_or(0.);
    if meters >= 1000. {
        format!("{:.2} km", meters / 1000.)
    } else {
        format!("{:.2} m", meters)
    }
}

pub fn format_altitude(value: &Value) -> String {
    format!("{:.2} m", strict_number(value).unwrap_or(0.))
}

/// Column header for a record field
pub fn friendly_column_name(column: &str) -> &str {
    match column {
        "LapNumber" => "Lap",
        "Time" => "Time",
        "LapStartTime" => "Lap Start",
        "LapDistance_m" => "Lap Distance",
        "Distance_m" => "Distance",
        "Altitude_m" => "Altitude",
        "AltitudeDelta_m" => "Altitude Δ",
        "LapTotalTime_s" => "Lap Time",
        "Pace_min_per_km" => "Pace",
        "Latitude_deg" => "Latitude",
        "Longitude_deg" => "Longitude",
        "HeartRate_bpm" => "Heart Rate",
        "Speed_ms" => "Speed",
        "Cadence_rpm" => "Cadence",
        other => other,
    }
}
