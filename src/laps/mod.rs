pub mod import;
pub mod store;
pub mod tcx;

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeMap,
};
use serde_json::{Map, Value};

use crate::errors::LaptrackError;

pub const COL_SOURCE_FILE: &str = "_source_file";
pub const COL_LAP_NUMBER: &str = "LapNumber";
pub const COL_LAP_START_TIME: &str = "LapStartTime";
pub const COL_LAP_TOTAL_TIME_S: &str = "LapTotalTime_s";
pub const COL_LAP_DISTANCE_M: &str = "LapDistance_m";
pub const COL_PACE_MIN_PER_KM: &str = "Pace_min_per_km";
pub const COL_TIME: &str = "Time";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";
pub const COL_ALTITUDE_M: &str = "Altitude_m";
pub const COL_ALTITUDE_DELTA_M: &str = "AltitudeDelta_m";
pub const COL_DISTANCE_M: &str = "Distance_m";

pub const COL_LAP_TOTAL_TIME_FORMATTED: &str = "LapTotalTime_formatted";
pub const COL_LAP_DISTANCE_FORMATTED: &str = "LapDistance_formatted";
pub const COL_ALTITUDE_FORMATTED: &str = "Altitude_formatted";
pub const COL_ALTITUDE_DELTA_FORMATTED: &str = "AltitudeDelta_formatted";
pub const COL_DISTANCE_FORMATTED: &str = "Distance_formatted";
pub const COL_LAP_START_TIME_LOCAL: &str = "LapStartTime_local";
pub const COL_TIME_LOCAL: &str = "Time_local";

/// Source key used for records stored without a `_source_file` field
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One lap (or trackpoint) as a bag of named JSON fields.
///
/// Records coming from the store are not bound to a fixed schema; callers
/// read the fields they need and coerce them with the helpers below.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapRecord(Map<String, Value>);

impl LapRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.to_string(), value.into())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The `_source_file` this record was imported from, if it is a string
    pub fn source(&self) -> Option<&str> {
        self.get(COL_SOURCE_FILE).and_then(Value::as_str)
    }

    /// Whole-value numeric reading of a field, see [`strict_number`]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(strict_number)
    }
}

impl TryFrom<Value> for LapRecord {
    type Error = LaptrackError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(LaptrackError::InvalidLapRecord),
        }
    }
}

/// Mapping of source key to lap records that keeps keys in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedLaps {
    groups: IndexMap<String, Vec<LapRecord>>,
}

impl GroupedLaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the group for `source`, creating the group at the
    /// end if it is the first record seen for that source
    pub fn push(&mut self, source: &str, record: LapRecord) {
        match self.groups.get_mut(source) {
            Some(laps) => laps.push(record),
            None => {
                self.groups.insert(source.to_string(), vec![record]);
            }
        }
    }

    /// Sets the laps of `source`, keeping its position if already present
    pub fn insert(&mut self, source: &str, laps: Vec<LapRecord>) {
        self.groups.insert(source.to_string(), laps);
    }

    pub fn get(&self, source: &str) -> Option<&[LapRecord]> {
        self.groups.get(source).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LapRecord])> {
        self.groups
            .iter()
            .map(|(source, laps)| (source.as_str(), laps.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<LapRecord>)> {
        self.groups
            .iter_mut()
            .map(|(source, laps)| (source.as_str(), laps))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// All records of all groups, in group order
    pub fn records(&self) -> impl Iterator<Item = &LapRecord> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(String, Vec<LapRecord>)> for GroupedLaps {
    fn from_iter<T: IntoIterator<Item = (String, Vec<LapRecord>)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

impl Serialize for GroupedLaps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (source, laps) in &self.groups {
            map.serialize_entry(source, laps)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupedLaps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json's map keeps document order with `preserve_order`
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(source, laps)| {
                serde_json::from_value::<Vec<LapRecord>>(laps)
                    .map(|laps| (source, laps))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// Groups records by their `_source_file`, in first-seen order. Records
/// without a string source land in [`UNKNOWN_SOURCE`].
pub fn group_by_source(records: impl IntoIterator<Item = LapRecord>) -> GroupedLaps {
    let mut grouped = GroupedLaps::new();
    for record in records {
        let source = record.source().unwrap_or(UNKNOWN_SOURCE).to_string();
        grouped.push(&source, record);
    }
    grouped
}

/// Truthiness of an optional field: missing, `null`, `false`, `0`, NaN and
/// the empty string are falsy, everything else is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0. && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Reads the longest leading decimal literal of a value, such as `12.5` out
/// of `"12.5m"`. Values without one yield NaN.
pub fn leading_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => float_prefix(s)
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Reads the leading integer of a value: numbers are truncated, strings
/// accept leading whitespace, a sign, a `0x` hex prefix and then digits.
pub fn leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }
        Value::String(s) => int_prefix(s),
        _ => None,
    }
}

/// Whole-value numeric reading: numbers, booleans and strings that parse
/// entirely (surrounding whitespace allowed). Non-finite results count as
/// not a number.
pub fn strict_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1. } else { 0. }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

fn float_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return Some(&s[..i + "Infinity".len()]);
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(&s[..i])
}

fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i64 = 0;
    let mut seen = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        value = value.saturating_mul(radix as i64).saturating_add(d as i64);
        seen += 1;
    }
    if seen == 0 {
        return None;
    }
    Some(if negative { -value } else { value })
}
