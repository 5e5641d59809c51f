// Parser for Garmin Training Center XML (TCX) activity files

use std::{fs, path::Path};

use log::debug;
use roxmltree::{Document, Node};

use super::{
    COL_ALTITUDE_M, COL_DISTANCE_M, COL_LAP_DISTANCE_M, COL_LAP_NUMBER, COL_LAP_START_TIME,
    COL_LAP_TOTAL_TIME_S, COL_LATITUDE, COL_LONGITUDE, COL_PACE_MIN_PER_KM, COL_TIME, LapRecord,
};
use crate::errors::LaptrackError;

pub const TCX_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

/// Date reported for activities without a lap start time
pub const UNKNOWN_DATE: &str = "UnknownDate";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trackpoint {
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_m: Option<f64>,
    /// Distance covered since the start of the activity
    pub distance_m: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TcxLap {
    /// 1-based position of the lap in the document
    pub number: u32,
    pub start_time: Option<String>,
    pub total_time_s: Option<f64>,
    pub distance_m: Option<f64>,
    pub pace_min_per_km: Option<f64>,
    pub trackpoints: Vec<Trackpoint>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TcxActivity {
    pub laps: Vec<TcxLap>,
}

/// Pace in minutes per kilometer, when both time and distance are positive
pub fn calc_pace(total_time_s: Option<f64>, distance_m: Option<f64>) -> Option<f64> {
    match (total_time_s, distance_m) {
        (Some(time), Some(distance)) if time > 0. && distance > 0. => {
            Some((time / (distance / 1000.)) / 60.)
        }
        _ => None,
    }
}

pub fn parse_tcx_file(path: &Path) -> Result<TcxActivity, LaptrackError> {
    let content = fs::read_to_string(path).map_err(|e| LaptrackError::ActivityReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let activity = parse_tcx(&content)?;
    debug!("Parsed {:?}: {} laps", path, activity.laps.len());
    Ok(activity)
}

pub fn parse_tcx(content: &str) -> Result<TcxActivity, LaptrackError> {
    let doc = Document::parse(content).map_err(|e| LaptrackError::InvalidActivityXml {
        reason: e.to_string(),
    })?;

    let laps = doc
        .descendants()
        .filter(|n| n.has_tag_name((TCX_NAMESPACE, "Lap")))
        .enumerate()
        .map(|(idx, lap)| parse_lap(idx as u32 + 1, lap))
        .collect();

    Ok(TcxActivity { laps })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.has_tag_name((TCX_NAMESPACE, name)))
}

/// `Ok(None)` for a missing or empty element, `Err(())` when its text is not
/// a number
fn child_number(node: Node, name: &str) -> Result<Option<f64>, ()> {
    match child(node, name).and_then(|n| n.text()) {
        Some(text) if !text.is_empty() => text.trim().parse::<f64>().map(Some).map_err(|_| ()),
        _ => Ok(None),
    }
}

fn parse_lap(number: u32, lap: Node) -> TcxLap {
    // a bad time or distance invalidates both
    let (total_time_s, distance_m) = match (
        child_number(lap, "TotalTimeSeconds"),
        child_number(lap, "DistanceMeters"),
    ) {
        (Ok(time), Ok(distance)) => (time, distance),
        _ => (None, None),
    };

    let trackpoints = lap
        .descendants()
        .filter(|n| n.has_tag_name((TCX_NAMESPACE, "Trackpoint")))
        .map(parse_trackpoint)
        .collect();

    TcxLap {
        number,
        start_time: lap.attribute("StartTime").map(str::to_string),
        total_time_s,
        distance_m,
        pace_min_per_km: calc_pace(total_time_s, distance_m),
        trackpoints,
    }
}

fn parse_trackpoint(tp: Node) -> Trackpoint {
    let time = child(tp, "Time")
        .and_then(|n| n.text())
        .map(str::to_string);

    let (latitude, longitude) = match child(tp, "Position") {
        Some(pos) => match (
            child_number(pos, "LatitudeDegrees"),
            child_number(pos, "LongitudeDegrees"),
        ) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => (None, None),
        },
        None => (None, None),
    };

    Trackpoint {
        time,
        latitude,
        longitude,
        altitude_m: child_number(tp, "AltitudeMeters").ok().flatten(),
        distance_m: child_number(tp, "DistanceMeters").ok().flatten(),
    }
}

impl TcxLap {
    fn lap_fields(&self) -> LapRecord {
        let mut record = LapRecord::new();
        record.insert(COL_LAP_NUMBER, self.number);
        record.insert(COL_LAP_START_TIME, self.start_time.clone());
        record.insert(COL_LAP_TOTAL_TIME_S, self.total_time_s);
        record.insert(COL_LAP_DISTANCE_M, self.distance_m);
        record.insert(COL_PACE_MIN_PER_KM, self.pace_min_per_km);
        record
    }
}

impl TcxActivity {
    /// Date part of the first lap's start time
    pub fn first_lap_date(&self) -> String {
        self.laps
            .first()
            .and_then(|lap| lap.start_time.as_deref())
            .map(|start| start.split('T').next().unwrap_or(start).to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string())
    }

    /// One record per lap
    pub fn summary_records(&self) -> Vec<LapRecord> {
        self.laps.iter().map(TcxLap::lap_fields).collect()
    }

    /// One record per trackpoint, carrying the fields of its lap
    pub fn detailed_records(&self) -> Vec<LapRecord> {
        self.laps
            .iter()
            .flat_map(|lap| {
                lap.trackpoints.iter().map(move |tp| {
                    let mut record = lap.lap_fields();
                    record.insert(COL_TIME, tp.time.clone());
                    record.insert(COL_LATITUDE, tp.latitude);
                    record.insert(COL_LONGITUDE, tp.longitude);
                    record.insert(COL_ALTITUDE_M, tp.altitude_m);
                    record.insert(COL_DISTANCE_M, tp.distance_m);
                    record
                })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) const SAMPLE_TCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="Running">
      <Id>2025-08-05T08:24:01Z</Id>
      <Lap StartTime="2025-08-05T08:24:01Z">
        <TotalTimeSeconds>300.0</TotalTimeSeconds>
        <DistanceMeters>1000.0</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2025-08-05T08:24:01Z</Time>
            <Position>
              <LatitudeDegrees>40.123</LatitudeDegrees>
              <LongitudeDegrees>-74.456</LongitudeDegrees>
            </Position>
            <AltitudeMeters>100.0</AltitudeMeters>
            <DistanceMeters>0.0</DistanceMeters>
          </Trackpoint>
          <Trackpoint>
            <Time>2025-08-05T08:29:01Z</Time>
            <AltitudeMeters>112.5</AltitudeMeters>
            <DistanceMeters>1000.0</DistanceMeters>
          </Trackpoint>
        </Track>
      </Lap>
      <Lap StartTime="2025-08-05T08:29:01Z">
        <TotalTimeSeconds>150</TotalTimeSeconds>
        <DistanceMeters>500</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2025-08-05T08:34:01Z</Time>
            <AltitudeMeters>108.0</AltitudeMeters>
            <DistanceMeters>1500.0</DistanceMeters>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#;

    #[test]
    fn test_parse_laps_in_document_order() {
        let activity = parse_tcx(SAMPLE_TCX).unwrap();
        assert_eq!(activity.laps.len(), 2);
        assert_eq!(activity.laps[0].number, 1);
        assert_eq!(activity.laps[1].number, 2);
        assert_eq!(activity.laps[0].total_time_s, Some(300.));
        assert_eq!(activity.laps[1].distance_m, Some(500.));
        assert_eq!(activity.laps[0].pace_min_per_km, Some(5.));
        assert_eq!(activity.laps[0].trackpoints.len(), 2);
        assert_eq!(activity.laps[1].trackpoints.len(), 1);
    }

    #[test]
    fn test_trackpoint_fields() {
        let activity = parse_tcx(SAMPLE_TCX).unwrap();
        let tp = &activity.laps[0].trackpoints[0];
        assert_eq!(tp.time.as_deref(), Some("2025-08-05T08:24:01Z"));
        assert_eq!(tp.latitude, Some(40.123));
        assert_eq!(tp.longitude, Some(-74.456));
        assert_eq!(tp.altitude_m, Some(100.));

        let no_position = &activity.laps[0].trackpoints[1];
        assert_eq!(no_position.latitude, None);
        assert_eq!(no_position.distance_m, Some(1000.));
    }

    #[test]
    fn test_invalid_lap_numbers_clear_time_and_distance() {
        let content = format!(
            r#"<TrainingCenterDatabase xmlns="{TCX_NAMESPACE}"><Lap StartTime="2024-01-01T10:00:00Z"><TotalTimeSeconds>abc</TotalTimeSeconds><DistanceMeters>1000</DistanceMeters></Lap></TrainingCenterDatabase>"#
        );
        let activity = parse_tcx(&content).unwrap();
        assert_eq!(activity.laps[0].total_time_s, None);
        assert_eq!(activity.laps[0].distance_m, None);
        assert_eq!(activity.laps[0].pace_min_per_km, None);
    }

    #[test]
    fn test_elements_outside_namespace_are_ignored() {
        let content = r#"<TrainingCenterDatabase><Lap><TotalTimeSeconds>1</TotalTimeSeconds></Lap></TrainingCenterDatabase>"#;
        let activity = parse_tcx(content).unwrap();
        assert!(activity.laps.is_empty());
        assert_eq!(activity.first_lap_date(), UNKNOWN_DATE);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_tcx("<TrainingCenterDatabase><Lap>");
        assert!(matches!(
            result,
            Err(LaptrackError::InvalidActivityXml { .. })
        ));
    }

    #[test]
    fn test_first_lap_date() {
        let activity = parse_tcx(SAMPLE_TCX).unwrap();
        assert_eq!(activity.first_lap_date(), "2025-08-05");
    }

    #[test]
    fn test_calc_pace() {
        assert_eq!(calc_pace(Some(0.), Some(1000.)), None);
        assert_eq!(calc_pace(Some(600.), Some(0.)), None);
        assert_eq!(calc_pace(Some(-600.), Some(1000.)), None);
        assert_eq!(calc_pace(Some(600.), Some(-1000.)), None);
        assert_eq!(calc_pace(None, Some(1000.)), None);
        assert_eq!(calc_pace(Some(600.), Some(2000.)), Some(5.));
    }

    #[test]
    fn test_summary_and_detailed_records() {
        let activity = parse_tcx(SAMPLE_TCX).unwrap();

        let summary = activity.summary_records();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[1].get(COL_LAP_NUMBER), Some(&json!(2)));
        assert_eq!(summary[1].get(COL_LAP_TOTAL_TIME_S), Some(&json!(150.0)));
        assert!(!summary[0].contains(COL_TIME));

        let detailed = activity.detailed_records();
        assert_eq!(detailed.len(), 3);
        assert_eq!(detailed[1].get(COL_LAP_NUMBER), Some(&json!(1)));
        assert_eq!(detailed[1].get(COL_LATITUDE), Some(&json!(null)));
        assert_eq!(detailed[2].get(COL_ALTITUDE_M), Some(&json!(108.0)));
        assert_eq!(
            detailed[2].get(COL_LAP_START_TIME),
            Some(&json!("2025-08-05T08:29:01Z"))
        );
    }
}
