// Dashboard data: per-file summaries, personal records and table rows

pub mod format;
pub mod local_time;
pub mod sections;

use std::fmt::Display;

use chrono::TimeZone;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::chart::{ChartConfig, ColorSource, LapSeries, build_lap_series, series_label};
use crate::laps::{
    COL_ALTITUDE_DELTA_FORMATTED, COL_ALTITUDE_DELTA_M, COL_ALTITUDE_FORMATTED, COL_ALTITUDE_M,
    COL_DISTANCE_FORMATTED, COL_DISTANCE_M, COL_LAP_DISTANCE_FORMATTED, COL_LAP_DISTANCE_M,
    COL_LAP_NUMBER, COL_LAP_START_TIME, COL_LAP_START_TIME_LOCAL, COL_LAP_TOTAL_TIME_FORMATTED,
    COL_LAP_TOTAL_TIME_S, COL_LATITUDE, COL_LONGITUDE, COL_PACE_MIN_PER_KM, COL_TIME,
    COL_TIME_LOCAL, GroupedLaps, LapRecord, group_by_source, leading_int,
};
use format::{
    format_altitude, format_distance, format_duration, format_seconds_to_hms, friendly_column_name,
};
use local_time::to_local_display;
use sections::{DETAILED_DATA_TITLE, SectionBoard, detail_section_id};

/// Laps shorter than this are left out of records and valid-lap tables
pub const MIN_VALID_LAP_DISTANCE_M: f64 = 990.;
/// Keep one detailed row out of this many
pub const DETAILED_SAMPLE_INTERVAL: usize = 60;

const LAP_TABLE_FIELDS: [&str; 6] = [
    COL_LAP_NUMBER,
    COL_LAP_START_TIME,
    COL_LAP_DISTANCE_M,
    COL_LAP_TOTAL_TIME_S,
    COL_PACE_MIN_PER_KM,
    COL_ALTITUDE_DELTA_M,
];
const DETAILED_TABLE_FIELDS: [&str; 6] = [
    COL_LAP_NUMBER,
    COL_TIME,
    COL_DISTANCE_M,
    COL_ALTITUDE_M,
    COL_LATITUDE,
    COL_LONGITUDE,
];

/// Table column: the record field and its header text
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    pub field: String,
    pub header: String,
}

pub fn table_columns(fields: &[&str]) -> Vec<Column> {
    fields
        .iter()
        .map(|field| Column {
            field: field.to_string(),
            header: friendly_column_name(field).to_string(),
        })
        .collect()
}

/// Tick and tooltip text of one chart series, one entry per point
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesTimes {
    pub label: String,
    pub times: Vec<String>,
}

fn seconds_text(seconds: f64) -> String {
    match Number::from_f64(seconds) {
        Some(n) => format_seconds_to_hms(&Value::Number(n)),
        // NaN and infinities are not JSON numbers
        None => seconds.to_string(),
    }
}

/// `HH:MM:SS` text for the y value of every point
pub fn series_times(series: &[LapSeries]) -> Vec<SeriesTimes> {
    series
        .iter()
        .map(|s| SeriesTimes {
            label: s.label.clone(),
            times: s.data.iter().map(|p| seconds_text(p.y)).collect(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileSummary {
    pub source: String,
    pub date: String,
    pub total_distance: f64,
    pub total_distance_formatted: String,
    pub total_time: f64,
    pub total_time_formatted: String,
}

impl FileSummary {
    pub fn new(source: &str, total_distance: f64, total_time: f64) -> Self {
        Self {
            source: source.to_string(),
            date: series_label(source).to_string(),
            total_distance,
            total_distance_formatted: format_distance(&Value::from(total_distance)),
            total_time,
            total_time_formatted: format_duration(&Value::from(total_time)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileSummaries {
    pub summaries: Vec<FileSummary>,
    pub all_laps: GroupedLaps,
    /// Laps of each source at least the minimum valid distance long
    pub valid_laps: GroupedLaps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardRecords {
    pub fastest_lap: Option<LapRecord>,
    pub slowest_lap: Option<LapRecord>,
    pub longest_distance: Option<FileSummary>,
    pub longest_time: Option<FileSummary>,
}

/// Groups stored summary rows by source and adds the formatted lap time to
/// rows that have one
pub fn format_summary_rows(rows: impl IntoIterator<Item = LapRecord>) -> GroupedLaps {
    let mut grouped = group_by_source(rows);
    for (_, rows) in grouped.iter_mut() {
        for row in rows.iter_mut() {
            if let Some(time) = row.get(COL_LAP_TOTAL_TIME_S) {
                let formatted = format_duration(time);
                row.insert(COL_LAP_TOTAL_TIME_FORMATTED, formatted);
            }
        }
    }
    grouped
}

/// Totals per source. Distances and times that cannot be read count as 0.
pub fn calculate_file_summaries(
    grouped: &GroupedLaps,
    min_valid_lap_distance: f64,
) -> FileSummaries {
    let mut result = FileSummaries::default();
    for (source, laps) in grouped.iter() {
        let total_distance: f64 = laps
            .iter()
            .filter_map(|l| l.number(COL_LAP_DISTANCE_M))
            .sum();
        let total_time: f64 = laps
            .iter()
            .filter_map(|l| l.number(COL_LAP_TOTAL_TIME_S))
            .sum();
        result
            .summaries
            .push(FileSummary::new(source, total_distance, total_time));

        let valid = laps
            .iter()
            .filter(|l| {
                l.number(COL_LAP_DISTANCE_M)
                    .is_some_and(|d| d >= min_valid_lap_distance)
            })
            .cloned()
            .collect();
        result.all_laps.insert(source, laps.to_vec());
        result.valid_laps.insert(source, valid);
    }
    debug!("Summarized {} source files", result.summaries.len());
    result
}

/// Largest item by `key`, the earliest one on ties
fn first_max_by<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> f64) -> Option<T> {
    items.into_iter().fold(None, |best, item| match best {
        Some(best) if key(&best) >= key(&item) => Some(best),
        _ => Some(item),
    })
}

/// Fastest and slowest full-length laps, and the files with the longest
/// distance and time. Ties go to the first candidate.
pub fn find_records<'a>(
    laps: impl IntoIterator<Item = &'a LapRecord>,
    summaries: &[FileSummary],
    min_valid_lap_distance: f64,
) -> DashboardRecords {
    let timed_laps = laps
        .into_iter()
        .filter(|l| {
            l.number(COL_LAP_DISTANCE_M)
                .is_some_and(|d| d >= min_valid_lap_distance)
        })
        .filter_map(|l| {
            l.number(COL_LAP_TOTAL_TIME_S)
                .filter(|t| *t > 0.)
                .map(|t| (t, l))
        })
        .collect_vec();

    let fastest_lap = timed_laps
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, l)| LapRecord::clone(l));
    let slowest_lap = first_max_by(&timed_laps, |(t, _)| *t).map(|(_, l)| LapRecord::clone(l));
    let longest_distance = first_max_by(
        summaries.iter().filter(|s| s.total_distance > 0.),
        |s| s.total_distance,
    )
    .cloned();
    let longest_time =
        first_max_by(summaries.iter().filter(|s| s.total_time > 0.), |s| s.total_time).cloned();

    DashboardRecords {
        fastest_lap,
        slowest_lap,
        longest_distance,
        longest_time,
    }
}

/// Adds the net altitude change of each summary lap, taken from the detailed
/// points of the same source and lap number in time order.
pub fn apply_altitude_deltas(summary: &mut GroupedLaps, detailed: &GroupedLaps) {
    for (source, laps) in summary.iter_mut() {
        let points = detailed.get(source).unwrap_or(&[]);
        for lap in laps.iter_mut() {
            let lap_no = lap.get(COL_LAP_NUMBER).and_then(leading_int);
            let altitudes = points
                .iter()
                .filter(|p| {
                    lap_no.is_some() && p.get(COL_LAP_NUMBER).and_then(leading_int) == lap_no
                })
                .sorted_by(|a, b| {
                    let a = a.get(COL_TIME).and_then(Value::as_str).unwrap_or("");
                    let b = b.get(COL_TIME).and_then(Value::as_str).unwrap_or("");
                    a.cmp(b)
                })
                .filter_map(|p| p.number(COL_ALTITUDE_M))
                .collect_vec();
            let delta: f64 = altitudes.windows(2).map(|w| w[1] - w[0]).sum();

            let formatted = format_altitude(&Value::from(delta));
            lap.insert(COL_ALTITUDE_DELTA_M, delta);
            lap.insert(COL_ALTITUDE_DELTA_FORMATTED, formatted);
        }
    }
}

/// Keeps the first row of each source and then every row at least
/// `interval` rows after the last kept one, adding formatted distances.
pub fn sample_detailed_rows(grouped: &GroupedLaps, interval: usize) -> GroupedLaps {
    grouped
        .iter()
        .map(|(source, rows)| {
            let mut kept = Vec::new();
            let mut last: Option<usize> = None;
            for (idx, row) in rows.iter().enumerate() {
                if last.is_some_and(|l| idx - l < interval) {
                    continue;
                }
                last = Some(idx);
                let mut row = row.clone();
                let null = Value::Null;
                let lap_distance = format_distance(row.get(COL_LAP_DISTANCE_M).unwrap_or(&null));
                let distance = format_distance(row.get(COL_DISTANCE_M).unwrap_or(&null));
                let altitude = format_altitude(row.get(COL_ALTITUDE_M).unwrap_or(&null));
                row.insert(COL_LAP_DISTANCE_FORMATTED, lap_distance);
                row.insert(COL_DISTANCE_FORMATTED, distance);
                row.insert(COL_ALTITUDE_FORMATTED, altitude);
                kept.push(row);
            }
            (source.to_string(), kept)
        })
        .collect()
}

/// Writes the `tz` display text of the string field `field` to `target`
pub fn apply_local_times<Tz: TimeZone>(
    grouped: &mut GroupedLaps,
    field: &str,
    target: &str,
    tz: &Tz,
) where
    Tz::Offset: Display,
{
    for (_, rows) in grouped.iter_mut() {
        for row in rows.iter_mut() {
            if let Some(text) = row.get(field).and_then(Value::as_str) {
                let local = to_local_display(text, tz);
                row.insert(target, local);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashboardSettings {
    pub min_valid_lap_distance_m: f64,
    pub detailed_sample_interval: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            min_valid_lap_distance_m: MIN_VALID_LAP_DISTANCE_M,
            detailed_sample_interval: DETAILED_SAMPLE_INTERVAL,
        }
    }
}

/// Everything the dashboard page shows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub chart: ChartConfig,
    pub chart_times: Vec<SeriesTimes>,
    pub summaries: Vec<FileSummary>,
    pub records: DashboardRecords,
    pub laps: GroupedLaps,
    pub valid_laps: GroupedLaps,
    pub detailed: GroupedLaps,
    pub lap_columns: Vec<Column>,
    pub detailed_columns: Vec<Column>,
    pub sections: SectionBoard,
}

impl Dashboard {
    /// Dates and times are shown in `tz`
    pub fn build<Tz: TimeZone>(
        summary_rows: Vec<LapRecord>,
        detailed: &GroupedLaps,
        settings: DashboardSettings,
        colors: &mut dyn ColorSource,
        tz: &Tz,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        let mut laps = format_summary_rows(summary_rows);
        apply_altitude_deltas(&mut laps, detailed);
        apply_local_times(&mut laps, COL_LAP_START_TIME, COL_LAP_START_TIME_LOCAL, tz);

        let series = build_lap_series(&laps, colors);
        let chart_times = series_times(&series);
        let chart = ChartConfig::lap_chart(series);
        let file_summaries = calculate_file_summaries(&laps, settings.min_valid_lap_distance_m);
        let records = find_records(
            laps.records(),
            &file_summaries.summaries,
            settings.min_valid_lap_distance_m,
        );

        let mut sections = SectionBoard::new();
        sections.add(Some("summary"), "Summary", true);
        sections.add(Some("chart"), "Chart", true);
        sections.add(Some("detailed-data"), DETAILED_DATA_TITLE, false);
        for summary in &file_summaries.summaries {
            let id = detail_section_id(&summary.date);
            sections.add(Some(id.as_str()), &summary.date, false);
        }

        let mut detailed = sample_detailed_rows(detailed, settings.detailed_sample_interval);
        apply_local_times(&mut detailed, COL_TIME, COL_TIME_LOCAL, tz);

        Self {
            chart,
            chart_times,
            records,
            summaries: file_summaries.summaries,
            laps,
            valid_laps: file_summaries.valid_laps,
            detailed,
            lap_columns: table_columns(&LAP_TABLE_FIELDS),
            detailed_columns: table_columns(&DETAILED_TABLE_FIELDS),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{FixedColor, SeriesPoint};
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn records(value: Value) -> Vec<LapRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn grouped(value: Value) -> GroupedLaps {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_summary_rows() {
        let result = format_summary_rows(records(json!([
            {"_source_file": "run1.tcx", "LapTotalTime_s": 600, "LapDistance_m": 1000},
            {"_source_file": "run2.tcx", "LapTotalTime_s": null, "LapDistance_m": "invalid"},
            {"_source_file": "run2.tcx", "LapDistance_m": 10}
        ])));
        let run1 = result.get("run1.tcx").unwrap();
        assert_eq!(run1.len(), 1);
        assert_eq!(run1[0].get(COL_LAP_TOTAL_TIME_FORMATTED), Some(&json!("0:10:00")));
        let run2 = result.get("run2.tcx").unwrap();
        assert_eq!(run2[0].get(COL_LAP_TOTAL_TIME_FORMATTED), Some(&json!("00:00:00")));
        assert!(!run2[1].contains(COL_LAP_TOTAL_TIME_FORMATTED));
    }

    #[test]
    fn test_calculate_file_summaries() {
        let data = grouped(json!({
            "test1_2024-01-15.tcx": [
                {"LapDistance_m": 1000, "LapTotalTime_s": 300},
                {"LapDistance_m": 500, "LapTotalTime_s": 150}
            ],
            "test2.tcx": [{"LapDistance_m": 2000, "LapTotalTime_s": 600}]
        }));
        let result = calculate_file_summaries(&data, MIN_VALID_LAP_DISTANCE_M);
        assert_eq!(result.summaries.len(), 2);

        let first = &result.summaries[0];
        assert_eq!(first.date, "2024-01-15");
        assert_eq!(first.total_distance, 1500.);
        assert_eq!(first.total_distance_formatted, "1.50 km");
        assert_eq!(first.total_time, 450.);
        assert_eq!(first.total_time_formatted, "0:07:30");
        assert_eq!(result.summaries[1].date, "test2.tcx");

        assert_eq!(result.all_laps.get("test1_2024-01-15.tcx").unwrap().len(), 2);
        assert_eq!(result.valid_laps.get("test1_2024-01-15.tcx").unwrap().len(), 1);
        assert_eq!(result.valid_laps.get("test2.tcx").unwrap().len(), 1);
    }

    #[test]
    fn test_calculate_file_summaries_invalid_data() {
        let data = grouped(json!({
            "test.tcx": [
                {"LapDistance_m": "invalid", "LapTotalTime_s": null},
                {"LapDistance_m": null, "LapTotalTime_s": "invalid"}
            ]
        }));
        let result = calculate_file_summaries(&data, MIN_VALID_LAP_DISTANCE_M);
        assert_eq!(result.summaries.len(), 1);
        assert_eq!(result.summaries[0].total_distance, 0.);
        assert_eq!(result.summaries[0].total_time, 0.);
        assert!(result.valid_laps.get("test.tcx").unwrap().is_empty());
    }

    #[test]
    fn test_find_records() {
        let laps = records(json!([
            {"LapDistance_m": 1000, "LapTotalTime_s": 300, "_source_file": "test1.tcx"},
            {"LapDistance_m": 1000, "LapTotalTime_s": 250, "_source_file": "test2.tcx"},
            {"LapDistance_m": 1000, "LapTotalTime_s": 400, "_source_file": "test3.tcx"},
            {"LapDistance_m": 500, "LapTotalTime_s": 200, "_source_file": "test4.tcx"},
            {"LapDistance_m": 1000, "LapTotalTime_s": 0, "_source_file": "test5.tcx"}
        ]));
        let summaries = vec![
            FileSummary::new("a.tcx", 2000., 600.),
            FileSummary::new("b.tcx", 3000., 800.),
            FileSummary::new("c.tcx", 1500., 900.),
        ];
        let result = find_records(&laps, &summaries, MIN_VALID_LAP_DISTANCE_M);
        assert_eq!(result.fastest_lap.unwrap().source(), Some("test2.tcx"));
        assert_eq!(result.slowest_lap.unwrap().source(), Some("test3.tcx"));
        assert_eq!(result.longest_distance.unwrap().source, "b.tcx");
        assert_eq!(result.longest_time.unwrap().source, "c.tcx");
    }

    #[test]
    fn test_find_records_ties_go_to_first() {
        let laps = records(json!([
            {"LapDistance_m": 1000, "LapTotalTime_s": 300, "_source_file": "first.tcx"},
            {"LapDistance_m": 1000, "LapTotalTime_s": 300, "_source_file": "second.tcx"}
        ]));
        let result = find_records(&laps, &[], MIN_VALID_LAP_DISTANCE_M);
        assert_eq!(result.fastest_lap.unwrap().source(), Some("first.tcx"));
        assert_eq!(result.slowest_lap.unwrap().source(), Some("first.tcx"));
    }

    #[test]
    fn test_find_records_empty_and_invalid() {
        assert_eq!(
            find_records(std::iter::empty(), &[], MIN_VALID_LAP_DISTANCE_M),
            DashboardRecords::default()
        );

        let laps = records(json!([
            {"LapDistance_m": "invalid", "LapTotalTime_s": "invalid"},
            {"LapDistance_m": null, "LapTotalTime_s": null}
        ]));
        let summaries = vec![FileSummary::new("x.tcx", 0., 0.)];
        assert_eq!(
            find_records(&laps, &summaries, MIN_VALID_LAP_DISTANCE_M),
            DashboardRecords::default()
        );
    }

    #[test]
    fn test_apply_altitude_deltas() {
        let mut summary = grouped(json!({
            "test.tcx": [
                {"LapNumber": 1, "LapDistance_m": 1000},
                {"LapNumber": 2, "LapDistance_m": 1000},
                {"LapNumber": 3, "LapDistance_m": 1000}
            ]
        }));
        let detailed = grouped(json!({
            "test.tcx": [
                {"LapNumber": 1, "Altitude_m": 110, "Time": "10:00:01"},
                {"LapNumber": 1, "Altitude_m": 100, "Time": "10:00:00"},
                {"LapNumber": 1, "Altitude_m": 130, "Time": "10:00:02"},
                {"LapNumber": 1, "Altitude_m": 105, "Time": "10:00:03"},
                {"LapNumber": 2, "Altitude_m": 105, "Time": "10:01:00"},
                {"LapNumber": 2, "Altitude_m": 95.5, "Time": "10:02:00"}
            ]
        }));
        apply_altitude_deltas(&mut summary, &detailed);

        let laps = summary.get("test.tcx").unwrap();
        assert_eq!(laps[0].number(COL_ALTITUDE_DELTA_M), Some(5.));
        assert_eq!(laps[0].get(COL_ALTITUDE_DELTA_FORMATTED), Some(&json!("5.00 m")));
        assert_eq!(laps[1].number(COL_ALTITUDE_DELTA_M), Some(-9.5));
        assert_eq!(laps[2].number(COL_ALTITUDE_DELTA_M), Some(0.));
    }

    #[test]
    fn test_sample_detailed_rows() {
        let rows: Vec<Value> = (0..120)
            .map(|i| json!({"LapNumber": 1, "Distance_m": i * 10, "Altitude_m": 100}))
            .collect();
        let data = grouped(json!({"a.tcx": rows, "b.tcx": [{"LapDistance_m": 1000}]}));

        let sampled = sample_detailed_rows(&data, DETAILED_SAMPLE_INTERVAL);
        let a = sampled.get("a.tcx").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].get(COL_DISTANCE_M), Some(&json!(600)));
        assert_eq!(a[1].get(COL_DISTANCE_FORMATTED), Some(&json!("600.00 m")));
        assert_eq!(a[0].get(COL_LAP_DISTANCE_FORMATTED), Some(&json!("0.00 m")));
        assert_eq!(a[0].get(COL_ALTITUDE_FORMATTED), Some(&json!("100.00 m")));

        let b = sampled.get("b.tcx").unwrap();
        assert_eq!(b[0].get(COL_LAP_DISTANCE_FORMATTED), Some(&json!("1.00 km")));

        assert_eq!(sample_detailed_rows(&data, 0).get("a.tcx").unwrap().len(), 120);
    }

    #[test]
    fn test_dashboard_build() {
        let summary_rows = records(json!([
            {"_source_file": "run_2025-08-05.tcx", "LapNumber": 2,
             "LapDistance_m": 1000, "LapTotalTime_s": 610},
            {"_source_file": "run_2025-08-05.tcx", "LapNumber": 1,
             "LapDistance_m": 1000, "LapTotalTime_s": 300},
            {"_source_file": "run_2025-08-06.tcx", "LapNumber": 1,
             "LapDistance_m": 995, "LapTotalTime_s": 280}
        ]));
        let detailed = grouped(json!({
            "run_2025-08-05.tcx": [
                {"LapNumber": 1, "Altitude_m": 100, "Time": "a"},
                {"LapNumber": 1, "Altitude_m": 104, "Time": "b"}
            ]
        }));
        let dashboard = Dashboard::build(
            summary_rows,
            &detailed,
            DashboardSettings::default(),
            &mut FixedColor("#ff0000".to_string()),
            &Utc,
        );

        let series = &dashboard.chart.data.datasets;
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "2025-08-05");
        assert_eq!(series[0].data[1].x, 2000.);
        assert_eq!(series[0].data[1].y, 610.);

        assert_eq!(dashboard.summaries[0].total_time, 910.);
        let fastest = dashboard.records.fastest_lap.as_ref().unwrap();
        assert_eq!(fastest.number(COL_LAP_TOTAL_TIME_S), Some(280.));
        let longest = dashboard.records.longest_distance.as_ref().unwrap();
        assert_eq!(longest.source, "run_2025-08-05.tcx");
        assert_eq!(dashboard.chart_times[0].times, vec!["00:05:00", "00:10:10"]);

        let first_laps = dashboard.laps.get("run_2025-08-05.tcx").unwrap();
        assert_eq!(first_laps[1].number(COL_ALTITUDE_DELTA_M), Some(4.));
        assert_eq!(first_laps[0].number(COL_ALTITUDE_DELTA_M), Some(0.));

        assert!(dashboard.sections.by_id("summary").unwrap().view.is_open());
        assert!(!dashboard.sections.by_id("detail-20250806").unwrap().view.is_open());
        assert_eq!(dashboard.detailed.get("run_2025-08-05.tcx").unwrap().len(), 1);
    }

    #[test]
    fn test_dashboard_shows_times_in_viewer_zone() {
        let summary_rows = records(json!([
            {"_source_file": "a.tcx", "LapNumber": 1, "LapStartTime": "2025-08-05T22:30:00Z",
             "LapDistance_m": 1000, "LapTotalTime_s": 3725},
            {"_source_file": "a.tcx", "LapNumber": 2, "LapStartTime": null,
             "LapDistance_m": 1000, "LapTotalTime_s": 3800}
        ]));
        let detailed = grouped(json!({
            "a.tcx": [
                {"LapNumber": 1, "Time": "2025-08-05T22:00:00Z"},
                {"LapNumber": 1, "Time": "soon"}
            ]
        }));
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let settings = DashboardSettings {
            detailed_sample_interval: 1,
            ..Default::default()
        };
        let dashboard = Dashboard::build(
            summary_rows,
            &detailed,
            settings,
            &mut FixedColor("#000000".to_string()),
            &plus_two,
        );

        let laps = dashboard.laps.get("a.tcx").unwrap();
        assert_eq!(
            laps[0].get(COL_LAP_START_TIME_LOCAL),
            Some(&json!("8/6/2025, 12:30:00 AM"))
        );
        assert!(!laps[1].contains(COL_LAP_START_TIME_LOCAL));

        let rows = dashboard.detailed.get("a.tcx").unwrap();
        assert_eq!(rows[0].get(COL_TIME_LOCAL), Some(&json!("8/6/2025")));
        assert_eq!(rows[1].get(COL_TIME_LOCAL), Some(&json!("soon")));

        assert_eq!(dashboard.chart_times[0].times, vec!["01:02:05", "01:03:20"]);
        assert_eq!(
            dashboard.lap_columns[0],
            Column {
                field: "LapNumber".to_string(),
                header: "Lap".to_string()
            }
        );
        let headers: Vec<&str> = dashboard
            .detailed_columns
            .iter()
            .map(|c| c.header.as_str())
            .collect();
        assert_eq!(
            headers,
            vec!["Lap", "Time", "Distance", "Altitude", "Latitude", "Longitude"]
        );

        let value = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(value["lap_columns"][3]["header"], "Lap Time");
        assert_eq!(value["chart_times"][0]["label"], "a.tcx");
    }

    #[test]
    fn test_series_times_keep_nan_visible() {
        let series = vec![LapSeries {
            label: "a".to_string(),
            data: vec![SeriesPoint { x: 1., y: 59.9 }, SeriesPoint { x: 2., y: f64::NAN }],
            fill: false,
            border_color: "#000000".to_string(),
            tension: 0.2,
        }];
        assert_eq!(series_times(&series)[0].times, vec!["00:00:59", "NaN"]);
    }
}
