// Chart series for the lap time vs. cumulative distance plot

pub mod color;

use std::cmp::Ordering;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

use crate::laps::{
    COL_LAP_DISTANCE_M, COL_LAP_NUMBER, COL_LAP_TOTAL_TIME_S, GroupedLaps, LapRecord, is_truthy,
    leading_float, leading_int,
};
pub use color::{ColorMode, ColorSource, FixedColor, KeyHashColor, RandomColor};

pub const CHART_TITLE: &str = "Total Run Distance vs. Lap Time (HH:mm:ss)";
pub const X_AXIS_TITLE: &str = "Total Run Distance (m)";
pub const Y_AXIS_TITLE: &str = "Lap Time (HH:mm:ss)";
pub const LINE_TENSION: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Distance covered up to the end of the lap, meters
    pub x: f64,
    /// Total elapsed time of the lap, seconds
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LapSeries {
    pub label: String,
    pub data: Vec<SeriesPoint>,
    pub fill: bool,
    pub border_color: String,
    pub tension: f64,
}

/// Date (`YYYY-MM-DD`) embedded in a source key, or the key itself
pub fn series_label(source: &str) -> &str {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| {
        Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("Invalid date label regex")
    });
    re.find(source).map(|m| m.as_str()).unwrap_or(source)
}

/// NaN lap numbers go after every numeric one
fn compare_lap_numbers(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Points of one source: plottable laps ordered by lap number, x the running
/// distance total and y the lap's own total time.
pub fn lap_points(laps: &[LapRecord]) -> Vec<SeriesPoint> {
    let mut cum_dist = 0.;
    laps.iter()
        .filter(|lap| {
            is_truthy(lap.get(COL_LAP_DISTANCE_M)) && is_truthy(lap.get(COL_LAP_TOTAL_TIME_S))
        })
        .map(|lap| (lap.get(COL_LAP_NUMBER).and_then(leading_int), lap))
        .sorted_by(|(a, _), (b, _)| compare_lap_numbers(*a, *b))
        .map(|(_, lap)| {
            let distance = lap.get(COL_LAP_DISTANCE_M).map_or(f64::NAN, leading_float);
            cum_dist += distance;
            SeriesPoint {
                x: cum_dist,
                y: lap.get(COL_LAP_TOTAL_TIME_S).map_or(f64::NAN, leading_float),
            }
        })
        .collect()
}

/// One series per source, in the order the sources were grouped. The input
/// is never modified.
pub fn build_lap_series(grouped: &GroupedLaps, colors: &mut dyn ColorSource) -> Vec<LapSeries> {
    grouped
        .iter()
        .map(|(source, laps)| LapSeries {
            label: series_label(source).to_string(),
            data: lap_points(laps),
            fill: false,
            border_color: colors.color_for(source),
            tension: LINE_TENSION,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: AxisTitle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    pub datasets: Vec<LapSeries>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPlugins {
    pub title: AxisTitle,
    pub legend: Legend,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub plugins: ChartPlugins,
    pub scales: Scales,
}

/// Line chart configuration handed to the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

fn title(text: &str) -> AxisTitle {
    AxisTitle {
        display: true,
        text: text.to_string(),
    }
}

impl ChartConfig {
    pub fn lap_chart(datasets: Vec<LapSeries>) -> Self {
        Self {
            kind: "line".to_string(),
            data: ChartData { datasets },
            options: ChartOptions {
                responsive: true,
                plugins: ChartPlugins {
                    title: title(CHART_TITLE),
                    legend: Legend { display: true },
                },
                scales: Scales {
                    x: Axis {
                        kind: Some("linear".to_string()),
                        title: title(X_AXIS_TITLE),
                    },
                    y: Axis {
                        kind: None,
                        title: title(Y_AXIS_TITLE),
                    },
                },
            },
        }
    }
}
