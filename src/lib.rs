// Library interface for laptrack
// This allows integration tests to access internal modules

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod laps;

// Re-export commonly used types
pub use chart::{ChartConfig, ColorMode, ColorSource, LapSeries, SeriesPoint, build_lap_series};
pub use config::{AppConfig, ConfigUpdate};
pub use dashboard::{Dashboard, DashboardRecords, DashboardSettings, FileSummary};
pub use errors::LaptrackError;
pub use laps::{
    GroupedLaps, LapRecord,
    import::{ExportMode, ImportReport, import_path},
    store::{Collection, FileBasedStore, LapStore},
};
