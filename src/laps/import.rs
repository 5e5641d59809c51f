use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{
    store::{Collection, LapStore, source_name},
    tcx::parse_tcx_file,
};
use crate::errors::LaptrackError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ExportMode {
    Summary,
    Detailed,
    #[default]
    Both,
}

impl ExportMode {
    fn collections(&self) -> &'static [Collection] {
        match self {
            Self::Summary => &[Collection::Summary],
            Self::Detailed => &[Collection::Detailed],
            Self::Both => &[Collection::Summary, Collection::Detailed],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportReport {
    pub source: String,
    /// Date of the first lap, or `UnknownDate`
    pub date: String,
    pub summary_records: usize,
    pub detailed_records: usize,
}

/// Resolves an input path to the activity files it names: the file itself,
/// or every `.tcx` file (any case) directly inside a folder, sorted by name.
pub fn discover_activity_files(input: &Path) -> Result<Vec<PathBuf>, LaptrackError> {
    if !input.exists() {
        return Err(LaptrackError::MissingInputPath {
            path: input.to_path_buf(),
        });
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let entries = fs::read_dir(input).map_err(|e| LaptrackError::ActivityDirError {
        path: input.to_path_buf(),
        source: e,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| LaptrackError::ActivityDirError {
                path: input.to_path_buf(),
                source: e,
            })?
            .path();
        let is_tcx = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("tcx"));
        if is_tcx && path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(LaptrackError::NoActivityFiles {
            path: input.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Parses one activity file and stores its records in the collections the
/// mode selects.
pub fn import_activity(
    path: &Path,
    mode: ExportMode,
    store: &mut impl LapStore,
) -> Result<ImportReport, LaptrackError> {
    info!("Processing {:?}", path);
    let activity = parse_tcx_file(path)?;
    let source = source_name(path);
    if activity.laps.is_empty() {
        warn!("No laps found in {:?}", path);
    }

    let mut report = ImportReport {
        source: source.clone(),
        date: activity.first_lap_date(),
        summary_records: 0,
        detailed_records: 0,
    };
    for collection in mode.collections() {
        let records = match collection {
            Collection::Summary => activity.summary_records(),
            Collection::Detailed => activity.detailed_records(),
        };
        match collection {
            Collection::Summary => report.summary_records = records.len(),
            Collection::Detailed => report.detailed_records = records.len(),
        }
        store.save_records(*collection, &source, records)?;
    }
    Ok(report)
}

/// Imports every activity file found under `input`
pub fn import_path(
    input: &Path,
    mode: ExportMode,
    store: &mut impl LapStore,
) -> Result<Vec<ImportReport>, LaptrackError> {
    discover_activity_files(input)?
        .iter()
        .map(|path| import_activity(path, mode, store))
        .collect()
}
