// Error types for laptrack

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum LaptrackError {
    // Errors while reading activity files
    #[snafu(display("Input path does not exist: {path:?}"))]
    MissingInputPath { path: PathBuf },
    #[snafu(display("No .tcx files found in folder {path:?}"))]
    NoActivityFiles { path: PathBuf },
    #[snafu(display("Cannot access directory {path:?}"))]
    ActivityDirError { path: PathBuf, source: io::Error },
    #[snafu(display("Error reading activity file {path:?}"))]
    ActivityReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Invalid XML file: {reason}"))]
    InvalidActivityXml { reason: String },

    // Lap store errors
    #[snafu(display("Error creating lap store directory {path:?}"))]
    StoreDirError { path: PathBuf, source: io::Error },
    #[snafu(display("Error reading lap store {path:?}"))]
    StoreReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Error writing lap store {path:?}"))]
    StoreWriteError { path: PathBuf, source: io::Error },
    #[snafu(display("Lap record is not a JSON object"))]
    InvalidLapRecord,

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error parsing or serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Output errors
    #[snafu(display("Error serializing dashboard output"))]
    OutputSerializeError { source: serde_json::Error },
}
