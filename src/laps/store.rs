// Storage implementation for imported lap records

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{COL_SOURCE_FILE, GroupedLaps, LapRecord, group_by_source};
use crate::errors::LaptrackError;

/// Name used instead of source file names that look like path traversal
pub const SANITIZED_SOURCE_NAME: &str = "sanitized_file.tcx";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    /// One record per lap
    Summary,
    /// One record per trackpoint
    Detailed,
}

impl Collection {
    fn file_name(&self) -> &'static str {
        match self {
            Self::Summary => "summary.jsonl",
            Self::Detailed => "detailed.jsonl",
        }
    }
}

/// Trait defining the interface for lap record storage operations
pub trait LapStore {
    /// Replace every record of `source` in `collection` with `records`
    fn save_records(
        &mut self,
        collection: Collection,
        source: &str,
        records: Vec<LapRecord>,
    ) -> Result<(), LaptrackError>;

    /// Load all records of `collection` grouped by source file
    fn load_grouped(&self, collection: Collection) -> Result<GroupedLaps, LaptrackError>;
}

/// JSON-lines implementation of the lap store, one file per collection
pub struct FileBasedStore {
    store_path: PathBuf,
}

impl FileBasedStore {
    /// Create a store rooted at `store_path`, creating the directory if needed
    pub fn new(store_path: PathBuf) -> Result<Self, LaptrackError> {
        if !store_path.exists() {
            fs::create_dir_all(&store_path).map_err(|e| LaptrackError::StoreDirError {
                path: store_path.clone(),
                source: e,
            })?;
        }
        Ok(Self { store_path })
    }

    /// Get the default storage path for lap records
    pub fn default_store_path() -> Result<PathBuf, LaptrackError> {
        let app_data_dir = dirs::data_dir().ok_or(LaptrackError::NoConfigDir)?;
        Ok(app_data_dir.join("laptrack").join("store"))
    }

    pub fn path(&self) -> &Path {
        &self.store_path
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.store_path.join(collection.file_name())
    }

    fn read_collection(&self, collection: Collection) -> Result<Vec<LapRecord>, LaptrackError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            debug!("Collection file does not exist yet: {:?}", path);
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines::<LapRecord, _>(&path)
            .and_then(|lines| lines.collect::<Result<Vec<_>, _>>())
            .map_err(|e| LaptrackError::StoreReadError { path, source: e })
    }
}

impl LapStore for FileBasedStore {
    fn save_records(
        &mut self,
        collection: Collection,
        source: &str,
        records: Vec<LapRecord>,
    ) -> Result<(), LaptrackError> {
        let mut stored = self.read_collection(collection)?;
        let before = stored.len();
        stored.retain(|r| r.source() != Some(source));
        let replaced = before - stored.len();

        let added = records.len();
        stored.extend(records.into_iter().map(|mut r| {
            r.insert(COL_SOURCE_FILE, source);
            r
        }));

        let path = self.collection_path(collection);
        // readers see the old file or the new one, never a partial write
        let tmp_path = self.store_path.join(format!("{}.tmp", collection.file_name()));
        serde_jsonlines::write_json_lines(&tmp_path, &stored)
            .and_then(|()| fs::rename(&tmp_path, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                LaptrackError::StoreWriteError {
                    path: path.clone(),
                    source: e,
                }
            })?;
        info!(
            "Stored {} {:?} records for {} (replaced {})",
            added, collection, source, replaced
        );
        Ok(())
    }

    fn load_grouped(&self, collection: Collection) -> Result<GroupedLaps, LaptrackError> {
        Ok(group_by_source(self.read_collection(collection)?))
    }
}

/// Source key for an imported file: its base name, unless that looks like a
/// traversal attempt
pub fn source_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() || name.contains("..") || name.starts_with('/') || name.starts_with('\\')
    {
        SANITIZED_SOURCE_NAME.to_string()
    } else {
        name
    }
}
