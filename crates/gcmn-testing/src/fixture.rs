//! Temporary storage fixtures.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A scratch directory holding one document-store data file.
///
/// The directory is removed when the fixture drops; keep it alive for the
/// whole test.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the data file inside the scratch directory.
    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("data.json")
    }

    /// Path of a SQLite database inside the scratch directory, as a connection URL.
    pub fn sqlite_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.dir.path().join("library.db").display())
    }

    /// Write raw JSON to the data file before a store opens it.
    pub fn seed(&self, document: &Value) {
        std::fs::write(self.data_file(), serde_json::to_vec_pretty(document).unwrap()).unwrap();
    }

    /// Parse the data file as currently written to disk.
    pub fn read_document(&self) -> Value {
        let bytes = std::fs::read(self.data_file()).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new()
    }
}
