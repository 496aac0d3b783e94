//! JSON file persistence backend for host builds.
//!
//! Persist requests only mark the backend dirty. The owner writes the store's
//! current value with [`JsonFileBackend::flush`], which reads the file back
//! to verify the write.
//!
//! # Usage
//!
//! ```ignore
//! use softap_config::store::{ConfigurationStore, DataSource, JsonFileBackend};
//!
//! let mut store = ConfigurationStore::with_os_rng(JsonFileBackend::new(path), profile, None);
//! let snapshot = store.serialize();
//! store.backend_mut().flush(&snapshot)?;
//! ```

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{PersistenceBackend, StoreError};
use crate::softap::SoftApConfiguration;

/// Stores the configuration as pretty-printed JSON in one file.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    source: Option<&'static str>,
    dirty: bool,
    backup_changes: u64,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: None,
            dirty: false,
            backup_changes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the registered data source, if any.
    pub fn source(&self) -> Option<&'static str> {
        self.source
    }

    /// True if a persist request has not been flushed yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of backup-changed notifications received.
    pub fn backup_changes(&self) -> u64 {
        self.backup_changes
    }

    /// Write `snapshot` if a persist request is pending.
    ///
    /// Returns true if the file was written.
    pub fn flush(&mut self, snapshot: &SoftApConfiguration) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        let json = serde_json::to_string_pretty(snapshot).map_err(StoreError::Format)?;
        fs::write(&self.path, &json).map_err(StoreError::Io)?;

        // Verify write by reading back
        let read_back = fs::read_to_string(&self.path).map_err(StoreError::Io)?;
        if read_back != json {
            return Err(StoreError::VerificationFailed);
        }

        self.dirty = false;
        info!("Access point configuration saved to {:?}", self.path);
        Ok(true)
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn register_data_source(&mut self, name: &'static str) {
        debug!("Registered data source {} for {:?}", name, self.path);
        self.source = Some(name);
    }

    fn load(&mut self) -> Result<Option<SoftApConfiguration>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored configuration at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let config = serde_json::from_str(&text).map_err(StoreError::Format)?;
        Ok(Some(config))
    }

    fn request_persist(&mut self, dirty: bool) {
        self.dirty |= dirty;
    }

    fn notify_backup_changed(&mut self) {
        self.backup_changes += 1;
        debug!("Backup data changed ({} notifications)", self.backup_changes);
    }
}
