//! Test doubles for the store.

use std::cell::RefCell;
use std::io;

use super::{PersistenceBackend, StoreError};
use crate::softap::{LegacySource, SoftApConfiguration};

/// A request the store made of its backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Registered(&'static str),
    Persist(bool),
    BackupChanged,
}

/// Backend that records every request in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub stored: Option<SoftApConfiguration>,
    pub fail_load: bool,
    pub loads: usize,
    pub events: Vec<BackendEvent>,
}

impl RecordingBackend {
    pub fn with_stored(config: SoftApConfiguration) -> Self {
        Self {
            stored: Some(config),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn persist_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BackendEvent::Persist(_)))
            .count()
    }

    pub fn backup_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BackendEvent::BackupChanged))
            .count()
    }
}

impl PersistenceBackend for RecordingBackend {
    fn register_data_source(&mut self, name: &'static str) {
        self.events.push(BackendEvent::Registered(name));
    }

    fn load(&mut self) -> Result<Option<SoftApConfiguration>, StoreError> {
        self.loads += 1;
        if self.fail_load {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "corrupt store",
            )));
        }
        Ok(self.stored.clone())
    }

    fn request_persist(&mut self, dirty: bool) {
        self.events.push(BackendEvent::Persist(dirty));
    }

    fn notify_backup_changed(&mut self) {
        self.events.push(BackendEvent::BackupChanged);
    }
}

/// In-memory legacy record.
pub struct FakeLegacySource {
    bytes: RefCell<Option<Vec<u8>>>,
    unreadable: bool,
}

impl FakeLegacySource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RefCell::new(Some(bytes)),
            unreadable: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            bytes: RefCell::new(None),
            unreadable: false,
        }
    }

    /// Present, but every read fails.
    pub fn unreadable() -> Self {
        Self {
            bytes: RefCell::new(Some(Vec::new())),
            unreadable: true,
        }
    }
}

impl LegacySource for FakeLegacySource {
    fn exists(&self) -> bool {
        self.bytes.borrow().is_some()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        if self.unreadable {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "legacy record locked"));
        }
        self.bytes
            .borrow()
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no legacy record"))
    }

    fn remove(&self) -> io::Result<()> {
        self.bytes.borrow_mut().take();
        Ok(())
    }
}
