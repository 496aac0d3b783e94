//! Owner of the single persisted access point configuration.
//!
//! The store adopts a configuration once at construction (from the legacy
//! record, the persistence backend, or a generated default) and then serves
//! reads and writes. Reads normalize the band lazily; writes reset
//! unsupported fields, normalize, and always persist.
//!
//! All calls are expected on one sequencing context. The store does no
//! locking of its own.
//!
//! # Example
//!
//! ```
//! use softap_config::store::{ConfigurationStore, JsonFileBackend};
//! use softap_config::DeviceProfile;
//!
//! let path = std::env::temp_dir().join(format!("softap-doc-{}.json", std::process::id()));
//! let mut store = ConfigurationStore::with_os_rng(
//!     JsonFileBackend::new(&path),
//!     DeviceProfile::default(),
//!     None,
//! );
//! let config = store.get_configuration();
//! assert!(config.validate());
//! # let _ = std::fs::remove_file(&path);
//! ```

mod file;
#[cfg(test)]
mod testing;

pub use file::JsonFileBackend;

use log::{debug, info, warn};
use rand_core::{OsRng, RngCore};
use std::fmt;
use std::io;

use crate::capabilities::{DeviceCapabilities, DeviceProfile, NamingTemplates};
use crate::softap::{
    self, generate_local_only, generate_tethering_default, normalize_band,
    reset_unsupported_fields, Band, LegacyError, LegacySource, SoftApConfiguration,
};

/// Name the store registers with the persistence backend.
pub const DATA_SOURCE_NAME: &str = "SoftAp";

/// Durable storage used by the store.
///
/// Persist and backup requests are fire-and-forget. The backend obtains the
/// value to write from [`DataSource::serialize`].
pub trait PersistenceBackend {
    /// Register the store as a data source. Called once at construction.
    fn register_data_source(&mut self, name: &'static str);
    /// Read the currently persisted configuration, if any.
    fn load(&mut self) -> Result<Option<SoftApConfiguration>, StoreError>;
    /// Ask the backend to persist the data source.
    fn request_persist(&mut self, dirty: bool);
    /// Tell the backup mechanism that the configuration changed.
    fn notify_backup_changed(&mut self);
}

/// Callbacks the persistence layer drives on a registered data source.
pub trait DataSource {
    /// Current value for durable storage.
    fn serialize(&self) -> SoftApConfiguration;
    /// Deliver a freshly loaded value. `None` means nothing was stored.
    fn adopt(&mut self, config: Option<SoftApConfiguration>);
    /// The durable backend has become ready to accept writes.
    fn on_replay_ready(&mut self);
}

/// Progress of the deferred write after a legacy migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// No legacy record was migrated.
    NotMigrated,
    /// Migrated; one more write is owed once the backend is ready.
    PendingReplay,
    /// The deferred write has been requested.
    ReplayComplete,
}

/// Single-slot owner of the access point configuration.
pub struct ConfigurationStore<B, R = OsRng> {
    backend: B,
    capabilities: DeviceCapabilities,
    templates: NamingTemplates,
    rng: R,
    config: SoftApConfiguration,
    migration: MigrationState,
}

impl<B: PersistenceBackend> ConfigurationStore<B, OsRng> {
    /// Create a store drawing default randomness from the OS.
    pub fn with_os_rng(
        backend: B,
        profile: DeviceProfile,
        legacy: Option<&dyn LegacySource>,
    ) -> Self {
        Self::new(backend, profile, legacy, OsRng)
    }
}

impl<B: PersistenceBackend, R: RngCore> ConfigurationStore<B, R> {
    /// Create the store and adopt its initial configuration.
    ///
    /// A present legacy record is migrated; otherwise the backend is read.
    /// Unreadable data falls back to a generated default. The adopted value
    /// is persisted and announced to backup exactly once.
    pub fn new(
        mut backend: B,
        profile: DeviceProfile,
        legacy: Option<&dyn LegacySource>,
        mut rng: R,
    ) -> Self {
        backend.register_data_source(DATA_SOURCE_NAME);
        let DeviceProfile {
            capabilities,
            templates,
        } = profile;

        let mut migration = MigrationState::NotMigrated;
        let loaded = match legacy.filter(|source| source.exists()) {
            Some(source) => match softap::migrate(source) {
                Ok(config) => {
                    migration = MigrationState::PendingReplay;
                    Some(config)
                }
                // The record is still there; keep what the backend already has.
                Err(LegacyError::Io(e)) => {
                    warn!("Failed to read legacy access point record: {}", e);
                    load_or_none(&mut backend)
                }
                Err(e) => {
                    warn!("Legacy access point migration failed, using default: {}", e);
                    None
                }
            },
            None => load_or_none(&mut backend),
        };

        let config = match loaded {
            Some(config) => config,
            None => {
                info!("No access point configuration, generating default");
                generate_tethering_default(&capabilities, &templates, &mut rng)
            }
        };

        let mut store = Self {
            backend,
            capabilities,
            templates,
            rng,
            config,
            migration,
        };
        store.persist_and_notify();
        store
    }

    /// Current configuration with its band normalized.
    ///
    /// If normalization changes the stored value, the normalized value
    /// replaces it and is persisted before returning.
    pub fn get_configuration(&mut self) -> SoftApConfiguration {
        if normalize_band(&mut self.config, self.capabilities.band_policy()) {
            self.persist_and_notify();
        }
        self.config.clone()
    }

    /// Replace the configuration. `None` installs a generated default.
    ///
    /// The candidate is expected to be validated by the caller; only
    /// unsupported fields are reset and the band normalized. Always persists.
    pub fn set_configuration(&mut self, candidate: Option<SoftApConfiguration>) {
        let mut config = match candidate {
            Some(config) => config,
            None => {
                debug!("No configuration supplied, generating default");
                generate_tethering_default(&self.capabilities, &self.templates, &mut self.rng)
            }
        };
        reset_unsupported_fields(&mut config, &self.capabilities);
        normalize_band(&mut config, self.capabilities.band_policy());

        self.config = config;
        self.persist_and_notify();
    }

    /// Generate a local-only hotspot configuration on `band`.
    ///
    /// The band is kept as requested and the result is not stored. A BSSID in
    /// `custom` is carried over.
    pub fn generate_local_only_config(
        &mut self,
        band: Band,
        custom: Option<&SoftApConfiguration>,
    ) -> SoftApConfiguration {
        generate_local_only(&self.capabilities, &self.templates, band, custom, &mut self.rng)
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn templates(&self) -> &NamingTemplates {
        &self.templates
    }

    pub fn migration_state(&self) -> MigrationState {
        self.migration
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn persist_and_notify(&mut self) {
        self.backend.request_persist(true);
        self.backend.notify_backup_changed();
    }
}

fn load_or_none<B: PersistenceBackend>(backend: &mut B) -> Option<SoftApConfiguration> {
    match backend.load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load access point configuration, using default: {}", e);
            None
        }
    }
}

impl<B: PersistenceBackend, R: RngCore> DataSource for ConfigurationStore<B, R> {
    fn serialize(&self) -> SoftApConfiguration {
        self.config.clone()
    }

    fn adopt(&mut self, config: Option<SoftApConfiguration>) {
        match config {
            Some(config) => {
                debug!("Adopted access point configuration from storage");
                self.config = config;
            }
            None => {
                info!("Storage holds no access point configuration, generating default");
                self.config =
                    generate_tethering_default(&self.capabilities, &self.templates, &mut self.rng);
                self.persist_and_notify();
            }
        }
    }

    fn on_replay_ready(&mut self) {
        if self.migration == MigrationState::PendingReplay {
            debug!("Backend ready, persisting migrated configuration");
            self.backend.request_persist(true);
            self.migration = MigrationState::ReplayComplete;
        }
    }
}

/// Errors from the persistence backend.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the store failed.
    Io(io::Error),
    /// The stored data is not a valid configuration.
    Format(serde_json::Error),
    /// Data read back after a write did not match.
    VerificationFailed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "store I/O failed: {}", e),
            Self::Format(e) => write!(f, "malformed stored configuration: {}", e),
            Self::VerificationFailed => write!(f, "stored data did not match after write"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
            Self::VerificationFailed => None,
        }
    }
}
