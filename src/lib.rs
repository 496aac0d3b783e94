//! Wi-Fi access point (SoftAP) configuration store.
//!
//! This library owns the single persisted hotspot configuration of a device:
//! it validates candidates, normalizes band selection against the radio's
//! capability, migrates the legacy on-disk record once, generates secure
//! defaults and resolves the BSSID.
//!
//! Storage engines, the radio driver and the backup transport are external;
//! they are reached through [`store::PersistenceBackend`] and
//! [`softap::PersistentMacProvider`].

pub mod capabilities;
pub mod softap;
pub mod store;

// Re-export commonly used items
pub use capabilities::{DeviceCapabilities, DeviceProfile, NamingTemplates, ProfileError};
pub use softap::{
    Band, BandPolicy, BssidPolicy, ConfigError, MacAddress, SecurityType, SoftApConfiguration,
};
pub use store::{ConfigurationStore, DataSource, PersistenceBackend, StoreError};
