//! Device capability flags and naming templates.
//!
//! These are read-only inputs supplied by the platform's resource layer.
//! The defaults match a stock single-radio device without SAE support.
//!
//! # Example
//!
//! ```
//! use softap_config::DeviceProfile;
//!
//! let profile: DeviceProfile =
//!     serde_json::from_str(r#"{ "capabilities": { "sae_supported": true } }"#).unwrap();
//! assert!(profile.capabilities.sae_supported);
//! assert_eq!(profile.templates.tethering_prefix, "AndroidAP");
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::softap::BandPolicy;

/// Default 2.4 GHz channels usable for an explicit channel request.
pub const DEFAULT_ALLOWED_2G_CHANNELS: &[u32] = &[1, 6, 11];

/// Default SSID prefix for tethering hotspots.
pub const DEFAULT_TETHERING_PREFIX: &str = "AndroidAP";

/// Default SSID prefix for local-only hotspots.
pub const DEFAULT_LOCAL_ONLY_PREFIX: &str = "AndroidShare";

/// Hardware and firmware capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceCapabilities {
    /// The device runs 2.4 GHz and 5 GHz concurrently, so a 5 GHz-only
    /// request is widened instead of narrowing multi-band requests.
    pub converts_5ghz_to_any: bool,
    /// WPA3-SAE is supported by the driver.
    pub sae_supported: bool,
    /// The BSSID may be replaced with a persistent randomized MAC.
    pub mac_randomization_supported: bool,
    /// The driver can force-disconnect clients (client limits, block lists).
    pub client_force_disconnect_supported: bool,
    /// Channels accepted for an explicit 2.4 GHz channel.
    pub allowed_2g_channels: Vec<u32>,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            converts_5ghz_to_any: false,
            sae_supported: false,
            mac_randomization_supported: false,
            client_force_disconnect_supported: false,
            allowed_2g_channels: DEFAULT_ALLOWED_2G_CHANNELS.to_vec(),
        }
    }
}

impl DeviceCapabilities {
    /// Band normalization policy selected by the conversion-mode flag.
    pub fn band_policy(&self) -> BandPolicy {
        BandPolicy::from_capability(self.converts_5ghz_to_any)
    }
}

/// SSID prefixes used when generating default configurations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingTemplates {
    /// Prefix for the shared tethering hotspot.
    pub tethering_prefix: String,
    /// Prefix for local-only hotspots.
    pub local_only_prefix: String,
}

impl Default for NamingTemplates {
    fn default() -> Self {
        Self {
            tethering_prefix: DEFAULT_TETHERING_PREFIX.to_string(),
            local_only_prefix: DEFAULT_LOCAL_ONLY_PREFIX.to_string(),
        }
    }
}

/// Capabilities and templates for one device, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub capabilities: DeviceCapabilities,
    pub templates: NamingTemplates,
}

impl DeviceProfile {
    /// Load a profile from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(ProfileError::Io)?;
        let profile: Self = serde_json::from_str(&text).map_err(ProfileError::Parse)?;
        log::debug!("Loaded device profile from {:?}", path);
        Ok(profile)
    }
}

/// Errors that can occur while loading a device profile.
#[derive(Debug)]
pub enum ProfileError {
    /// The profile file could not be read.
    Io(io::Error),
    /// The profile file is not valid JSON for a profile.
    Parse(serde_json::Error),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read device profile: {}", e),
            Self::Parse(e) => write!(f, "invalid device profile: {}", e),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}
