//! Access point configuration data structures and validation.
//!
//! This module contains the persisted [`SoftApConfiguration`] together with
//! the field-level validation rules a candidate must pass before it is handed
//! to the store.
//!
//! # Example
//!
//! ```
//! use softap_config::softap::{SecurityType, SoftApConfiguration};
//!
//! let config = SoftApConfiguration::builder()
//!     .ssid("MyHotspot")
//!     .passphrase("MyPassword", SecurityType::Wpa2Psk)
//!     .build()
//!     .unwrap();
//! assert!(config.validate());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::band::Band;
use super::mac::MacAddress;

/// Minimum SSID length in UTF-8 bytes.
pub const SSID_MIN_LEN: usize = 1;

/// Maximum SSID length per IEEE 802.11 standard.
pub const SSID_MAX_LEN: usize = 32;

/// Minimum passphrase length for PSK and SAE.
pub const PSK_MIN_LEN: usize = 8;

/// Maximum ASCII passphrase length for PSK and SAE.
pub const PSK_MAX_LEN: usize = 63;

/// Access point security type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    /// No authentication.
    Open,
    /// WPA2 personal.
    Wpa2Psk,
    /// WPA3 personal only.
    Wpa3Sae,
    /// WPA3 personal with WPA2 fallback.
    Wpa3SaeTransition,
}

impl SecurityType {
    /// True if this type requires a passphrase.
    pub fn requires_passphrase(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// True if this type uses SAE.
    pub fn is_sae(self) -> bool {
        matches!(self, Self::Wpa3Sae | Self::Wpa3SaeTransition)
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Wpa2Psk => "wpa2-psk",
            Self::Wpa3Sae => "wpa3-sae",
            Self::Wpa3SaeTransition => "wpa3-sae-transition",
        };
        write!(f, "{}", name)
    }
}

/// Access point passphrase. Zeroed on drop and redacted in debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in UTF-8 bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passphrase(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for Passphrase {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// The persisted access point configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftApConfiguration {
    /// Network name, 1-32 UTF-8 bytes.
    pub ssid: Option<String>,
    /// Explicit BSSID. `None` leaves the choice to the BSSID policy.
    pub bssid: Option<MacAddress>,
    pub security_type: SecurityType,
    /// Required for PSK/SAE types, absent for open networks.
    pub passphrase: Option<Passphrase>,
    pub band: Band,
    /// 0 selects the channel automatically.
    pub channel: u32,
    pub hidden_ssid: bool,
    /// 0 means unlimited.
    pub max_number_of_clients: u32,
    pub client_control_by_user_enabled: bool,
    pub blocked_clients: Vec<MacAddress>,
    pub allowed_clients: Vec<MacAddress>,
    pub auto_shutdown_enabled: bool,
    /// Idle time before auto shutdown. 0 uses the platform default.
    pub shutdown_timeout_ms: u64,
}

impl Default for SoftApConfiguration {
    fn default() -> Self {
        Self {
            ssid: None,
            bssid: None,
            security_type: SecurityType::Open,
            passphrase: None,
            band: Band::TWO_GHZ,
            channel: 0,
            hidden_ssid: false,
            max_number_of_clients: 0,
            client_control_by_user_enabled: false,
            blocked_clients: Vec::new(),
            allowed_clients: Vec::new(),
            auto_shutdown_enabled: true,
            shutdown_timeout_ms: 0,
        }
    }
}

impl SoftApConfiguration {
    /// Start building a configuration.
    pub fn builder() -> SoftApConfigurationBuilder {
        SoftApConfigurationBuilder::default()
    }

    /// Check the SSID and security invariants, returning the first violation.
    ///
    /// Lengths are measured in encoded UTF-8 bytes, not characters.
    pub fn check(&self) -> Result<(), ConfigError> {
        let ssid = self.ssid.as_deref().ok_or(ConfigError::SsidMissing)?;
        if ssid.len() < SSID_MIN_LEN {
            return Err(ConfigError::SsidEmpty);
        }
        if ssid.len() > SSID_MAX_LEN {
            return Err(ConfigError::SsidTooLong {
                len: ssid.len(),
                max: SSID_MAX_LEN,
            });
        }

        match (&self.passphrase, self.security_type.requires_passphrase()) {
            (Some(_), false) => Err(ConfigError::PassphraseNotAllowed),
            (None, true) => Err(ConfigError::PassphraseMissing(self.security_type)),
            (Some(passphrase), true) if passphrase.len() < PSK_MIN_LEN => {
                Err(ConfigError::PassphraseTooShort {
                    len: passphrase.len(),
                    min: PSK_MIN_LEN,
                })
            }
            (Some(passphrase), true) if passphrase.len() > PSK_MAX_LEN => {
                Err(ConfigError::PassphraseTooLong {
                    len: passphrase.len(),
                    max: PSK_MAX_LEN,
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns true if the configuration satisfies every field invariant.
    ///
    /// Never mutates `self`. Use [`check`](Self::check) for the reason.
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Rejected access point configuration: {}", e);
                false
            }
        }
    }

    /// Check if this is an open network (no security).
    pub fn is_open(&self) -> bool {
        self.security_type == SecurityType::Open
    }
}

/// Builder for [`SoftApConfiguration`]; `build` runs the validation rules.
#[derive(Debug, Clone, Default)]
pub struct SoftApConfigurationBuilder {
    config: SoftApConfiguration,
}

impl SoftApConfigurationBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: SoftApConfiguration) -> Self {
        Self { config }
    }

    pub fn ssid(mut self, ssid: impl Into<String>) -> Self {
        self.config.ssid = Some(ssid.into());
        self
    }

    pub fn bssid(mut self, bssid: Option<MacAddress>) -> Self {
        self.config.bssid = bssid;
        self
    }

    /// Set the passphrase together with the security type it applies to.
    pub fn passphrase(mut self, passphrase: impl Into<String>, security: SecurityType) -> Self {
        self.config.passphrase = Some(Passphrase::new(passphrase));
        self.config.security_type = security;
        self
    }

    /// Make the network open and drop any passphrase.
    pub fn open(mut self) -> Self {
        self.config.passphrase = None;
        self.config.security_type = SecurityType::Open;
        self
    }

    pub fn band(mut self, band: Band) -> Self {
        self.config.band = band;
        self
    }

    /// Pin a channel on a single band. Channel 0 selects automatically.
    pub fn channel(mut self, channel: u32, band: Band) -> Self {
        self.config.channel = channel;
        self.config.band = band;
        self
    }

    pub fn hidden_ssid(mut self, hidden: bool) -> Self {
        self.config.hidden_ssid = hidden;
        self
    }

    pub fn max_number_of_clients(mut self, max: u32) -> Self {
        self.config.max_number_of_clients = max;
        self
    }

    pub fn client_control_by_user_enabled(mut self, enabled: bool) -> Self {
        self.config.client_control_by_user_enabled = enabled;
        self
    }

    pub fn client_lists(mut self, blocked: Vec<MacAddress>, allowed: Vec<MacAddress>) -> Self {
        self.config.blocked_clients = blocked;
        self.config.allowed_clients = allowed;
        self
    }

    pub fn auto_shutdown(mut self, enabled: bool, timeout_ms: u64) -> Self {
        self.config.auto_shutdown_enabled = enabled;
        self.config.shutdown_timeout_ms = timeout_ms;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<SoftApConfiguration, ConfigError> {
        self.config.check()?;
        Ok(self.config)
    }
}

/// Errors that can occur during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID was never set.
    SsidMissing,
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Open networks cannot carry a passphrase.
    PassphraseNotAllowed,
    /// The security type needs a passphrase.
    PassphraseMissing(SecurityType),
    /// Passphrase is too short.
    PassphraseTooShort { len: usize, min: usize },
    /// Passphrase exceeds maximum length.
    PassphraseTooLong { len: usize, max: usize },
    /// MAC address text could not be parsed.
    InvalidMac(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidMissing => write!(f, "SSID is not set"),
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PassphraseNotAllowed => write!(f, "open network cannot have a passphrase"),
            Self::PassphraseMissing(security) => {
                write!(f, "{} requires a passphrase", security)
            }
            Self::PassphraseTooShort { len, min } => {
                write!(f, "passphrase too short: {} bytes (min {})", len, min)
            }
            Self::PassphraseTooLong { len, max } => {
                write!(f, "passphrase too long: {} bytes (max {})", len, max)
            }
            Self::InvalidMac(text) => write!(f, "invalid MAC address: {}", text),
        }
    }
}

impl std::error::Error for ConfigError {}
