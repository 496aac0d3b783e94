//! MAC addresses and BSSID selection.
//!
//! The BSSID of the access point is either pinned by the caller, replaced by a
//! persistent randomized MAC, or left to the hardware's factory address.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use super::config::{ConfigError, SoftApConfiguration};

/// Locally administered bit of the first octet.
const LOCALLY_ADMINISTERED_BIT: u8 = 0x02;

/// Multicast bit of the first octet.
const MULTICAST_BIT: u8 = 0x01;

/// A 48-bit IEEE 802 MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & LOCALLY_ADMINISTERED_BIT != 0
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & MULTICAST_BIT != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl FromStr for MacAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidMac(s.to_string());
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

/// Source of stable, decorrelated MAC addresses.
///
/// Implementations must return the same address for the same identity and
/// salt, across calls and process restarts.
pub trait PersistentMacProvider {
    fn derive(&self, interface_identity: &str, salt: &[u8]) -> Result<MacAddress, MacDerivationError>;
}

/// Derives MACs from SHA-256 over a device secret, the identity and the salt.
///
/// The result is always unicast and locally administered.
pub struct HashedMacProvider {
    secret: Zeroizing<Vec<u8>>,
}

impl HashedMacProvider {
    /// Create a provider keyed by a per-device secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }
}

impl PersistentMacProvider for HashedMacProvider {
    fn derive(&self, interface_identity: &str, salt: &[u8]) -> Result<MacAddress, MacDerivationError> {
        if self.secret.is_empty() {
            return Err(MacDerivationError::MissingSecret);
        }

        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_slice());
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
        hasher.update((interface_identity.len() as u32).to_be_bytes());
        hasher.update(interface_identity.as_bytes());
        hasher.update((salt.len() as u32).to_be_bytes());
        hasher.update(salt);
        let digest = hasher.finalize();

        let mut octets = [0u8; 6];
        octets.copy_from_slice(&digest[..6]);
        octets[0] = (octets[0] | LOCALLY_ADMINISTERED_BIT) & !MULTICAST_BIT;
        Ok(MacAddress(octets))
    }
}

/// Chooses the BSSID an access point starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BssidPolicy {
    interface_identity: String,
}

impl BssidPolicy {
    /// Create a policy deriving MACs for the named interface.
    pub fn new(interface_identity: impl Into<String>) -> Self {
        Self {
            interface_identity: interface_identity.into(),
        }
    }

    pub fn interface_identity(&self) -> &str {
        &self.interface_identity
    }

    /// Resolve the BSSID for `candidate`.
    ///
    /// An explicit BSSID always wins. Otherwise, with randomization support,
    /// the persistent MAC for this interface salted with the SSID is used.
    /// Without it, `None` leaves the factory address in place.
    pub fn resolve(
        &self,
        candidate: &SoftApConfiguration,
        mac_randomization_supported: bool,
        provider: &dyn PersistentMacProvider,
    ) -> Result<Option<MacAddress>, MacDerivationError> {
        if let Some(bssid) = candidate.bssid {
            return Ok(Some(bssid));
        }
        if !mac_randomization_supported {
            return Ok(None);
        }

        let salt = candidate.ssid.as_deref().unwrap_or_default().as_bytes();
        let mac = provider.derive(&self.interface_identity, salt)?;
        log::debug!("Using persistent randomized BSSID {}", mac);
        Ok(Some(mac))
    }
}

impl Default for BssidPolicy {
    fn default() -> Self {
        Self::new("softap")
    }
}

/// Errors from persistent MAC derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacDerivationError {
    /// The provider has no key material.
    MissingSecret,
    /// The backing key store failed.
    Provider(String),
}

impl fmt::Display for MacDerivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecret => write!(f, "no secret available for MAC derivation"),
            Self::Provider(msg) => write!(f, "MAC derivation failed: {}", msg),
        }
    }
}

impl std::error::Error for MacDerivationError {}
