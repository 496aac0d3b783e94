//! Secure default configurations.
//!
//! A default has an SSID of the form `<prefix>_<NNNN>` and a random
//! alphanumeric passphrase, secured with SAE transition mode when the device
//! supports it.
//!
//! # Example
//!
//! ```
//! use rand::rngs::OsRng;
//! use softap_config::softap::{generate_default, Band};
//! use softap_config::DeviceCapabilities;
//!
//! let config = generate_default(&DeviceCapabilities::default(), "AndroidAP", Band::TWO_GHZ, &mut OsRng);
//! assert!(config.validate());
//! ```

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::band::Band;
use super::config::{Passphrase, SecurityType, SoftApConfiguration};
use crate::capabilities::{DeviceCapabilities, NamingTemplates};

/// Length of a generated passphrase.
pub const GENERATED_PASSPHRASE_LEN: usize = 15;

/// Smallest generated SSID suffix.
pub const SSID_SUFFIX_MIN: u32 = 1000;

/// Largest generated SSID suffix.
pub const SSID_SUFFIX_MAX: u32 = 9999;

/// Generate a default configuration for `band`.
///
/// The band is taken as given; normalization happens when the store reads
/// or writes the result.
pub fn generate_default<R: Rng>(
    capabilities: &DeviceCapabilities,
    name_prefix: &str,
    band: Band,
    rng: &mut R,
) -> SoftApConfiguration {
    let suffix = rng.gen_range(SSID_SUFFIX_MIN..=SSID_SUFFIX_MAX);
    let passphrase: String = (0..GENERATED_PASSPHRASE_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();

    let security_type = if capabilities.sae_supported {
        SecurityType::Wpa3SaeTransition
    } else {
        SecurityType::Wpa2Psk
    };

    SoftApConfiguration {
        ssid: Some(format!("{}_{}", name_prefix, suffix)),
        security_type,
        passphrase: Some(Passphrase::new(passphrase)),
        band,
        channel: 0,
        hidden_ssid: false,
        max_number_of_clients: 0,
        client_control_by_user_enabled: false,
        ..SoftApConfiguration::default()
    }
}

/// Default for the shared tethering hotspot, on 2.4 GHz.
pub fn generate_tethering_default<R: Rng>(
    capabilities: &DeviceCapabilities,
    templates: &NamingTemplates,
    rng: &mut R,
) -> SoftApConfiguration {
    generate_default(capabilities, &templates.tethering_prefix, Band::TWO_GHZ, rng)
}

/// Default for a local-only hotspot on the caller's band.
///
/// A BSSID requested in `custom` is carried into the result.
pub fn generate_local_only<R: Rng>(
    capabilities: &DeviceCapabilities,
    templates: &NamingTemplates,
    band: Band,
    custom: Option<&SoftApConfiguration>,
    rng: &mut R,
) -> SoftApConfiguration {
    let mut config = generate_default(capabilities, &templates.local_only_prefix, band, rng);
    config.bssid = custom.and_then(|custom| custom.bssid);
    config
}
