//! Access point configuration model and policies.
//!
//! # Components
//!
//! - [`config`] - Configuration data structure and validation
//! - [`band`] - Band bitmask and normalization policy
//! - [`defaults`] - Secure default generation
//! - [`mac`] - MAC addresses and BSSID policy
//! - [`channel`] - Start-time preparation (channel allowlist, BSSID)
//! - [`legacy`] - One-shot legacy record migration
//!
//! Everything here is pure apart from [`legacy::migrate`], which removes the
//! legacy source once it has been read.

pub mod band;
pub mod channel;
pub mod config;
pub mod defaults;
pub mod legacy;
pub mod mac;

pub use band::{Band, BandPolicy};
pub use channel::{enforce_2g_channel_allowlist, prepare_for_start};
pub use config::{
    ConfigError, Passphrase, SecurityType, SoftApConfiguration, SoftApConfigurationBuilder,
    PSK_MAX_LEN, PSK_MIN_LEN, SSID_MAX_LEN, SSID_MIN_LEN,
};
pub use defaults::{
    generate_default, generate_local_only, generate_tethering_default, GENERATED_PASSPHRASE_LEN,
};
pub use legacy::{migrate, LegacyError, LegacyFile, LegacyRecord, LegacySource};
pub use mac::{BssidPolicy, HashedMacProvider, MacAddress, MacDerivationError, PersistentMacProvider};

/// Normalize the band of `config` under `policy`.
///
/// An explicit channel belongs to a single band, so it is cleared when the
/// band is widened to several. Returns true if anything changed.
pub fn normalize_band(config: &mut SoftApConfiguration, policy: BandPolicy) -> bool {
    let (band, changed) = policy.normalize(config.band);
    if !changed {
        return false;
    }
    log::info!("Normalized access point band {} -> {}", config.band, band);
    config.band = band;
    if !band.is_single() && config.channel != 0 {
        log::debug!("Clearing channel {} for multi-band selection", config.channel);
        config.channel = 0;
    }
    true
}

/// Reset fields the device cannot honor to their defaults.
///
/// SAE types fall back to WPA2-PSK without SAE support. Client limits and
/// client lists are cleared without force-disconnect support. Returns true if
/// anything changed.
pub fn reset_unsupported_fields(
    config: &mut SoftApConfiguration,
    capabilities: &crate::DeviceCapabilities,
) -> bool {
    let mut changed = false;

    if !capabilities.sae_supported && config.security_type.is_sae() {
        log::info!(
            "SAE not supported, downgrading {} to {}",
            config.security_type,
            SecurityType::Wpa2Psk
        );
        config.security_type = SecurityType::Wpa2Psk;
        changed = true;
    }

    if !capabilities.client_force_disconnect_supported
        && (config.max_number_of_clients != 0
            || config.client_control_by_user_enabled
            || !config.blocked_clients.is_empty()
            || !config.allowed_clients.is_empty())
    {
        log::info!("Client control not supported, resetting client limits");
        config.max_number_of_clients = 0;
        config.client_control_by_user_enabled = false;
        config.blocked_clients.clear();
        config.allowed_clients.clear();
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceCapabilities;

    fn full_config() -> SoftApConfiguration {
        SoftApConfiguration {
            ssid: Some("Hotspot".to_string()),
            security_type: SecurityType::Wpa3SaeTransition,
            passphrase: Some(Passphrase::new("password123")),
            max_number_of_clients: 5,
            client_control_by_user_enabled: true,
            blocked_clients: vec![MacAddress::new([2, 0, 0, 0, 0, 1])],
            allowed_clients: vec![MacAddress::new([2, 0, 0, 0, 0, 2])],
            ..SoftApConfiguration::default()
        }
    }

    // ==================== Band Normalization Tests ====================

    #[test]
    fn test_widening_clears_channel() {
        let mut config = SoftApConfiguration {
            band: Band::FIVE_GHZ,
            channel: 40,
            ..full_config()
        };
        assert!(normalize_band(&mut config, BandPolicy::ConcurrentRadio));
        assert_eq!(config.band, Band::TWO_GHZ | Band::FIVE_GHZ);
        assert_eq!(config.channel, 0);
    }

    #[test]
    fn test_single_band_keeps_channel() {
        let mut config = SoftApConfiguration {
            band: Band::FIVE_GHZ,
            channel: 40,
            ..full_config()
        };
        assert!(!normalize_band(&mut config, BandPolicy::RestrictedRadio));
        assert_eq!(config.channel, 40);

        config.band = Band::TWO_GHZ | Band::SIX_GHZ;
        config.channel = 6;
        assert!(normalize_band(&mut config, BandPolicy::RestrictedRadio));
        assert_eq!(config.band, Band::TWO_GHZ);
        assert_eq!(config.channel, 6);
    }

    // ==================== Capability Reset Tests ====================

    #[test]
    fn test_reset_without_capabilities() {
        let mut config = full_config();
        assert!(reset_unsupported_fields(&mut config, &DeviceCapabilities::default()));
        assert_eq!(config.security_type, SecurityType::Wpa2Psk);
        assert_eq!(config.max_number_of_clients, 0);
        assert!(!config.client_control_by_user_enabled);
        assert!(config.blocked_clients.is_empty());
        assert!(config.allowed_clients.is_empty());
        // Passphrase survives the downgrade.
        assert_eq!(config.passphrase.as_ref().unwrap().as_str(), "password123");
    }

    #[test]
    fn test_reset_with_capabilities_is_noop() {
        let caps = DeviceCapabilities {
            sae_supported: true,
            client_force_disconnect_supported: true,
            ..DeviceCapabilities::default()
        };
        let mut config = full_config();
        assert!(!reset_unsupported_fields(&mut config, &caps));
        assert_eq!(config, full_config());
    }

    #[test]
    fn test_reset_pure_sae_downgraded() {
        let mut config = SoftApConfiguration {
            security_type: SecurityType::Wpa3Sae,
            ..full_config()
        };
        let caps = DeviceCapabilities {
            client_force_disconnect_supported: true,
            ..DeviceCapabilities::default()
        };
        assert!(reset_unsupported_fields(&mut config, &caps));
        assert_eq!(config.security_type, SecurityType::Wpa2Psk);
        assert_eq!(config.max_number_of_clients, 5);
    }

    #[test]
    fn test_reset_leaves_psk_and_open_alone() {
        let mut config = SoftApConfiguration {
            ssid: Some("Open".to_string()),
            ..SoftApConfiguration::default()
        };
        assert!(!reset_unsupported_fields(&mut config, &DeviceCapabilities::default()));
        assert_eq!(config.security_type, SecurityType::Open);
    }
}
