//! Start-time preparation of a configuration.
//!
//! Before the radio applies a configuration, an explicit 2.4 GHz channel is
//! checked against the device allowlist and the BSSID is resolved.

use super::band::Band;
use super::config::SoftApConfiguration;
use super::mac::{BssidPolicy, MacDerivationError, PersistentMacProvider};
use crate::capabilities::DeviceCapabilities;

/// Replace a disallowed explicit 2.4 GHz channel with automatic selection.
///
/// Returns true if the channel was changed. An empty allowlist allows every
/// channel.
pub fn enforce_2g_channel_allowlist(
    config: &mut SoftApConfiguration,
    capabilities: &DeviceCapabilities,
) -> bool {
    if config.band != Band::TWO_GHZ || config.channel == 0 {
        return false;
    }
    let allowed = &capabilities.allowed_2g_channels;
    if allowed.is_empty() || allowed.contains(&config.channel) {
        return false;
    }

    log::info!(
        "2.4GHz channel {} not in allowlist {:?}, using automatic selection",
        config.channel,
        allowed
    );
    config.channel = 0;
    true
}

/// Produce the configuration handed to the radio driver.
///
/// MAC derivation failures are returned to the caller.
pub fn prepare_for_start(
    config: &SoftApConfiguration,
    capabilities: &DeviceCapabilities,
    policy: &BssidPolicy,
    provider: &dyn PersistentMacProvider,
) -> Result<SoftApConfiguration, MacDerivationError> {
    let mut prepared = config.clone();
    enforce_2g_channel_allowlist(&mut prepared, capabilities);
    prepared.bssid = policy.resolve(config, capabilities.mac_randomization_supported, provider)?;
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::softap::config::{Passphrase, SecurityType};
    use crate::softap::mac::{HashedMacProvider, MacAddress};

    fn config(band: Band, channel: u32) -> SoftApConfiguration {
        SoftApConfiguration {
            ssid: Some("Hotspot".to_string()),
            security_type: SecurityType::Wpa2Psk,
            passphrase: Some(Passphrase::new("password123")),
            band,
            channel,
            ..SoftApConfiguration::default()
        }
    }

    #[test]
    fn test_allowed_channel_kept() {
        let mut cfg = config(Band::TWO_GHZ, 6);
        assert!(!enforce_2g_channel_allowlist(&mut cfg, &DeviceCapabilities::default()));
        assert_eq!(cfg.channel, 6);
    }

    #[test]
    fn test_disallowed_channel_becomes_automatic() {
        let mut cfg = config(Band::TWO_GHZ, 13);
        assert!(enforce_2g_channel_allowlist(&mut cfg, &DeviceCapabilities::default()));
        assert_eq!(cfg.channel, 0);
    }

    #[test]
    fn test_other_bands_ignored() {
        let mut cfg = config(Band::FIVE_GHZ, 40);
        assert!(!enforce_2g_channel_allowlist(&mut cfg, &DeviceCapabilities::default()));
        assert_eq!(cfg.channel, 40);
    }

    #[test]
    fn test_empty_allowlist_allows_all() {
        let caps = DeviceCapabilities {
            allowed_2g_channels: Vec::new(),
            ..DeviceCapabilities::default()
        };
        let mut cfg = config(Band::TWO_GHZ, 13);
        assert!(!enforce_2g_channel_allowlist(&mut cfg, &caps));
        assert_eq!(cfg.channel, 13);
    }

    #[test]
    fn test_prepare_resolves_bssid() {
        let caps = DeviceCapabilities {
            mac_randomization_supported: true,
            ..DeviceCapabilities::default()
        };
        let provider = HashedMacProvider::new(b"device-secret".to_vec());
        let policy = BssidPolicy::new("wlan1");
        let source = config(Band::TWO_GHZ, 13);

        let prepared = prepare_for_start(&source, &caps, &policy, &provider).unwrap();
        assert_eq!(prepared.channel, 0);
        assert_eq!(
            prepared.bssid,
            Some(provider.derive("wlan1", b"Hotspot").unwrap())
        );
        // Source is untouched.
        assert_eq!(source.channel, 13);
        assert!(source.bssid.is_none());
    }

    #[test]
    fn test_prepare_keeps_explicit_bssid() {
        let explicit = MacAddress::new([0x02, 0, 0, 0, 0, 1]);
        let mut source = config(Band::TWO_GHZ, 0);
        source.bssid = Some(explicit);
        let prepared = prepare_for_start(
            &source,
            &DeviceCapabilities::default(),
            &BssidPolicy::default(),
            &HashedMacProvider::new(b"s".to_vec()),
        )
        .unwrap();
        assert_eq!(prepared.bssid, Some(explicit));
    }
}
