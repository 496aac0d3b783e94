//! One-shot migration of the legacy binary access point record.
//!
//! The legacy record is a big-endian stream:
//!
//! ```text
//! version:i32  ssid:str  [band:i32  channel:i32]  [hidden:u8]  auth:i32  [passphrase:str]
//! ```
//!
//! where `str` is a `u16` byte length followed by modified UTF-8, as written
//! by Java's `DataOutputStream::writeUTF`: NUL is `C0 80` and characters
//! outside the BMP are two 3-byte surrogates. Plain UTF-8 is accepted too.
//! Band and channel are present from version 2, the hidden flag from version
//! 3, and the passphrase only when `auth` is not "none".

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::band::Band;
use super::config::{Passphrase, SecurityType, SoftApConfiguration};

/// Newest legacy record version.
pub const LEGACY_VERSION: i32 = 3;

/// Oldest legacy record version still understood.
pub const LEGACY_MIN_VERSION: i32 = 1;

/// Legacy band code for 2.4 GHz.
pub const LEGACY_BAND_2GHZ: i32 = 0;
/// Legacy band code for 5 GHz.
pub const LEGACY_BAND_5GHZ: i32 = 1;
/// Legacy band code for any band. Predates 6 GHz, so it means 2.4 or 5 GHz.
pub const LEGACY_BAND_ANY: i32 = -1;

/// Legacy auth code for an open network.
pub const LEGACY_AUTH_NONE: i32 = 0;
/// Legacy auth code for WPA-PSK.
pub const LEGACY_AUTH_WPA_PSK: i32 = 1;
/// Legacy auth code for WPA2-PSK.
pub const LEGACY_AUTH_WPA2_PSK: i32 = 4;

/// Decoded legacy record. Only lives for the duration of a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRecord {
    pub version: i32,
    pub ssid: String,
    pub band: i32,
    pub channel: i32,
    pub hidden: bool,
    pub auth_type: i32,
    pub passphrase: Option<Passphrase>,
}

impl LegacyRecord {
    /// Decode a record from a reader.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, LegacyError> {
        let version = read_i32(reader)?;
        if !(LEGACY_MIN_VERSION..=LEGACY_VERSION).contains(&version) {
            return Err(LegacyError::UnsupportedVersion(version));
        }

        let ssid = read_string(reader)?;
        let (band, channel) = if version >= 2 {
            (read_i32(reader)?, read_i32(reader)?)
        } else {
            (LEGACY_BAND_2GHZ, 0)
        };
        let hidden = if version >= 3 {
            read_u8(reader)? != 0
        } else {
            false
        };
        let auth_type = read_i32(reader)?;
        let passphrase = if auth_type != LEGACY_AUTH_NONE {
            Some(Passphrase::new(read_string(reader)?))
        } else {
            None
        };

        Ok(Self {
            version,
            ssid,
            band,
            channel,
            hidden,
            auth_type,
            passphrase,
        })
    }

    /// Encode the record in the layout of its version.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_be_bytes());
        write_string(&mut bytes, &self.ssid);
        if self.version >= 2 {
            bytes.extend_from_slice(&self.band.to_be_bytes());
            bytes.extend_from_slice(&self.channel.to_be_bytes());
        }
        if self.version >= 3 {
            bytes.push(u8::from(self.hidden));
        }
        bytes.extend_from_slice(&self.auth_type.to_be_bytes());
        if self.auth_type != LEGACY_AUTH_NONE {
            let passphrase = self.passphrase.as_ref().map(Passphrase::as_str).unwrap_or("");
            write_string(&mut bytes, passphrase);
        }
        bytes
    }

    /// Convert into the current configuration representation.
    pub fn into_configuration(self) -> Result<SoftApConfiguration, LegacyError> {
        let band = match self.band {
            LEGACY_BAND_2GHZ => Band::TWO_GHZ,
            LEGACY_BAND_5GHZ => Band::FIVE_GHZ,
            LEGACY_BAND_ANY => Band::TWO_GHZ | Band::FIVE_GHZ,
            other => return Err(LegacyError::UnknownBand(other)),
        };
        let security_type = match self.auth_type {
            LEGACY_AUTH_NONE => SecurityType::Open,
            LEGACY_AUTH_WPA_PSK | LEGACY_AUTH_WPA2_PSK => SecurityType::Wpa2Psk,
            other => return Err(LegacyError::UnknownAuthType(other)),
        };
        let channel =
            u32::try_from(self.channel).map_err(|_| LegacyError::InvalidChannel(self.channel))?;

        Ok(SoftApConfiguration {
            ssid: Some(self.ssid),
            security_type,
            passphrase: self.passphrase,
            band,
            channel,
            hidden_ssid: self.hidden,
            ..SoftApConfiguration::default()
        })
    }
}

/// Handle to the legacy record's storage.
pub trait LegacySource {
    /// True if a legacy record is present.
    fn exists(&self) -> bool;
    /// Read the full record.
    fn read(&self) -> io::Result<Vec<u8>>;
    /// Remove the record so migration does not run again.
    fn remove(&self) -> io::Result<()>;
}

/// Legacy record stored in a file.
#[derive(Debug, Clone)]
pub struct LegacyFile {
    path: PathBuf,
}

impl LegacyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LegacySource for LegacyFile {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    fn remove(&self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

/// Migrate the legacy record into a configuration.
///
/// The legacy source is removed once its contents have been decoded, and
/// also when they cannot be, so a corrupt record is only attempted once. If
/// the source cannot be read it is left in place.
pub fn migrate(source: &dyn LegacySource) -> Result<SoftApConfiguration, LegacyError> {
    let bytes = source.read().map_err(LegacyError::Io)?;
    let decoded = LegacyRecord::read_from(&mut bytes.as_slice())
        .and_then(|record| Ok((record.version, record.into_configuration()?)));

    if let Err(e) = source.remove() {
        log::error!("Failed to remove legacy access point record: {}", e);
    }

    let (version, config) = decoded?;
    if !config.validate() {
        log::warn!("Migrated legacy access point configuration does not pass validation");
    }
    log::info!("Migrated legacy access point record (version {})", version);
    Ok(config)
}

fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), LegacyError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LegacyError::Truncated,
        _ => LegacyError::Io(e),
    })
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, LegacyError> {
    let mut buf = [0u8; 1];
    fill(reader, &mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, LegacyError> {
    let mut buf = [0u8; 4];
    fill(reader, &mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, LegacyError> {
    let mut len = [0u8; 2];
    fill(reader, &mut len)?;
    let mut buf = vec![0u8; u16::from_be_bytes(len) as usize];
    fill(reader, &mut buf)?;
    match String::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(e) => decode_modified_utf8(e.as_bytes()).ok_or(LegacyError::InvalidUtf8),
    }
}

/// Decode Java's modified UTF-8 into UTF-16 units, then pair surrogates.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let continuation = |b: Option<&u8>| b.filter(|b| *b & 0xC0 == 0x80).map(|b| u16::from(*b & 0x3F));

    let mut units = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        let unit = match b {
            0x00..=0x7F => u16::from(b),
            0xC0..=0xDF => (u16::from(b & 0x1F) << 6) | continuation(iter.next())?,
            0xE0..=0xEF => {
                let high = continuation(iter.next())?;
                let low = continuation(iter.next())?;
                (u16::from(b & 0x0F) << 12) | (high << 6) | low
            }
            _ => return None,
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}

/// Append `text` as modified UTF-8, truncated on a character boundary.
fn write_string(bytes: &mut Vec<u8>, text: &str) {
    let mut encoded = Vec::with_capacity(text.len());
    for c in text.chars() {
        let mut utf16 = [0u16; 2];
        let mut char_bytes = Vec::with_capacity(6);
        for &unit in c.encode_utf16(&mut utf16).iter() {
            match unit {
                0x01..=0x7F => char_bytes.push(unit as u8),
                0x00 | 0x80..=0x7FF => {
                    char_bytes.push(0xC0 | (unit >> 6) as u8);
                    char_bytes.push(0x80 | (unit & 0x3F) as u8);
                }
                _ => {
                    char_bytes.push(0xE0 | (unit >> 12) as u8);
                    char_bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                    char_bytes.push(0x80 | (unit & 0x3F) as u8);
                }
            }
        }
        if encoded.len() + char_bytes.len() > u16::MAX as usize {
            break;
        }
        encoded.extend_from_slice(&char_bytes);
    }
    bytes.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&encoded);
}

/// Errors that can occur while migrating the legacy record.
#[derive(Debug)]
pub enum LegacyError {
    /// The record could not be read.
    Io(io::Error),
    /// The record ended early.
    Truncated,
    /// A string field is not valid UTF-8.
    InvalidUtf8,
    /// The version tag is not understood.
    UnsupportedVersion(i32),
    /// The legacy band code is not understood.
    UnknownBand(i32),
    /// The auth type is neither none nor PSK.
    UnknownAuthType(i32),
    /// The channel is negative.
    InvalidChannel(i32),
}

impl fmt::Display for LegacyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read legacy record: {}", e),
            Self::Truncated => write!(f, "legacy record is truncated"),
            Self::InvalidUtf8 => write!(f, "legacy record contains invalid UTF-8"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported legacy record version {}", v),
            Self::UnknownBand(b) => write!(f, "unknown legacy band {}", b),
            Self::UnknownAuthType(a) => write!(f, "unknown legacy auth type {}", a),
            Self::InvalidChannel(c) => write!(f, "invalid legacy channel {}", c),
        }
    }
}

impl std::error::Error for LegacyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
