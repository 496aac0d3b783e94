//! Radio band selection and normalization.
//!
//! A [`Band`] is a bitmask over the 2.4, 5 and 6 GHz bands. [`Band::ANY`]
//! sets every bit and means "let normalization choose".
//!
//! # Example
//!
//! ```
//! use softap_config::softap::{Band, BandPolicy};
//!
//! let (band, changed) = BandPolicy::RestrictedRadio.normalize(Band::ANY);
//! assert_eq!(band, Band::FIVE_GHZ);
//! assert!(changed);
//!
//! let (band, changed) = BandPolicy::ConcurrentRadio.normalize(Band::FIVE_GHZ);
//! assert_eq!(band, Band::TWO_GHZ | Band::FIVE_GHZ);
//! assert!(changed);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Bitmask of radio bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Band(u8);

impl Band {
    /// 2.4 GHz.
    pub const TWO_GHZ: Band = Band(1 << 0);
    /// 5 GHz.
    pub const FIVE_GHZ: Band = Band(1 << 1);
    /// 6 GHz.
    pub const SIX_GHZ: Band = Band(1 << 2);
    /// Any supported band.
    pub const ANY: Band = Band(Self::TWO_GHZ.0 | Self::FIVE_GHZ.0 | Self::SIX_GHZ.0);

    /// Build a band from raw bits. Unknown bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Band(bits & Self::ANY.0)
    }

    /// Raw bitmask value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Band) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if `self` and `other` share at least one band.
    pub const fn intersects(self, other: Band) -> bool {
        self.0 & other.0 != 0
    }

    /// True if no band is selected.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if exactly one band is selected.
    pub const fn is_single(self) -> bool {
        self.0.count_ones() == 1
    }
}

impl Default for Band {
    fn default() -> Self {
        Self::TWO_GHZ
    }
}

impl BitOr for Band {
    type Output = Band;

    fn bitor(self, rhs: Band) -> Band {
        Band(self.0 | rhs.0)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return write!(f, "any");
        }
        if self.is_empty() {
            return write!(f, "none");
        }
        let names = [
            (Self::TWO_GHZ, "2.4GHz"),
            (Self::FIVE_GHZ, "5GHz"),
            (Self::SIX_GHZ, "6GHz"),
        ];
        let mut first = true;
        for (band, name) in names {
            if self.contains(band) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// How a device's radio handles multi-band requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPolicy {
    /// Only one band at a time. `ANY` collapses to 5 GHz and masks without
    /// 5 GHz collapse to 2.4 GHz.
    RestrictedRadio,
    /// 2.4 GHz and 5 GHz run concurrently. A 5 GHz-only request is widened.
    ConcurrentRadio,
}

impl BandPolicy {
    /// Select the policy from the "convert 5 GHz to any" capability flag.
    pub fn from_capability(converts_5ghz_to_any: bool) -> Self {
        if converts_5ghz_to_any {
            Self::ConcurrentRadio
        } else {
            Self::RestrictedRadio
        }
    }

    /// Normalize a band selection.
    ///
    /// Returns the normalized band and whether it differs from the input.
    /// Normalizing an already-normalized band is a no-op.
    pub fn normalize(self, band: Band) -> (Band, bool) {
        let normalized = match self {
            Self::RestrictedRadio => restrict(band),
            Self::ConcurrentRadio => widen(band),
        };
        (normalized, normalized != band)
    }
}

fn restrict(band: Band) -> Band {
    if band == Band::ANY {
        return Band::FIVE_GHZ;
    }
    // Masks that already include 5 GHz are honored as-is.
    if band.is_empty() || band.contains(Band::FIVE_GHZ) || band == Band::TWO_GHZ {
        return band;
    }
    Band::TWO_GHZ
}

fn widen(band: Band) -> Band {
    if band == Band::FIVE_GHZ {
        Band::TWO_GHZ | Band::FIVE_GHZ
    } else {
        band
    }
}
