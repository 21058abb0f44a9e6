//! Compression quality policy.
//!
//! Brotli accepts qualities 0 through 11. Requested values arrive as
//! arbitrary numbers from the host and are truncated and clamped into
//! range rather than rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest quality accepted by the encoder.
pub const MIN_QUALITY: u32 = 0;

/// Highest quality accepted by the encoder.
pub const MAX_QUALITY: u32 = 11;

/// Quality used when the caller does not specify one.
pub const DEFAULT_QUALITY: u32 = 6;

/// A compression quality guaranteed to lie in `[0, 11]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u32")]
pub struct Quality(u32);

impl Quality {
    /// Fastest setting.
    pub const FASTEST: Self = Self(MIN_QUALITY);

    /// Densest setting.
    pub const BEST: Self = Self(MAX_QUALITY);

    /// Clamp an integer quality into range.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.min(MAX_QUALITY))
    }

    /// The clamped value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl From<f64> for Quality {
    fn from(requested: f64) -> Self {
        normalize(requested)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a requested quality.
///
/// Truncates toward zero, then clamps to `[0, 11]`. The float-to-int cast
/// saturates, so NaN becomes 0 and infinities land on the bounds.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize(requested: f64) -> Quality {
    let truncated = requested as i64;
    Quality(truncated.clamp(i64::from(MIN_QUALITY), i64::from(MAX_QUALITY)) as u32)
}
