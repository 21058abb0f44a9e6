//! Bridge configuration
//!
//! TOML file with serde defaults, optionally overridden from the environment.

use crate::quality::{self, Quality};
use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default streaming chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default internal buffer size handed to the codec
pub const DEFAULT_CODEC_BUFFER_SIZE: usize = 4096;

/// Default Brotli window (`lgwin`)
pub const DEFAULT_WINDOW_BITS: u32 = 22;

/// Smallest window Brotli accepts
pub const MIN_WINDOW_BITS: u32 = 10;

/// Largest window Brotli accepts without large-window mode
pub const MAX_WINDOW_BITS: u32 = 24;

/// Overrides the chunk size
pub const ENV_CHUNK_SIZE: &str = "BROTLI_BRIDGE_CHUNK_SIZE";

/// Overrides the default quality
pub const ENV_QUALITY: &str = "BROTLI_BRIDGE_QUALITY";

const CONFIG_CANDIDATES: [&str; 3] = [
    ".brotli-bridge.toml",
    "brotli-bridge.toml",
    ".config/brotli-bridge.toml",
];

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bytes pulled from the codec stream per streaming iteration
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Internal buffer size for codec readers
    #[serde(default = "default_codec_buffer_size")]
    pub codec_buffer_size: usize,

    /// Encoder window (`lgwin`)
    #[serde(default = "default_window_bits")]
    pub window_bits: u32,

    /// Quality applied when a caller omits one
    #[serde(default)]
    pub default_quality: Quality,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            codec_buffer_size: default_codec_buffer_size(),
            window_bits: default_window_bits(),
            default_quality: Quality::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_codec_buffer_size() -> usize {
    DEFAULT_CODEC_BUFFER_SIZE
}

fn default_window_bits() -> u32 {
    DEFAULT_WINDOW_BITS
}

impl BridgeConfig {
    /// Load configuration from a file path, a discovered file, or defaults.
    ///
    /// An explicit path must exist. Without one, the first existing
    /// candidate in the working directory is used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

        let config = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BridgeError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BROTLI_BRIDGE_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_CHUNK_SIZE).ok().as_deref(),
            std::env::var(ENV_QUALITY).ok().as_deref(),
        )
    }

    fn with_overrides(
        mut self,
        chunk_size: Option<&str>,
        default_quality: Option<&str>,
    ) -> Result<Self> {
        if let Some(raw) = chunk_size {
            self.chunk_size = raw.trim().parse().map_err(|_| {
                BridgeError::config(format!(
                    "{} must be a positive integer, got {:?}",
                    ENV_CHUNK_SIZE, raw
                ))
            })?;
        }

        if let Some(raw) = default_quality {
            let requested: f64 = raw.trim().parse().map_err(|_| {
                BridgeError::config(format!("{} must be a number, got {:?}", ENV_QUALITY, raw))
            })?;
            self.default_quality = quality::normalize(requested);
        }

        self.validate()?;
        Ok(self)
    }

    /// Check structural limits.
    ///
    /// Quality is never rejected here; it is already clamped.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BridgeError::config("chunk_size must be greater than zero"));
        }
        if self.codec_buffer_size == 0 {
            return Err(BridgeError::config("codec_buffer_size must be greater than zero"));
        }
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(BridgeError::config(format!(
                "window_bits must be between {} and {}, got {}",
                MIN_WINDOW_BITS, MAX_WINDOW_BITS, self.window_bits
            )));
        }
        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<BridgeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BridgeError::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        BridgeError::config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}
