//! Error types for the bridge crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input text is not valid base64
    MalformedInput,
    /// Decompressed bytes are not valid UTF-8
    Encoding,
    /// The codec rejected its input or failed internally
    Codec,
    /// A file could not be opened, read, or written
    Io,
    /// Configuration could not be loaded or is invalid
    Config,
}

impl ErrorKind {
    /// Stable code string for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput => "MALFORMED_INPUT",
            Self::Encoding => "ENCODING",
            Self::Codec => "CODEC",
            Self::Io => "IO",
            Self::Config => "CONFIG",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors that can occur inside a bridge operation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Base64 input did not decode
    #[error("Malformed base64 input: {0}")]
    MalformedInput(#[from] base64::DecodeError),

    /// UTF-8 interpretation of decompressed output failed
    #[error("Decompressed data is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Encoder or decoder failure
    #[error("Codec error: {message}")]
    Codec {
        /// What the codec was doing
        message: String,
        /// Underlying stream error, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// Filesystem failure on one of the operation's paths
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path being opened, read, or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Create a codec error without an underlying cause
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
            source: None,
        }
    }

    /// Create a codec error wrapping a stream error
    pub fn codec_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Codec {
            message: format!("{}: {}", message.into(), source),
            source: Some(source),
        }
    }

    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Codec { .. } => ErrorKind::Codec,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
