//! Public asynchronous operations.
//!
//! Each call is dispatched onto Tokio's blocking pool and resolves to
//! exactly one outcome: a success value or an [`OperationError`]. Calls
//! share no mutable state; two calls writing the same output path race at
//! the filesystem.

use crate::buffer::BufferCodec;
use crate::config::BridgeConfig;
use crate::error::ErrorKind;
use crate::quality::{self, Quality};
use crate::stream::{self, Direction, Transfer};
use crate::{transcode, BridgeError, Result};
use brotli_bridge_telemetry::{metrics, Timer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Result type alias for façade operations.
pub type OpResult<T> = std::result::Result<T, OperationError>;

/// The operations exposed to a host, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Compress base64 data, returning base64
    Compress,
    /// Decompress base64 data, returning UTF-8 text
    Decompress,
    /// Decompress base64 data, returning base64
    DecompressToBase64,
    /// Compress one file into another
    CompressFile,
    /// Decompress one file into another
    DecompressFile,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Operation; 5] = [
        Self::Compress,
        Self::Decompress,
        Self::DecompressToBase64,
        Self::CompressFile,
        Self::DecompressFile,
    ];

    /// Name a host uses to invoke this operation
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Decompress => "decompress",
            Self::DecompressToBase64 => "decompressToBase64",
            Self::CompressFile => "compressFile",
            Self::DecompressFile => "decompressFile",
        }
    }

    /// Code attached to a rejected outcome
    pub fn rejection_code(&self) -> &'static str {
        match self {
            Self::Compress | Self::CompressFile => "BROTLI_COMPRESS_ERROR",
            Self::Decompress | Self::DecompressToBase64 | Self::DecompressFile => {
                "BROTLI_DECOMPRESS_ERROR"
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Self::Compress => "Failed to compress data",
            Self::Decompress | Self::DecompressToBase64 => "Failed to decompress data",
            Self::CompressFile => "Failed to compress file",
            Self::DecompressFile => "Failed to decompress file",
        }
    }

    fn metric(&self, suffix: &str) -> String {
        format!("bridge.{}.{}", self.name(), suffix)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name matches no operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// A rejected outcome: which operation failed and why.
#[derive(Debug, Error)]
#[error("{}: {}", .operation.failure_message(), .source)]
pub struct OperationError {
    /// The operation that failed
    pub operation: Operation,
    /// Classified cause
    #[source]
    pub source: BridgeError,
}

impl OperationError {
    /// Classification of the failure
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Code attached to the rejection
    #[must_use]
    pub fn rejection_code(&self) -> &'static str {
        self.operation.rejection_code()
    }

    /// Convert to a serializable report
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            operation: self.operation,
            code: self.rejection_code().to_string(),
            kind: self.kind(),
            message: self.to_string(),
            cause: std::error::Error::source(&self.source).map(ToString::to_string),
        }
    }
}

/// Serializable error report for logs and host responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub operation: Operation,
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// A by-name request, as a host would send it.
///
/// ```json
/// {"op": "compressFile", "inputPath": "/tmp/a", "outputPath": "/tmp/a.br", "quality": 9}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Invocation {
    Compress {
        data: String,
        #[serde(default)]
        quality: Option<f64>,
    },
    Decompress {
        data: String,
    },
    DecompressToBase64 {
        data: String,
    },
    #[serde(rename_all = "camelCase")]
    CompressFile {
        input_path: PathBuf,
        output_path: PathBuf,
        #[serde(default)]
        quality: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    DecompressFile {
        input_path: PathBuf,
        output_path: PathBuf,
    },
}

impl Invocation {
    /// Parse a JSON request
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The operation this request targets
    pub fn operation(&self) -> Operation {
        match self {
            Self::Compress { .. } => Operation::Compress,
            Self::Decompress { .. } => Operation::Decompress,
            Self::DecompressToBase64 { .. } => Operation::DecompressToBase64,
            Self::CompressFile { .. } => Operation::CompressFile,
            Self::DecompressFile { .. } => Operation::DecompressFile,
        }
    }
}

/// Success value of a by-name request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Text result of a buffer operation
    Text(String),
    /// File operations resolve with no value
    Unit,
}

/// Entry point for all operations.
///
/// Cheap to clone; clones share the same read-only configuration. Every
/// method must be awaited inside a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    config: Arc<BridgeConfig>,
}

impl Bridge {
    /// Bridge with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge with a specific configuration
    pub fn with_config(config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn quality(&self, requested: Option<f64>) -> Quality {
        requested.map_or(self.config.default_quality, quality::normalize)
    }

    /// Compress base64 `data`, returning base64.
    ///
    /// `quality` defaults to the configured quality and is clamped into
    /// `[0, 11]`, never rejected.
    pub async fn compress(
        &self,
        data: impl Into<String>,
        quality: Option<f64>,
    ) -> OpResult<String> {
        let data = data.into();
        let quality = self.quality(quality);
        self.run(Operation::Compress, move |config| {
            let raw = transcode::decode(&data)?;
            let compressed = BufferCodec::from_config(config).encode(&raw, quality)?;
            let transfer = Transfer::new(raw.len(), compressed.len());
            Ok((transcode::encode(&compressed), transfer))
        })
        .await
    }

    /// Decompress base64 `data` into UTF-8 text.
    pub async fn decompress(&self, data: impl Into<String>) -> OpResult<String> {
        let data = data.into();
        self.run(Operation::Decompress, move |config| {
            let raw = transcode::decode(&data)?;
            let plain = BufferCodec::from_config(config).decode(&raw)?;
            let transfer = Transfer::new(raw.len(), plain.len());
            Ok((transcode::into_utf8(plain)?, transfer))
        })
        .await
    }

    /// Decompress base64 `data`, returning the raw bytes as base64.
    pub async fn decompress_to_base64(&self, data: impl Into<String>) -> OpResult<String> {
        let data = data.into();
        self.run(Operation::DecompressToBase64, move |config| {
            let raw = transcode::decode(&data)?;
            let plain = BufferCodec::from_config(config).decode(&raw)?;
            let transfer = Transfer::new(raw.len(), plain.len());
            Ok((transcode::encode(&plain), transfer))
        })
        .await
    }

    /// Compress the file at `input` into `output`.
    ///
    /// A failed call may leave a partial file at `output`.
    pub async fn compress_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        quality: Option<f64>,
    ) -> OpResult<()> {
        let input = input.as_ref().to_path_buf();
        let output = output.as_ref().to_path_buf();
        let quality = self.quality(quality);
        self.run(Operation::CompressFile, move |config| {
            let direction = Direction::Compress(quality);
            stream::stream_file(&input, &output, direction, config).map(|t| ((), t))
        })
        .await
    }

    /// Decompress the Brotli file at `input` into `output`.
    ///
    /// A failed call may leave a partial file at `output`.
    pub async fn decompress_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> OpResult<()> {
        let input = input.as_ref().to_path_buf();
        let output = output.as_ref().to_path_buf();
        self.run(Operation::DecompressFile, move |config| {
            stream::stream_file(&input, &output, Direction::Decompress, config).map(|t| ((), t))
        })
        .await
    }

    /// Dispatch a by-name request.
    pub async fn invoke(&self, invocation: Invocation) -> OpResult<Outcome> {
        match invocation {
            Invocation::Compress { data, quality } => {
                self.compress(data, quality).await.map(Outcome::Text)
            }
            Invocation::Decompress { data } => self.decompress(data).await.map(Outcome::Text),
            Invocation::DecompressToBase64 { data } => {
                self.decompress_to_base64(data).await.map(Outcome::Text)
            }
            Invocation::CompressFile {
                input_path,
                output_path,
                quality,
            } => self
                .compress_file(input_path, output_path, quality)
                .await
                .map(|()| Outcome::Unit),
            Invocation::DecompressFile {
                input_path,
                output_path,
            } => self
                .decompress_file(input_path, output_path)
                .await
                .map(|()| Outcome::Unit),
        }
    }

    /// Run `work` on the blocking pool and normalize its outcome.
    ///
    /// A panic inside `work` is caught by the runtime and surfaces as a
    /// codec failure instead of an unresolved call. Byte counts are only
    /// recorded for successful calls.
    #[instrument(skip_all, fields(op = %operation))]
    async fn run<T, F>(&self, operation: Operation, work: F) -> OpResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&BridgeConfig) -> Result<(T, Transfer)> + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let timer = Timer::start(operation.metric("duration_ms"));
        debug!("operation dispatched");

        let outcome = match tokio::task::spawn_blocking(move || work(&config)).await {
            Ok(result) => result,
            Err(join_error) => Err(BridgeError::codec(format!(
                "operation aborted: {}",
                join_error
            ))),
        };

        let elapsed = timer.stop();
        match outcome {
            Ok((value, transfer)) => {
                let registry = metrics();
                registry.increment(&operation.metric("success"));
                registry.increment_by(&operation.metric("bytes_in"), transfer.bytes_in);
                registry.increment_by(&operation.metric("bytes_out"), transfer.bytes_out);
                debug!(
                    duration_ms = elapsed.as_millis(),
                    bytes_in = transfer.bytes_in,
                    bytes_out = transfer.bytes_out,
                    "operation succeeded"
                );
                Ok(value)
            }
            Err(source) => {
                metrics().increment(&operation.metric("failure"));
                warn!(kind = %source.kind(), error = %source, "operation failed");
                Err(OperationError { operation, source })
            }
        }
    }
}
