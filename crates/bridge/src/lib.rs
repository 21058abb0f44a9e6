//! Brotli compression bridge.
//!
//! This crate provides:
//! - Base64 buffer operations (`compress`, `decompress`, `decompressToBase64`)
//! - Streaming file operations (`compressFile`, `decompressFile`) with bounded memory
//! - Quality clamping into Brotli's `[0, 11]` range
//! - Structured, classified failures for every operation
//!
//! # Example
//!
//! ```rust,no_run
//! use brotli_bridge::Bridge;
//!
//! # async fn demo() -> Result<(), brotli_bridge::OperationError> {
//! let bridge = Bridge::new();
//! let packed = bridge.compress("aGVsbG8gd29ybGQ=", Some(9.0)).await?;
//! let text = bridge.decompress(packed).await?;
//! assert_eq!(text, "hello world");
//!
//! bridge.compress_file("/tmp/report.json", "/tmp/report.json.br", None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod config;
mod error;
pub mod ops;
pub mod quality;
pub mod stream;
pub mod transcode;

pub use buffer::{decode_buffer, encode_buffer, BufferCodec};
pub use config::BridgeConfig;
pub use error::{BridgeError, ErrorKind, Result};
pub use ops::{Bridge, ErrorReport, Invocation, OpResult, Operation, OperationError, Outcome};
pub use quality::{normalize, Quality, DEFAULT_QUALITY};
pub use stream::{compress_file, decompress_file, CodecStream, Direction, Transfer};
