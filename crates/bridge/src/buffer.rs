//! One-shot whole-buffer Brotli compression.
//!
//! Input and output live entirely in memory. Use [`crate::stream`] for
//! payloads that should not be buffered.

use crate::config::{BridgeConfig, DEFAULT_CODEC_BUFFER_SIZE, DEFAULT_WINDOW_BITS};
use crate::stream::ensure_stream_end;
use crate::{BridgeError, Quality, Result};
use std::io::Read;

/// Buffer codec parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCodec {
    window_bits: u32,
    buffer_size: usize,
}

impl Default for BufferCodec {
    fn default() -> Self {
        Self {
            window_bits: DEFAULT_WINDOW_BITS,
            buffer_size: DEFAULT_CODEC_BUFFER_SIZE,
        }
    }
}

impl BufferCodec {
    /// Codec parameters taken from a validated configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            window_bits: config.window_bits,
            buffer_size: config.codec_buffer_size,
        }
    }

    /// Compress a whole buffer in a single encoder call.
    ///
    /// An empty result is treated as an encoder fault: a valid Brotli
    /// stream is never zero bytes long, even for empty input.
    #[allow(clippy::cast_possible_wrap)]
    pub fn encode(&self, data: &[u8], quality: Quality) -> Result<Vec<u8>> {
        let params = brotli::enc::BrotliEncoderParams {
            quality: quality.get() as i32,
            lgwin: self.window_bits as i32,
            ..Default::default()
        };

        let mut input = data;
        let mut output = Vec::with_capacity(data.len() / 2 + 64);
        brotli::BrotliCompress(&mut input, &mut output, &params)
            .map_err(|e| BridgeError::codec_io("Brotli encoder failed", e))?;

        if output.is_empty() {
            return Err(BridgeError::codec("Brotli encoder returned no output"));
        }

        tracing::trace!(
            input_len = data.len(),
            output_len = output.len(),
            quality = quality.get(),
            "buffer encoded"
        );
        Ok(output)
    }

    /// Decompress a whole buffer, reading the stream to exhaustion.
    ///
    /// Truncated or corrupt input fails rather than yielding a prefix, and
    /// so does any byte following the end of the stream.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut decoder = brotli::Decompressor::new(data, self.buffer_size);
        decoder
            .read_to_end(&mut output)
            .and_then(|_| ensure_stream_end(&mut decoder))
            .map_err(|e| BridgeError::codec_io("Brotli decoder could not consume input", e))?;

        tracing::trace!(
            input_len = data.len(),
            output_len = output.len(),
            "buffer decoded"
        );
        Ok(output)
    }
}

/// Compress data using Brotli with default codec parameters.
///
/// # Arguments
/// * `data` - Data to compress
/// * `quality` - Compression quality
///
/// # Returns
/// Compressed data
pub fn encode_buffer(data: &[u8], quality: Quality) -> Result<Vec<u8>> {
    BufferCodec::default().encode(data, quality)
}

/// Decompress Brotli data with default codec parameters.
pub fn decode_buffer(data: &[u8]) -> Result<Vec<u8>> {
    BufferCodec::default().decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_roundtrip() {
        let original = b"Hello, World! This is a test of Brotli compression.";
        let compressed = encode_buffer(original, Quality::default()).unwrap();
        let decompressed = decode_buffer(&compressed).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_empty_input_roundtrip() {
        let compressed = encode_buffer(b"", Quality::BEST).unwrap();
        assert!(!compressed.is_empty());
        assert!(decode_buffer(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_compression_ratio() {
        let data = "a".repeat(1000);
        let compressed = encode_buffer(data.as_bytes(), Quality::BEST).unwrap();
        assert!(compressed.len() < data.len() / 10);
    }

    #[test]
    fn test_higher_quality_not_larger_on_redundant_input() {
        let data = b"aaaaaaaaaa";
        let fast = encode_buffer(data, Quality::FASTEST).unwrap();
        let best = encode_buffer(data, Quality::BEST).unwrap();

        assert_eq!(decode_buffer(&fast).unwrap(), data);
        assert_eq!(decode_buffer(&best).unwrap(), data);
        assert!(best.len() <= fast.len());
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let err = decode_buffer(b"definitely not brotli").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_truncated_stream_is_codec_error() {
        let data = "The quick brown fox jumps over the lazy dog. ".repeat(200);
        let compressed = encode_buffer(data.as_bytes(), Quality::default()).unwrap();
        let truncated = &compressed[..compressed.len() / 2];

        let err = decode_buffer(truncated).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_trailing_bytes_are_codec_error() {
        let mut packed = encode_buffer(b"hello world", Quality::default()).unwrap();
        packed.extend_from_slice(b"TRAILING JUNK BYTES");

        let err = decode_buffer(&packed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
        assert!(err.to_string().contains("unused bytes"));
    }

    #[test]
    fn test_single_trailing_byte_is_codec_error() {
        let data = "x".repeat(10_000);
        let mut packed = encode_buffer(data.as_bytes(), Quality::BEST).unwrap();
        packed.push(0);

        let codec = BufferCodec::from_config(&BridgeConfig {
            codec_buffer_size: 1,
            ..BridgeConfig::default()
        });
        assert_eq!(codec.decode(&packed).unwrap_err().kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_empty_input_is_not_a_stream() {
        let err = decode_buffer(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_custom_window() {
        let config = BridgeConfig {
            window_bits: 16,
            ..BridgeConfig::default()
        };
        let codec = BufferCodec::from_config(&config);
        let data = vec![7u8; 100_000];
        let compressed = codec.encode(&data, Quality::new(5)).unwrap();
        assert_eq!(codec.decode(&compressed).unwrap(), data);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn roundtrip_any_bytes_any_quality(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            q in 0u32..=11,
        ) {
            let compressed = encode_buffer(&data, Quality::new(q)).unwrap();
            prop_assert_eq!(decode_buffer(&compressed).unwrap(), data);
        }
    }
}
