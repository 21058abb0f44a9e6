//! Streaming file-to-file compression.
//!
//! A file is opened for reading, wrapped in a [`CodecStream`] for the
//! requested direction, and pumped chunk by chunk into the output file.
//! Memory use is bounded by the configured chunk size regardless of how
//! large the input is.

use crate::config::BridgeConfig;
use crate::{BridgeError, Quality, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Which way bytes flow through the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Raw bytes in, Brotli stream out
    Compress(Quality),
    /// Brotli stream in, raw bytes out
    Decompress,
}

enum CodecReader<R: Read> {
    Compress(brotli::CompressorReader<R>),
    Decompress(brotli::Decompressor<R>),
}

/// A reader that compresses or decompresses an underlying byte source.
///
/// Owns its source; dropping the stream releases the codec state and the
/// source together.
pub struct CodecStream<R: Read> {
    reader: CodecReader<R>,
    direction: Direction,
}

impl<R: Read> CodecStream<R> {
    /// Wrap `source` in a codec bound to `direction`.
    pub fn new(source: R, direction: Direction, config: &BridgeConfig) -> Self {
        let reader = match direction {
            Direction::Compress(quality) => {
                CodecReader::Compress(brotli::CompressorReader::new(
                    source,
                    config.codec_buffer_size,
                    quality.get(),
                    config.window_bits,
                ))
            }
            Direction::Decompress => CodecReader::Decompress(brotli::Decompressor::new(
                source,
                config.codec_buffer_size,
            )),
        };
        Self { reader, direction }
    }

    /// Direction this stream was opened with.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The underlying byte source.
    pub fn get_ref(&self) -> &R {
        match &self.reader {
            CodecReader::Compress(r) => r.get_ref(),
            CodecReader::Decompress(r) => r.get_ref(),
        }
    }
}

impl<R: Read> Read for CodecStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.reader {
            CodecReader::Compress(r) => r.read(buf),
            CodecReader::Decompress(r) => {
                let n = r.read(buf)?;
                if n == 0 && !buf.is_empty() {
                    ensure_stream_end(r)?;
                }
                Ok(n)
            }
        }
    }
}

/// Fail with `InvalidData` if any byte follows the end of the Brotli stream,
/// whether still buffered in the decoder or not yet read from its source.
///
/// Call only after the decoder has returned `Ok(0)`.
pub(crate) fn ensure_stream_end<R: Read>(decoder: &mut brotli::Decompressor<R>) -> io::Result<()> {
    // A second read past the end fails on bytes left in the decoder's buffer.
    let mut byte = [0u8; 1];
    if matches!(decoder.read(&mut byte), Ok(0)) {
        loop {
            match decoder.get_mut().read(&mut byte) {
                Ok(0) => return Ok(()),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "unused bytes after end of Brotli stream",
    ))
}

/// Byte source that counts what has been read through it and remembers
/// whether it ever failed.
struct Counted<R> {
    inner: R,
    count: u64,
    failed: bool,
}

impl<R> Counted<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            count: 0,
            failed: false,
        }
    }
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.count += n as u64;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.failed = true;
                }
                Err(e)
            }
        }
    }
}

/// Bytes moved by one completed operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes consumed from the input
    pub bytes_in: u64,
    /// Bytes produced to the output
    pub bytes_out: u64,
}

impl Transfer {
    pub fn new(bytes_in: usize, bytes_out: usize) -> Self {
        Self {
            bytes_in: bytes_in as u64,
            bytes_out: bytes_out as u64,
        }
    }
}

/// Which side of a pump failed.
#[derive(Debug)]
pub enum PumpError {
    /// Reading from the source failed
    Read(io::Error),
    /// Writing to the sink failed
    Write(io::Error),
}

/// Copy `source` into `sink` through a reusable chunk buffer.
///
/// Only a zero-length read ends the copy; short reads are written and the
/// loop continues. Returns the number of bytes written.
pub fn pump<R, W>(
    source: &mut R,
    sink: &mut W,
    chunk: &mut [u8],
) -> std::result::Result<u64, PumpError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut written: u64 = 0;
    loop {
        let n = match source.read(chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PumpError::Read(e)),
        };
        sink.write_all(&chunk[..n]).map_err(PumpError::Write)?;
        written += n as u64;
        trace!(bytes = n, total = written, "chunk written");
    }
    sink.flush().map_err(PumpError::Write)?;
    Ok(written)
}

/// Stream `input` through the codec into `output`.
///
/// On failure the output file may be left truncated or empty; it is not
/// removed.
pub fn stream_file(
    input: &Path,
    output: &Path,
    direction: Direction,
    config: &BridgeConfig,
) -> Result<Transfer> {
    stream_file_to(input, output, direction, config, |path| File::create(path))
}

/// [`stream_file`] with the output opened by `create`.
fn stream_file_to<W, C>(
    input: &Path,
    output: &Path,
    direction: Direction,
    config: &BridgeConfig,
    create: C,
) -> Result<Transfer>
where
    W: Write,
    C: FnOnce(&Path) -> io::Result<W>,
{
    let source = File::open(input).map_err(|e| BridgeError::io(input, e))?;
    let mut codec = CodecStream::new(Counted::new(source), direction, config);
    let mut sink = create(output).map_err(|e| BridgeError::io(output, e))?;

    let mut chunk = vec![0u8; config.chunk_size];
    let result = pump(&mut codec, &mut sink, &mut chunk);
    let bytes_in = codec.get_ref().count;
    let source_failed = codec.get_ref().failed;

    // Release in reverse acquisition order. `File` swallows close errors
    // on drop, which keeps the pump result as the outcome.
    drop(sink);
    drop(codec);

    let bytes_out = result.map_err(|e| classify(e, direction, source_failed, input, output))?;
    debug!(
        input = %input.display(),
        output = %output.display(),
        ?direction,
        bytes_in,
        bytes_out,
        "stream completed"
    );
    Ok(Transfer {
        bytes_in,
        bytes_out,
    })
}

/// Compress a file with the given quality.
pub fn compress_file(
    input: &Path,
    output: &Path,
    quality: Quality,
    config: &BridgeConfig,
) -> Result<Transfer> {
    stream_file(input, output, Direction::Compress(quality), config)
}

/// Decompress a Brotli file.
pub fn decompress_file(input: &Path, output: &Path, config: &BridgeConfig) -> Result<Transfer> {
    stream_file(input, output, Direction::Decompress, config)
}

/// A read error the input file raised itself is an I/O failure on the input;
/// any other read error was raised by the codec.
fn classify(
    err: PumpError,
    direction: Direction,
    source_failed: bool,
    input: &Path,
    output: &Path,
) -> BridgeError {
    match err {
        PumpError::Read(e) if source_failed => BridgeError::io(input, e),
        PumpError::Read(e) => {
            let message = match direction {
                Direction::Compress(_) => "Brotli encoder failed",
                Direction::Decompress => "Brotli decoder could not consume input",
            };
            BridgeError::codec_io(message, e)
        }
        PumpError::Write(e) => BridgeError::io(output, e),
    }
}
