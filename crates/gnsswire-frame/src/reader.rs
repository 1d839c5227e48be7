use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{next_frame_counted, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    discarded: u64,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarded: 0,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = next_frame_counted(&mut self.buf, &self.config, &mut self.discarded)
            {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed {
                    buffered: self.buf.len(),
                });
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Number of bytes discarded while resynchronising.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
