use bytes::{Bytes, BytesMut};

use crate::codec::{next_frame_counted, Frame, FrameConfig};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Push-style demultiplexer: feed arbitrary chunks, get complete frames back.
///
/// Unconsumed bytes are retained between calls, so frames come out identical
/// no matter where the chunk boundaries fall.
#[derive(Debug)]
pub struct Chunker {
    buf: BytesMut,
    config: FrameConfig,
    discarded: u64,
}

impl Chunker {
    /// Create a chunker with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a chunker with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarded: 0,
        }
    }

    /// Append a chunk and return every frame that is now complete, in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Cut the next complete frame from the retained bytes, if any.
    pub fn next_frame(&mut self) -> Option<Frame> {
        next_frame_counted(&mut self.buf, &self.config, &mut self.discarded)
    }

    /// Take whatever is still buffered. The bytes form no complete frame.
    pub fn flush(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Number of bytes currently retained.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes discarded while resynchronising.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}
