use std::io::Read;

use gnsswire_frame::{FrameConfig, FrameError, FrameReader};
use gnsswire_proto::Message;

use crate::error::ReaderError;

/// Blocking, lazy sequence of decoded messages from any `Read` stream.
///
/// Decode failures are yielded per frame and iteration continues. The
/// sequence ends at EOF; a stream error is yielded once and ends it.
pub struct MessageReader<R> {
    frames: FrameReader<R>,
    done: bool,
}

impl<R: Read> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: R, config: FrameConfig) -> Self {
        Self {
            frames: FrameReader::with_config(inner, config),
            done: false,
        }
    }

    /// Bytes skipped while resynchronising so far.
    pub fn discarded(&self) -> u64 {
        self.frames.discarded()
    }

    pub fn into_inner(self) -> R {
        self.frames.into_inner()
    }
}

impl<R: Read> Iterator for MessageReader<R> {
    type Item = Result<Message, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.frames.read_frame() {
            Ok(frame) => Some(Message::from_frame(frame).map_err(ReaderError::from)),
            Err(FrameError::ConnectionClosed { buffered }) => {
                if buffered > 0 {
                    tracing::debug!(buffered, "incomplete frame at end of stream");
                }
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}
