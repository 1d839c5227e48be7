use std::time::Duration;

use gnsswire_frame::FrameError;
use gnsswire_proto::{DecodeError, EncodeError};

/// Why a command did not resolve.
///
/// `R` is the response type; a receiver-side rejection carries the
/// response that rejected the command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError<R> {
    /// No matching response arrived before the deadline.
    #[error("command timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The receiver explicitly rejected the command.
    #[error("command rejected by receiver")]
    Rejected(Box<R>),

    /// The matcher can't correlate this kind of command.
    #[error("unsupported command: {0}")]
    CommandType(String),

    /// The command could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] EncodeError),

    /// The queue shut down before the command settled.
    #[error("command queue closed")]
    Closed,
}

impl<R> CommandError<R> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout(_))
    }

    /// The rejecting response, if the receiver rejected the command.
    pub fn rejection(&self) -> Option<&R> {
        match self {
            CommandError::Rejected(response) => Some(response),
            _ => None,
        }
    }
}

/// Errors from the session driver and its pass-through writes.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading frames from the transport failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The session driver has stopped.
    #[error("session closed")]
    Closed,
}

/// Errors yielded by the blocking [`MessageReader`](crate::MessageReader).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The underlying stream failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// One frame failed to decode. Reading can continue.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
