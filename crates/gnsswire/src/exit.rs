use std::fmt;
use std::io;

use gnsswire_frame::FrameError;
use gnsswire_proto::{DecodeError, Message};
use gnsswire_session::{CommandError, ReaderError, SessionError};

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const REJECTED: i32 = 2;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn decode_error(context: &str, err: &DecodeError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn reader_error(context: &str, err: ReaderError) -> CliError {
    match err {
        ReaderError::Frame(err) => frame_error(context, err),
        ReaderError::Decode(err) => decode_error(context, &err),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Io(source) => io_error(context, source),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
    }
}

pub fn command_error(context: &str, err: CommandError<Message>) -> CliError {
    match err {
        CommandError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        CommandError::Rejected(ref nak) => {
            CliError::new(REJECTED, format!("{context}: {err} ({nak})"))
        }
        CommandError::CommandType(_) => CliError::new(USAGE, format!("{context}: {err}")),
        CommandError::Serialization(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        CommandError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
    }
}
