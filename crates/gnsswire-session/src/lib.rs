//! Talking to a GNSS receiver over a duplex byte transport.
//!
//! - [`CommandQueue`] keeps one command in flight, correlates responses
//!   through a [`ResponseMatcher`] and enforces a per-command deadline.
//! - [`Session`] runs the queue, the frame decoder and the transport in a
//!   single tokio task and hands out decoded messages as a [`MessageStream`].
//! - [`MessageReader`] is the blocking, read-only counterpart for captures.

pub mod command;
pub mod config;
pub mod error;
pub mod matcher;
pub mod queue;
pub mod reader;
pub mod session;

pub use command::Command;
pub use config::{SessionConfig, DEFAULT_COMMAND_TIMEOUT};
pub use error::{CommandError, ReaderError, Result, SessionError};
pub use matcher::{AckMatcher, AcceptFirst, ResponseMatcher, Verdict};
pub use queue::{CommandQueue, Pending};
pub use reader::MessageReader;
pub use session::{MessageStream, Session};
