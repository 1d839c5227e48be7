//! Stream demultiplexing for GNSS receivers.
//!
//! A receiver interleaves three protocols on one byte stream. Each is
//! recognised by its leading sync byte(s):
//! - NMEA 0183 sentences: `$` ... `\r\n`
//! - UBX binary messages: `0xB5 0x62`, little-endian length at offset 4
//! - RTCM3 correction frames: `0xD3`, 10-bit big-endian length at offset 1
//!
//! Bytes matching none of these are discarded one at a time until framing
//! resynchronises. Incomplete frames are retained until more bytes arrive.

pub mod chunker;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod reader;

pub use chunker::Chunker;
#[cfg(feature = "async")]
pub use codec::FrameCodec;
pub use codec::{next_frame, Frame, FrameConfig, DEFAULT_MAX_SENTENCE_LEN};
pub use error::{FrameError, Result};
pub use protocol::FrameKind;
pub use reader::FrameReader;
