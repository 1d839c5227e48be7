//! Framing, decoding and command sessions for u-blox GNSS receivers.
//!
//! A receiver's serial stream interleaves NMEA sentences, UBX binary
//! messages and RTCM3 corrections. gnsswire splits that stream into frames,
//! decodes them into typed messages and correlates configuration commands
//! with the receiver's ACK/NAK responses.
//!
//! # Crate Structure
//!
//! - [`frame`]: protocol demultiplexing of a raw byte stream
//! - [`proto`]: NMEA, UBX and RTCM3 message types and codecs
//! - [`session`]: command queue and async session (behind `session` feature)

/// Re-export frame types.
pub mod frame {
    pub use gnsswire_frame::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use gnsswire_proto::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use gnsswire_session::*;
}
