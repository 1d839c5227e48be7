//! Message codecs for GNSS receiver protocols.
//!
//! Takes frames cut by `gnsswire-frame` and turns them into typed messages:
//! - NMEA sentences, checksum-verified, fields left as text
//! - UBX messages, with a catalogue of known ACK/CFG/NAV payloads
//! - RTCM3 frames, passed through opaquely
//!
//! UBX messages can also be built and encoded for transmission.
//!
//! # Example
//!
//! ```
//! use gnsswire_proto::{Message, ubx::{CfgMsg, UbxMessage}};
//!
//! let wire = UbxMessage::from(CfgMsg::poll(0x03, 0x01)).encode().unwrap();
//! assert_eq!(wire.as_ref(), &[0xB5, 0x62, 0x06, 0x01, 0x02, 0x00, 0x03, 0x01, 0x0D, 0x38]);
//!
//! let msg = Message::decode(wire).unwrap();
//! assert_eq!(msg.name(), "UBX-CFG-MSG");
//! ```

pub mod bitfield;
pub mod checksum;
pub mod error;
pub mod message;
pub mod nmea;
pub mod rtcm;
pub mod ubx;

pub use error::{DecodeError, EncodeError, ParseNameError, Result};
pub use message::{decode, Message};
pub use nmea::NmeaSentence;
pub use rtcm::Rtcm3Frame;
pub use ubx::{UbxMessage, UbxPayload};
