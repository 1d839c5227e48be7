//! RTCM3 correction frames, passed through opaquely.

use bytes::Bytes;
use gnsswire_frame::protocol::{RTCM3_LENGTH_MASK, RTCM3_OVERHEAD, RTCM3_SYNC};
use serde::{Serialize, Serializer};

/// An RTCM3 frame. The CRC-24 is not verified and the payload is not parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rtcm3Frame {
    raw: Bytes,
}

impl Rtcm3Frame {
    /// Wrap `raw` if it is a well-formed RTCM3 frame: preamble, and a total
    /// length matching the 10-bit length field.
    pub fn new(raw: Bytes) -> Option<Self> {
        if raw.len() < RTCM3_OVERHEAD || raw[0] != RTCM3_SYNC {
            return None;
        }
        let declared = usize::from(u16::from_be_bytes([raw[1], raw[2]]) & RTCM3_LENGTH_MASK);
        if raw.len() != declared + RTCM3_OVERHEAD {
            return None;
        }
        Some(Self { raw })
    }

    /// Declared payload length.
    pub fn payload_len(&self) -> usize {
        self.raw.len() - RTCM3_OVERHEAD
    }

    /// Payload bytes between the length field and the CRC.
    pub fn payload(&self) -> Bytes {
        self.raw.slice(3..3 + self.payload_len())
    }

    /// RTCM message number: the first 12 bits of the payload.
    pub fn message_number(&self) -> Option<u16> {
        match self.payload().as_ref() {
            [hi, lo, ..] => Some((u16::from(*hi) << 4) | (u16::from(*lo) >> 4)),
            _ => None,
        }
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

impl Serialize for Rtcm3Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Rtcm3Frame", 2)?;
        s.serialize_field("messageNumber", &self.message_number())?;
        s.serialize_field("payloadLen", &self.payload_len())?;
        s.end()
    }
}
