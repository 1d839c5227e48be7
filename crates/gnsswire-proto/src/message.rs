use std::fmt;

use bytes::Bytes;
use gnsswire_frame::protocol::{FrameKind, NMEA_SYNC, RTCM3_SYNC, UBX_SYNC};
use gnsswire_frame::Frame;
use serde::{Serialize, Serializer};

use crate::error::{DecodeError, EncodeError, Result};
use crate::nmea::NmeaSentence;
use crate::rtcm::Rtcm3Frame;
use crate::ubx::UbxMessage;

/// Sentences this short can't hold an address and checksum.
const MIN_NMEA_LEN: usize = 7;

/// A decoded frame of any protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Nmea(NmeaSentence),
    Ubx(UbxMessage),
    Rtcm3(Rtcm3Frame),
    /// Bytes no decoder recognised.
    Unknown(Bytes),
}

impl Message {
    /// Identify the protocol by leading bytes and decode.
    pub fn decode(raw: Bytes) -> Result<Self> {
        if raw.len() >= MIN_NMEA_LEN && raw[0] == NMEA_SYNC {
            return NmeaSentence::decode(raw).map(Message::Nmea);
        }
        if raw.starts_with(&UBX_SYNC) {
            return UbxMessage::decode(raw).map(Message::Ubx);
        }
        if raw.first() == Some(&RTCM3_SYNC) {
            if let Some(frame) = Rtcm3Frame::new(raw.clone()) {
                return Ok(Message::Rtcm3(frame));
            }
        }
        tracing::trace!(len = raw.len(), "unrecognised frame");
        Ok(Message::Unknown(raw))
    }

    /// Decode a frame cut by the demultiplexer.
    pub fn from_frame(frame: Frame) -> Result<Self> {
        Self::decode(frame.data)
    }

    /// Serialize for transmission. Only UBX messages can be encoded.
    pub fn encode(&self) -> std::result::Result<Bytes, EncodeError> {
        match self {
            Message::Ubx(msg) => msg.encode(),
            other => Err(EncodeError::NotEncodable { kind: other.kind_name() }),
        }
    }

    /// The frame bytes this message was decoded from.
    ///
    /// `None` only for UBX messages built locally rather than decoded.
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Message::Nmea(nmea) => Some(nmea.raw()),
            Message::Ubx(ubx) => ubx.frame(),
            Message::Rtcm3(rtcm) => Some(rtcm.raw()),
            Message::Unknown(raw) => Some(raw),
        }
    }

    /// The protocol this message belongs to, if any.
    pub fn kind(&self) -> Option<FrameKind> {
        match self {
            Message::Nmea(_) => Some(FrameKind::Nmea),
            Message::Ubx(_) => Some(FrameKind::Ubx),
            Message::Rtcm3(_) => Some(FrameKind::Rtcm3),
            Message::Unknown(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind().map_or("unknown", FrameKind::name)
    }

    pub fn as_ubx(&self) -> Option<&UbxMessage> {
        match self {
            Message::Ubx(msg) => Some(msg),
            _ => None,
        }
    }

    /// Short name: NMEA address, UBX message name, or RTCM message number.
    pub fn name(&self) -> String {
        match self {
            Message::Nmea(nmea) => nmea.address().to_string(),
            Message::Ubx(ubx) => ubx.name(),
            Message::Rtcm3(rtcm) => match rtcm.message_number() {
                Some(number) => format!("RTCM3-{number}"),
                None => "RTCM3".to_string(),
            },
            Message::Unknown(_) => "unknown".to_string(),
        }
    }
}

impl From<UbxMessage> for Message {
    fn from(msg: UbxMessage) -> Self {
        Message::Ubx(msg)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Nmea(nmea) => write!(f, "{nmea}"),
            Message::Ubx(ubx) => write!(f, "{ubx}"),
            Message::Rtcm3(rtcm) => write!(f, "{} ({} bytes)", self.name(), rtcm.payload_len()),
            Message::Unknown(raw) => {
                write!(f, "Unknown GPS message: {}", String::from_utf8_lossy(raw))
            }
        }
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Message", 4)?;
        s.serialize_field("protocol", self.kind_name())?;
        s.serialize_field("name", &self.name())?;
        match self {
            Message::Nmea(nmea) => s.serialize_field("data", nmea)?,
            Message::Ubx(ubx) => s.serialize_field("data", ubx.payload())?,
            Message::Rtcm3(rtcm) => s.serialize_field("data", rtcm)?,
            Message::Unknown(raw) => s.serialize_field("data", raw)?,
        }
        s.serialize_field("len", &self.raw().map_or(0, Bytes::len))?;
        s.end()
    }
}

/// Decode an already-framed message.
pub fn decode(raw: Bytes) -> Result<Message> {
    Message::decode(raw)
}

impl TryFrom<Frame> for Message {
    type Error = DecodeError;

    fn try_from(frame: Frame) -> Result<Self> {
        Message::from_frame(frame)
    }
}
