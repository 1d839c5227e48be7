//! UBX binary protocol: framing, checksum and the message catalogue.
//!
//! Wire format:
//! ```text
//! ┌───────────┬───────┬────┬──────────┬─────────────┬───────────┐
//! │ Sync (2B) │ Class │ Id │ Length   │ Payload     │ CK_A CK_B │
//! │ 0xB5 0x62 │ (1B)  │(1B)│ (2B LE)  │ (Length B)  │ (2B)      │
//! └───────────┴───────┴────┴──────────┴─────────────┴───────────┘
//! ```
//! The checksum covers class through the end of the payload.

pub mod ack;
pub mod cfg;
pub mod nav;

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use gnsswire_frame::protocol::{UBX_HEADER_LEN, UBX_OVERHEAD, UBX_SYNC};
use serde::Serialize;

use crate::checksum::ubx_checksum;
use crate::error::{DecodeError, EncodeError, Result};

pub use ack::Ack;
pub use cfg::{CfgMsg, CfgNav5, CfgRate, DynModel, FixMode, MsgRate};
pub use nav::{NavHpPosLlh, NavPvt, NavSat, NavSvin, SatInfo};

/// Message class identifiers.
pub mod class {
    pub const NAV: u8 = 0x01;
    pub const ACK: u8 = 0x05;
    pub const CFG: u8 = 0x06;
}

/// Message ids within their class.
pub mod id {
    pub const ACK_NAK: u8 = 0x00;
    pub const ACK_ACK: u8 = 0x01;

    pub const CFG_MSG: u8 = 0x01;
    pub const CFG_RATE: u8 = 0x08;
    pub const CFG_NAV5: u8 = 0x24;

    pub const NAV_PVT: u8 = 0x07;
    pub const NAV_HPPOSLLH: u8 = 0x14;
    pub const NAV_SAT: u8 = 0x35;
    pub const NAV_SVIN: u8 = 0x3B;
}

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Decoded UBX payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UbxPayload {
    AckAck(Ack),
    AckNak(Ack),
    CfgMsg(CfgMsg),
    CfgRate(CfgRate),
    CfgNav5(CfgNav5),
    NavHpPosLlh(NavHpPosLlh),
    NavSvin(NavSvin),
    NavPvt(NavPvt),
    NavSat(NavSat),
    /// A class/id without a decoder; the payload is kept verbatim.
    Raw(Bytes),
}

impl UbxPayload {
    /// The class/id pair this payload implies. `None` for raw payloads.
    pub fn ids(&self) -> Option<(u8, u8)> {
        let ids = match self {
            UbxPayload::AckAck(_) => (class::ACK, id::ACK_ACK),
            UbxPayload::AckNak(_) => (class::ACK, id::ACK_NAK),
            UbxPayload::CfgMsg(_) => (class::CFG, id::CFG_MSG),
            UbxPayload::CfgRate(_) => (class::CFG, id::CFG_RATE),
            UbxPayload::CfgNav5(_) => (class::CFG, id::CFG_NAV5),
            UbxPayload::NavHpPosLlh(_) => (class::NAV, id::NAV_HPPOSLLH),
            UbxPayload::NavSvin(_) => (class::NAV, id::NAV_SVIN),
            UbxPayload::NavPvt(_) => (class::NAV, id::NAV_PVT),
            UbxPayload::NavSat(_) => (class::NAV, id::NAV_SAT),
            UbxPayload::Raw(_) => return None,
        };
        Some(ids)
    }

    fn encode(&self, dst: &mut BytesMut) -> std::result::Result<(), EncodeError> {
        match self {
            UbxPayload::AckAck(p) | UbxPayload::AckNak(p) => p.encode(dst),
            UbxPayload::CfgMsg(p) => p.encode(dst),
            UbxPayload::CfgRate(p) => p.encode(dst),
            UbxPayload::CfgNav5(p) => p.encode(dst),
            UbxPayload::NavHpPosLlh(p) => p.encode(dst),
            UbxPayload::NavSvin(p) => p.encode(dst),
            UbxPayload::NavPvt(p) => p.encode(dst),
            UbxPayload::NavSat(p) => return p.encode(dst),
            UbxPayload::Raw(p) => dst.put_slice(p),
        }
        Ok(())
    }
}

type PayloadDecoder = fn(&[u8]) -> Result<UbxPayload>;

/// Known messages: `(class, id, name, decoder)`.
///
/// Adding a message type only needs a new row here.
static CATALOGUE: &[(u8, u8, &str, PayloadDecoder)] = &[
    (class::ACK, id::ACK_ACK, "UBX-ACK-ACK", |p| {
        Ack::decode(p, "UBX-ACK-ACK").map(UbxPayload::AckAck)
    }),
    (class::ACK, id::ACK_NAK, "UBX-ACK-NAK", |p| {
        Ack::decode(p, "UBX-ACK-NAK").map(UbxPayload::AckNak)
    }),
    (class::CFG, id::CFG_MSG, "UBX-CFG-MSG", |p| {
        CfgMsg::decode(p).map(UbxPayload::CfgMsg)
    }),
    (class::CFG, id::CFG_RATE, "UBX-CFG-RATE", |p| {
        CfgRate::decode(p).map(UbxPayload::CfgRate)
    }),
    (class::CFG, id::CFG_NAV5, "UBX-CFG-NAV5", |p| {
        CfgNav5::decode(p).map(UbxPayload::CfgNav5)
    }),
    (class::NAV, id::NAV_HPPOSLLH, "UBX-NAV-HPPOSLLH", |p| {
        NavHpPosLlh::decode(p).map(UbxPayload::NavHpPosLlh)
    }),
    (class::NAV, id::NAV_SVIN, "UBX-NAV-SVIN", |p| {
        NavSvin::decode(p).map(UbxPayload::NavSvin)
    }),
    (class::NAV, id::NAV_PVT, "UBX-NAV-PVT", |p| {
        NavPvt::decode(p).map(UbxPayload::NavPvt)
    }),
    (class::NAV, id::NAV_SAT, "UBX-NAV-SAT", |p| {
        NavSat::decode(p).map(UbxPayload::NavSat)
    }),
];

fn lookup(class: u8, id: u8) -> Option<&'static (u8, u8, &'static str, PayloadDecoder)> {
    CATALOGUE.iter().find(|entry| entry.0 == class && entry.1 == id)
}

fn class_name(class: u8) -> Option<&'static str> {
    match class {
        class::NAV => Some("NAV"),
        class::ACK => Some("ACK"),
        class::CFG => Some("CFG"),
        _ => None,
    }
}

/// A UBX message: class, id and payload, plus the frame it was decoded from.
///
/// Equality compares class, id and payload only.
#[derive(Debug, Clone)]
pub struct UbxMessage {
    class: u8,
    id: u8,
    payload: UbxPayload,
    raw: Option<Bytes>,
}

impl UbxMessage {
    /// A message with an undecoded payload, e.g. a poll request.
    pub fn raw(class: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            id,
            payload: UbxPayload::Raw(payload.into()),
            raw: None,
        }
    }

    /// A UBX-ACK-ACK for the given message.
    pub fn ack(ack: Ack) -> Self {
        UbxPayload::AckAck(ack).into_message()
    }

    /// A UBX-ACK-NAK for the given message.
    pub fn nak(ack: Ack) -> Self {
        UbxPayload::AckNak(ack).into_message()
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn payload(&self) -> &UbxPayload {
        &self.payload
    }

    /// The frame this message was decoded from, if it came off the wire.
    pub fn frame(&self) -> Option<&Bytes> {
        self.raw.as_ref()
    }

    /// True for configuration-class messages.
    pub fn is_cfg(&self) -> bool {
        self.class == class::CFG
    }

    /// Symbolic name such as `UBX-NAV-PVT`, or `UBX-NAV-0x99` / `UBX-0x0a-0x04`.
    pub fn name(&self) -> String {
        if let Some(entry) = lookup(self.class, self.id) {
            return entry.2.to_string();
        }
        match class_name(self.class) {
            Some(class) => format!("UBX-{class}-{:#04x}", self.id),
            None => format!("UBX-{:#04x}-{:#04x}", self.class, self.id),
        }
    }

    /// Serialize to a complete frame: sync, class, id, length, payload, checksum.
    pub fn encode(&self) -> std::result::Result<Bytes, EncodeError> {
        let mut payload = BytesMut::new();
        self.payload.encode(&mut payload)?;
        if payload.len() > MAX_PAYLOAD {
            return Err(EncodeError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        let mut dst = BytesMut::with_capacity(UBX_OVERHEAD + payload.len());
        dst.put_slice(&UBX_SYNC);
        dst.put_u8(self.class);
        dst.put_u8(self.id);
        dst.put_u16_le(payload.len() as u16);
        dst.put_slice(&payload);
        let checksum = ubx_checksum(&dst[UBX_SYNC.len()..]);
        dst.put_u16_le(checksum);
        Ok(dst.freeze())
    }

    /// Decode a complete UBX frame.
    pub fn decode(frame: Bytes) -> Result<Self> {
        if frame.len() < UBX_SYNC.len() || frame[..UBX_SYNC.len()] != UBX_SYNC {
            return Err(DecodeError::WrongSync { expected: "UBX" });
        }
        if frame.len() < UBX_OVERHEAD {
            return Err(DecodeError::TooShort {
                min: UBX_OVERHEAD,
                actual: frame.len(),
            });
        }

        let class = frame[2];
        let id = frame[3];
        let declared = u16::from_le_bytes([frame[4], frame[5]]) as usize;
        if frame.len() != declared + UBX_OVERHEAD {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: frame.len(),
            });
        }

        let end = frame.len() - 2;
        let expected = u16::from_le_bytes([frame[end], frame[end + 1]]);
        let computed = ubx_checksum(&frame[UBX_SYNC.len()..end]);
        if expected != computed {
            tracing::debug!(class, id, expected, computed, "UBX checksum mismatch");
            return Err(DecodeError::Checksum {
                protocol: "UBX",
                expected,
                computed,
            });
        }

        let payload_bytes = frame.slice(UBX_HEADER_LEN..end);
        let payload = match lookup(class, id) {
            Some(entry) => (entry.3)(&payload_bytes).inspect_err(|err| {
                tracing::debug!(name = entry.2, error = %err, "UBX payload rejected");
            })?,
            None => {
                tracing::trace!(class, id, len = declared, "no decoder, keeping raw payload");
                UbxPayload::Raw(payload_bytes)
            }
        };

        Ok(Self {
            class,
            id,
            payload,
            raw: Some(frame),
        })
    }
}

impl UbxPayload {
    fn into_message(self) -> UbxMessage {
        let (class, id) = self.ids().unwrap_or_default();
        UbxMessage {
            class,
            id,
            payload: self,
            raw: None,
        }
    }
}

impl PartialEq for UbxMessage {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.id == other.id && self.payload == other.payload
    }
}

impl Eq for UbxMessage {}

impl fmt::Display for UbxMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            UbxPayload::NavHpPosLlh(p) => write!(f, "{} {p}", self.name()),
            UbxPayload::NavPvt(p) => write!(f, "{} {p}", self.name()),
            UbxPayload::AckAck(p) | UbxPayload::AckNak(p) => write!(f, "{} {p}", self.name()),
            _ => f.write_str(&self.name()),
        }
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UbxPayload {
                fn from(payload: $ty) -> Self {
                    UbxPayload::$variant(payload)
                }
            }

            impl From<$ty> for UbxMessage {
                fn from(payload: $ty) -> Self {
                    UbxPayload::$variant(payload).into_message()
                }
            }
        )*
    };
}

impl_from_payload!(
    CfgMsg => CfgMsg,
    CfgRate => CfgRate,
    CfgNav5 => CfgNav5,
    NavHpPosLlh => NavHpPosLlh,
    NavSvin => NavSvin,
    NavPvt => NavPvt,
    NavSat => NavSat,
);

pub(crate) fn require(
    payload: &[u8],
    min: usize,
    message: &'static str,
) -> Result<()> {
    if payload.len() < min {
        return Err(DecodeError::PayloadTooShort {
            message,
            min,
            actual: payload.len(),
        });
    }
    Ok(())
}

pub(crate) fn u16_at(p: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([p[at], p[at + 1]])
}

pub(crate) fn i16_at(p: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([p[at], p[at + 1]])
}

pub(crate) fn u32_at(p: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
}

pub(crate) fn i32_at(p: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
}

pub(crate) fn i8_at(p: &[u8], at: usize) -> i8 {
    p[at] as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG_MSG_FRAME: [u8; 10] = [0xB5, 0x62, 0x06, 0x01, 0x02, 0x00, 0x03, 0x01, 0x0D, 0x38];

    #[test]
    fn decode_cfg_msg_example() {
        let msg = UbxMessage::decode(Bytes::from_static(&CFG_MSG_FRAME)).unwrap();
        assert_eq!(msg.class(), 0x06);
        assert_eq!(msg.id(), 0x01);
        assert_eq!(
            msg.payload(),
            &UbxPayload::CfgMsg(CfgMsg {
                msg_class: 3,
                msg_id: 1,
                rate: MsgRate::Poll,
            })
        );
        assert_eq!(msg.name(), "UBX-CFG-MSG");
        assert_eq!(msg.frame().map(|b| b.as_ref()), Some(&CFG_MSG_FRAME[..]));
    }

    #[test]
    fn encode_matches_wire_bytes() {
        let msg = UbxMessage::from(CfgMsg::poll(3, 1));
        assert_eq!(msg.encode().unwrap().as_ref(), &CFG_MSG_FRAME[..]);
    }

    #[test]
    fn checksum_error_is_distinguishable() {
        let mut frame = CFG_MSG_FRAME;
        frame[7] = 0x02;
        let err = UbxMessage::decode(Bytes::copy_from_slice(&frame)).unwrap_err();
        assert!(err.is_checksum());
        assert!(matches!(err, DecodeError::Checksum { protocol: "UBX", .. }));
    }

    #[test]
    fn length_mismatch_is_structural() {
        let mut frame = CFG_MSG_FRAME.to_vec();
        frame.push(0x00);
        let err = UbxMessage::decode(Bytes::from(frame)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                declared: 2,
                actual: 11
            }
        );
        assert!(!err.is_checksum());
    }

    #[test]
    fn too_short_and_wrong_sync() {
        let err = UbxMessage::decode(Bytes::from_static(&[0xB5, 0x62, 0x06])).unwrap_err();
        assert!(matches!(err, DecodeError::TooShort { min: 8, actual: 3 }));

        let err = UbxMessage::decode(Bytes::from_static(b"$GPGGA*00")).unwrap_err();
        assert!(matches!(err, DecodeError::WrongSync { .. }));
    }

    #[test]
    fn unknown_message_keeps_ids_and_bytes() {
        let msg = UbxMessage::raw(0x0A, 0x04, Bytes::from_static(&[1, 2, 3]));
        let wire = msg.encode().unwrap();
        let decoded = UbxMessage::decode(wire).unwrap();

        assert_eq!(decoded.class(), 0x0A);
        assert_eq!(decoded.id(), 0x04);
        assert_eq!(decoded.payload(), &UbxPayload::Raw(Bytes::from_static(&[1, 2, 3])));
        assert_eq!(decoded.name(), "UBX-0x0a-0x04");
        assert_eq!(UbxMessage::raw(0x01, 0x99, Bytes::new()).name(), "UBX-NAV-0x99");
    }

    #[test]
    fn empty_poll_frame() {
        let wire = UbxMessage::raw(0x0A, 0x04, Bytes::new()).encode().unwrap();
        assert_eq!(wire.as_ref(), &[0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34]);
    }

    #[test]
    fn short_payload_for_known_type() {
        let msg = UbxMessage::raw(class::ACK, id::ACK_ACK, Bytes::from_static(&[0x06]));
        let err = UbxMessage::decode(msg.encode().unwrap()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::PayloadTooShort {
                message: "UBX-ACK-ACK",
                min: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let msg = UbxMessage::raw(0x02, 0x15, vec![0u8; MAX_PAYLOAD + 1]);
        assert!(matches!(
            msg.encode(),
            Err(EncodeError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn catalogue_has_unique_entries() {
        for (i, a) in CATALOGUE.iter().enumerate() {
            for b in &CATALOGUE[i + 1..] {
                assert!((a.0, a.1) != (b.0, b.1), "duplicate entry {}", a.2);
            }
        }
    }
}
