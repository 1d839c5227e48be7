//! UBX-ACK: acknowledgement of configuration messages.

use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;

use super::require;
use crate::error::Result;

/// Payload of UBX-ACK-ACK and UBX-ACK-NAK: the class/id being answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub cls_id: u8,
    pub msg_id: u8,
}

impl Ack {
    pub const LEN: usize = 2;

    pub fn new(cls_id: u8, msg_id: u8) -> Self {
        Self { cls_id, msg_id }
    }

    /// True if this acknowledgement answers a message with `class`/`id`.
    pub fn answers(&self, class: u8, id: u8) -> bool {
        self.cls_id == class && self.msg_id == id
    }

    pub(crate) fn decode(p: &[u8], message: &'static str) -> Result<Self> {
        require(p, Self::LEN, message)?;
        Ok(Self::new(p[0], p[1]))
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.cls_id);
        dst.put_u8(self.msg_id);
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "for {:#04x}/{:#04x}", self.cls_id, self.msg_id)
    }
}
