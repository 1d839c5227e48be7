use bytes::Bytes;
use gnsswire_proto::{EncodeError, UbxMessage};

/// A UBX message ready for transmission.
///
/// Encoding happens on construction, so a message that can't be serialized
/// never reaches the queue.
#[derive(Debug, Clone)]
pub struct Command {
    message: UbxMessage,
    bytes: Bytes,
}

impl Command {
    pub fn new(message: UbxMessage) -> Result<Self, EncodeError> {
        let bytes = message.encode()?;
        Ok(Self { message, bytes })
    }

    pub fn message(&self) -> &UbxMessage {
        &self.message
    }

    /// The encoded frame.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl TryFrom<UbxMessage> for Command {
    type Error = EncodeError;

    fn try_from(message: UbxMessage) -> Result<Self, Self::Error> {
        Self::new(message)
    }
}
