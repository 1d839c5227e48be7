/// Errors raised while decoding a frame into a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame does not start with the sync bytes of the requested protocol.
    #[error("not a {expected} frame")]
    WrongSync { expected: &'static str },

    /// The frame is shorter than the protocol's fixed overhead.
    #[error("frame too short ({actual} bytes, need at least {min})")]
    TooShort { min: usize, actual: usize },

    /// The length field disagrees with the number of bytes in the frame.
    #[error("declared length {declared} does not match frame length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// The NMEA `*` checksum marker is not three bytes before the end.
    #[error("checksum marker at wrong location")]
    MarkerPosition,

    /// The NMEA checksum digits are not two hex characters.
    #[error("checksum digits are not hexadecimal")]
    ChecksumDigits,

    /// The computed checksum disagrees with the one carried in the frame.
    #[error("{protocol} checksum mismatch (frame {expected:#06x}, computed {computed:#06x})")]
    Checksum {
        protocol: &'static str,
        expected: u16,
        computed: u16,
    },

    /// A payload is shorter than its message type requires.
    #[error("payload too short for {message} ({actual} bytes, need {min})")]
    PayloadTooShort {
        message: &'static str,
        min: usize,
        actual: usize,
    },

    /// A payload length is not one of the lengths its message type allows.
    #[error("invalid payload length {actual} for {message}")]
    PayloadLength { message: &'static str, actual: usize },
}

impl DecodeError {
    /// True for checksum failures, as opposed to structural ones.
    pub fn is_checksum(&self) -> bool {
        matches!(
            self,
            DecodeError::Checksum { .. } | DecodeError::ChecksumDigits
        )
    }
}

/// Errors raised while serializing a message for transmission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Only UBX messages carry the class/id needed to encode them.
    #[error("can't serialize {kind} message (no class/id)")]
    NotEncodable { kind: &'static str },

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A repeated block has more entries than its count field can express.
    #[error("too many {field} in {message} ({count}, max {max})")]
    TooManyEntries {
        message: &'static str,
        field: &'static str,
        count: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// A symbolic setting name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{name}\" (expected one of: {expected})")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub name: String,
    pub expected: String,
}
