//! Sync bytes and framing constants for the multiplexed protocols.

/// NMEA sentence start (`$`).
pub const NMEA_SYNC: u8 = 0x24;

/// NMEA sentence terminator.
pub const NMEA_TERMINATOR: [u8; 2] = [b'\r', b'\n'];

/// UBX sync characters.
pub const UBX_SYNC: [u8; 2] = [0xB5, 0x62];

/// UBX header: sync (2) + class (1) + id (1) + length (2).
pub const UBX_HEADER_LEN: usize = 6;

/// UBX bytes outside the payload: header (6) + checksum (2).
pub const UBX_OVERHEAD: usize = 8;

/// RTCM3 frame preamble.
pub const RTCM3_SYNC: u8 = 0xD3;

/// RTCM3 bytes outside the payload: preamble (1) + length (2) + CRC-24 (3).
pub const RTCM3_OVERHEAD: usize = 6;

/// The low 10 bits of the RTCM3 length field carry the payload length.
pub const RTCM3_LENGTH_MASK: u16 = 0x03FF;

/// Bytes needed before a binary frame's length can be read.
pub const MIN_BINARY_PROBE: usize = 6;

/// The protocol a frame belongs to, as identified by its sync byte(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Nmea,
    Ubx,
    Rtcm3,
}

impl FrameKind {
    /// Short protocol name.
    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Nmea => "NMEA",
            FrameKind::Ubx => "UBX",
            FrameKind::Rtcm3 => "RTCM3",
        }
    }

    /// Identify a protocol from the leading bytes of a frame.
    pub fn identify(data: &[u8]) -> Option<Self> {
        match data {
            [NMEA_SYNC, ..] => Some(FrameKind::Nmea),
            [a, b, ..] if [*a, *b] == UBX_SYNC => Some(FrameKind::Ubx),
            [RTCM3_SYNC, ..] => Some(FrameKind::Rtcm3),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_by_sync_bytes() {
        assert_eq!(FrameKind::identify(b"$GPGGA"), Some(FrameKind::Nmea));
        assert_eq!(FrameKind::identify(&[0xB5, 0x62, 0x01]), Some(FrameKind::Ubx));
        assert_eq!(FrameKind::identify(&[0xD3, 0x00]), Some(FrameKind::Rtcm3));
        assert_eq!(FrameKind::identify(&[0xB5, 0x00]), None);
        assert_eq!(FrameKind::identify(&[0xB5]), None);
        assert_eq!(FrameKind::identify(&[]), None);
    }
}
