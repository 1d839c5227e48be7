use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::protocol::{
    FrameKind, MIN_BINARY_PROBE, NMEA_SYNC, NMEA_TERMINATOR, RTCM3_LENGTH_MASK, RTCM3_OVERHEAD,
    RTCM3_SYNC, UBX_OVERHEAD, UBX_SYNC,
};

/// Default longest NMEA sentence accepted before the `$` is treated as noise.
pub const DEFAULT_MAX_SENTENCE_LEN: usize = 1024;

/// One complete protocol frame cut from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol the frame was framed as.
    pub kind: FrameKind,
    /// The frame bytes, sync through terminator/checksum inclusive.
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(kind: FrameKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Length of the frame on the wire.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Frames are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Configuration for stream framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Longest NMEA sentence (excluding `\r\n`) to wait for. A `$` with no
    /// terminator within this many bytes is discarded as noise.
    pub max_sentence_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_sentence_len: DEFAULT_MAX_SENTENCE_LEN,
        }
    }
}

enum Scan {
    Frame(FrameKind, usize),
    Discard,
    Incomplete,
}

fn scan(buf: &[u8], config: &FrameConfig) -> Scan {
    let Some(&lead) = buf.first() else {
        return Scan::Incomplete;
    };

    match lead {
        NMEA_SYNC => {
            let limit = config.max_sentence_len.saturating_add(NMEA_TERMINATOR.len());
            let window = &buf[..buf.len().min(limit)];
            match window
                .windows(NMEA_TERMINATOR.len())
                .position(|w| w == NMEA_TERMINATOR)
            {
                Some(pos) => Scan::Frame(FrameKind::Nmea, pos + NMEA_TERMINATOR.len()),
                None if buf.len() >= limit => Scan::Discard,
                None => Scan::Incomplete,
            }
        }
        b if b == UBX_SYNC[0] => {
            if buf.len() < MIN_BINARY_PROBE {
                return Scan::Incomplete;
            }
            if buf[1] != UBX_SYNC[1] {
                return Scan::Discard;
            }
            let total = u16::from_le_bytes([buf[4], buf[5]]) as usize + UBX_OVERHEAD;
            if buf.len() < total {
                return Scan::Incomplete;
            }
            Scan::Frame(FrameKind::Ubx, total)
        }
        RTCM3_SYNC => {
            if buf.len() < MIN_BINARY_PROBE {
                return Scan::Incomplete;
            }
            let len = u16::from_be_bytes([buf[1], buf[2]]) & RTCM3_LENGTH_MASK;
            let total = len as usize + RTCM3_OVERHEAD;
            if buf.len() < total {
                return Scan::Incomplete;
            }
            Scan::Frame(FrameKind::Rtcm3, total)
        }
        _ => Scan::Discard,
    }
}

/// Cut the next complete frame from the front of a buffer.
///
/// Returns `None` when the buffer does not (yet) start with a complete frame.
/// Unrecognised leading bytes are discarded one at a time; bytes of an
/// incomplete frame are always left in place.
pub fn next_frame(src: &mut BytesMut, config: &FrameConfig) -> Option<Frame> {
    let mut discarded = 0;
    next_frame_counted(src, config, &mut discarded)
}

pub(crate) fn next_frame_counted(
    src: &mut BytesMut,
    config: &FrameConfig,
    discarded: &mut u64,
) -> Option<Frame> {
    loop {
        match scan(src, config) {
            Scan::Frame(kind, len) => {
                let data = src.split_to(len).freeze();
                trace!(%kind, len, "frame");
                return Some(Frame { kind, data });
            }
            Scan::Discard => {
                trace!(byte = src[0], "discarding unrecognised byte");
                src.advance(1);
                *discarded += 1;
            }
            Scan::Incomplete => return None,
        }
    }
}

/// `tokio_util` decoder producing frames from an async byte stream.
#[cfg(feature = "async")]
#[derive(Debug, Default)]
pub struct FrameCodec {
    config: FrameConfig,
    discarded: u64,
}

#[cfg(feature = "async")]
impl FrameCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            discarded: 0,
        }
    }

    /// Number of bytes discarded while resynchronising.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Decoder for FrameCodec {
    type Item = Frame;
    type Error = crate::error::FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        Ok(next_frame_counted(src, &self.config, &mut self.discarded))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            tracing::debug!(
                remaining = src.len(),
                "dropping incomplete frame at end of stream"
            );
            src.clear();
        }
        Ok(None)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A valid UBX frame: CFG-MSG poll for NAV-PVT class/id 0x03/0x01.
    pub(crate) const UBX_CFG_MSG: [u8; 10] = [0xB5, 0x62, 0x06, 0x01, 0x02, 0x00, 0x03, 0x01, 0x0D, 0x38];

    pub(crate) const NMEA_GGA: &[u8] =
        b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

    /// RTCM3 frame with a 3-byte payload (CRC bytes are not checked here).
    pub(crate) const RTCM3: [u8; 9] = [0xD3, 0x00, 0x03, 0x3E, 0xD0, 0x00, 0xAA, 0xBB, 0xCC];

    fn drain(buf: &mut BytesMut) -> Vec<Frame> {
        let config = FrameConfig::default();
        let mut out = Vec::new();
        while let Some(frame) = next_frame(buf, &config) {
            out.push(frame);
        }
        out
    }

    #[test]
    fn frames_each_protocol() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(NMEA_GGA);
        buf.extend_from_slice(&UBX_CFG_MSG);
        buf.extend_from_slice(&RTCM3);

        let frames = drain(&mut buf);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].kind, FrameKind::Nmea);
        assert_eq!(frames[0].data.as_ref(), NMEA_GGA);
        assert_eq!(frames[1].kind, FrameKind::Ubx);
        assert_eq!(frames[1].data.as_ref(), &UBX_CFG_MSG[..]);
        assert_eq!(frames[2].kind, FrameKind::Rtcm3);
        assert_eq!(frames[2].data.as_ref(), &RTCM3[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_nmea_waits_for_terminator() {
        let mut buf = BytesMut::from(&NMEA_GGA[..NMEA_GGA.len() - 1]);
        assert!(drain(&mut buf).is_empty());
        assert_eq!(buf.len(), NMEA_GGA.len() - 1);
    }

    #[test]
    fn short_binary_header_waits() {
        let mut buf = BytesMut::from(&[0xB5, 0x62, 0x06, 0x01, 0x02][..]);
        assert!(drain(&mut buf).is_empty());
        assert_eq!(buf.len(), 5);

        let mut buf = BytesMut::from(&[0xD3, 0x00, 0x03, 0x3E, 0xD0][..]);
        assert!(drain(&mut buf).is_empty());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn incomplete_ubx_payload_waits() {
        let mut buf = BytesMut::from(&UBX_CFG_MSG[..9]);
        assert!(drain(&mut buf).is_empty());
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn bad_ubx_second_sync_discards_one_byte() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0xB5, 0x00]);
        buf.extend_from_slice(&UBX_CFG_MSG);

        let mut discarded = 0;
        let config = FrameConfig::default();
        let frame = next_frame_counted(&mut buf, &config, &mut discarded).unwrap();
        // 0xB5 dropped, then 0x00 dropped as garbage.
        assert_eq!(discarded, 2);
        assert_eq!(frame.data.as_ref(), &UBX_CFG_MSG[..]);
    }

    #[test]
    fn stray_byte_between_frames() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&UBX_CFG_MSG);
        buf.extend_from_slice(&[0x7F]);
        buf.extend_from_slice(NMEA_GGA);

        let frames = drain(&mut buf);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data.as_ref(), &UBX_CFG_MSG[..]);
        assert_eq!(frames[1].data.as_ref(), NMEA_GGA);
    }

    #[test]
    fn rtcm_length_uses_low_ten_bits() {
        // Reserved high bits set; length is still 3.
        let mut frame = RTCM3;
        frame[1] = 0xFC;
        let mut buf = BytesMut::from(&frame[..]);
        let frames = drain(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 9);
    }

    #[test]
    fn zero_length_ubx_payload() {
        let poll = [0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34];
        let mut buf = BytesMut::from(&poll[..]);
        let frames = drain(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 8);
    }

    #[test]
    fn runaway_sentence_is_discarded() {
        let config = FrameConfig {
            max_sentence_len: 8,
        };
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"$ABCDEFGHIJ");
        buf.extend_from_slice(&UBX_CFG_MSG);

        let mut discarded = 0;
        let frame = next_frame_counted(&mut buf, &config, &mut discarded).unwrap();
        assert_eq!(frame.kind, FrameKind::Ubx);
        assert_eq!(discarded, 11);
    }

    #[test]
    fn sentence_within_limit_is_kept() {
        let config = FrameConfig {
            max_sentence_len: 8,
        };
        let mut buf = BytesMut::from(&b"$GPTXT*0\r\n"[..]);
        let frame = next_frame(&mut buf, &config).unwrap();
        assert_eq!(frame.kind, FrameKind::Nmea);
        assert_eq!(frame.len(), 10);
    }

    #[cfg(feature = "async")]
    #[test]
    fn codec_decodes_stream() {
        use futures_util::StreamExt;
        use tokio_util::codec::FramedRead;

        let mut wire = Vec::new();
        wire.extend_from_slice(&UBX_CFG_MSG);
        wire.push(0x00);
        wire.extend_from_slice(NMEA_GGA);
        wire.extend_from_slice(&UBX_CFG_MSG[..4]);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let frames: Vec<Frame> = rt.block_on(async {
            FramedRead::new(wire.as_slice(), FrameCodec::new())
                .map(|frame| frame.unwrap())
                .collect()
                .await
        });

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind, FrameKind::Ubx);
        assert_eq!(frames[1].kind, FrameKind::Nmea);
    }
}
