//! NMEA 0183 sentences.
//!
//! Only the envelope is checked: `$`, body, `*`, two hex checksum digits.
//! Field contents are left to the caller.

use std::fmt;

use bytes::Bytes;
use gnsswire_frame::protocol::NMEA_SYNC;
use serde::{Serialize, Serializer};

use crate::checksum::nmea_checksum;
use crate::error::{DecodeError, Result};

const CHECKSUM_MARKER: u8 = b'*';

/// `*` plus two hex digits.
const CHECKSUM_SUFFIX_LEN: usize = 3;

/// A checksum-verified NMEA sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmeaSentence {
    raw: Bytes,
    sentence: String,
    checksum: u8,
}

impl NmeaSentence {
    /// Verify and wrap a complete sentence frame.
    ///
    /// Surrounding whitespace, including the `\r\n` terminator, is ignored.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let trimmed = raw.trim_ascii();
        if trimmed.first() != Some(&NMEA_SYNC) {
            return Err(DecodeError::WrongSync { expected: "NMEA" });
        }
        if trimmed.len() < 1 + CHECKSUM_SUFFIX_LEN
            || trimmed[trimmed.len() - CHECKSUM_SUFFIX_LEN] != CHECKSUM_MARKER
        {
            return Err(DecodeError::MarkerPosition);
        }

        let split = trimmed.len() - CHECKSUM_SUFFIX_LEN;
        let body = &trimmed[1..split];
        let digits = &trimmed[split + 1..];
        let expected = match (hex_digit(digits[0]), hex_digit(digits[1])) {
            (Some(hi), Some(lo)) => (hi << 4) | lo,
            _ => return Err(DecodeError::ChecksumDigits),
        };

        let computed = nmea_checksum(body);
        if computed != expected {
            return Err(DecodeError::Checksum {
                protocol: "NMEA",
                expected: u16::from(expected),
                computed: u16::from(computed),
            });
        }

        let sentence = String::from_utf8_lossy(trimmed).into_owned();
        Ok(Self {
            raw,
            sentence,
            checksum: expected,
        })
    }

    /// The trimmed sentence, `$` through checksum digits.
    pub fn as_str(&self) -> &str {
        &self.sentence
    }

    /// The frame as received.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Text between `$` and `*`.
    pub fn body(&self) -> &str {
        &self.sentence[1..self.sentence.len() - CHECKSUM_SUFFIX_LEN]
    }

    /// The first field, e.g. `GPGGA`.
    pub fn address(&self) -> &str {
        self.body().split(',').next().unwrap_or_default()
    }

    /// Two-letter talker id (`GP`, `GN`, ...). Proprietary `P` sentences have none.
    pub fn talker(&self) -> Option<&str> {
        let address = self.address();
        if address.starts_with('P') || address.len() < 5 {
            return None;
        }
        address.get(..2)
    }

    /// Sentence formatter, e.g. `GGA`.
    pub fn sentence_type(&self) -> &str {
        let address = self.address();
        match self.talker() {
            Some(talker) => &address[talker.len()..],
            None => address,
        }
    }

    /// Data fields after the address, split on commas. Empty fields are kept.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.body().split(',').skip(1)
    }
}

impl fmt::Display for NmeaSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentence)
    }
}

impl Serialize for NmeaSentence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.sentence)
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6a\r\n";

    #[test]
    fn decode_gga() {
        let nmea = NmeaSentence::decode(Bytes::from_static(GGA)).unwrap();

        assert_eq!(nmea.as_str(), std::str::from_utf8(&GGA[..GGA.len() - 2]).unwrap());
        assert_eq!(nmea.raw().as_ref(), GGA);
        assert_eq!(nmea.checksum(), 0x47);
        assert_eq!(nmea.address(), "GPGGA");
        assert_eq!(nmea.talker(), Some("GP"));
        assert_eq!(nmea.sentence_type(), "GGA");

        let fields: Vec<&str> = nmea.fields().collect();
        assert_eq!(fields.len(), 14);
        assert_eq!(fields[0], "123519");
        assert_eq!(fields[13], "");
    }

    #[test]
    fn lowercase_hex_accepted() {
        let nmea = NmeaSentence::decode(Bytes::from_static(RMC)).unwrap();
        assert_eq!(nmea.checksum(), 0x6A);
        assert_eq!(nmea.sentence_type(), "RMC");
    }

    #[test]
    fn checksum_mismatch() {
        let bad = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48\r\n";
        let err = NmeaSentence::decode(Bytes::from_static(bad)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Checksum {
                protocol: "NMEA",
                expected: 0x48,
                computed: 0x47
            }
        );
        assert!(err.is_checksum());
    }

    #[test]
    fn marker_in_wrong_place() {
        for bad in [&b"$GPGGA,1,2*471\r\n"[..], b"$GPGGA,1,2,47\r\n", b"$*4"] {
            let err = NmeaSentence::decode(Bytes::from_static(bad)).unwrap_err();
            assert_eq!(err, DecodeError::MarkerPosition, "{bad:?}");
            assert!(!err.is_checksum());
        }
    }

    #[test]
    fn non_hex_digits() {
        let err = NmeaSentence::decode(Bytes::from_static(b"$GPGGA,1*G1\r\n")).unwrap_err();
        assert_eq!(err, DecodeError::ChecksumDigits);
    }

    #[test]
    fn proprietary_sentence_has_no_talker() {
        let body = b"PUBX,00";
        let line = format!("${}*{:02X}\r\n", std::str::from_utf8(body).unwrap(), nmea_checksum(body));
        let nmea = NmeaSentence::decode(Bytes::from(line)).unwrap();
        assert_eq!(nmea.address(), "PUBX");
        assert_eq!(nmea.talker(), None);
        assert_eq!(nmea.sentence_type(), "PUBX");
    }
}
