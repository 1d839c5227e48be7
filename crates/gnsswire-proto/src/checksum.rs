//! Frame checksums.

/// UBX 8-bit Fletcher checksum over class, id, length and payload.
///
/// Returns `ck_b << 8 | ck_a`, so writing the value little-endian puts
/// `ck_a` first as it appears on the wire.
pub fn ubx_checksum(data: &[u8]) -> u16 {
    let (ck_a, ck_b) = data.iter().fold((0u8, 0u8), |(a, b), &byte| {
        let a = a.wrapping_add(byte);
        (a, b.wrapping_add(a))
    });
    (u16::from(ck_b) << 8) | u16::from(ck_a)
}

/// NMEA checksum: XOR of every byte between `$` and `*`.
pub fn nmea_checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, &byte| acc ^ byte)
}
