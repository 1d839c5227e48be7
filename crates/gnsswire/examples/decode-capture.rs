//! Decode a receiver capture and tally messages by name.
//!
//! Run with:
//!   cargo run --example decode-capture -- capture.ubx
//!
//! Without an argument a small built-in capture is decoded.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};

use gnsswire::session::MessageReader;

fn sample() -> Vec<u8> {
    let mut wire = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n".to_vec();
    // UBX-ACK-ACK for CFG-MSG
    wire.extend_from_slice(&[0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0F, 0x38]);
    // RTCM3 message 1005, truncated body
    wire.extend_from_slice(&[0xD3, 0x00, 0x03, 0x3E, 0xD0, 0x00, 0xAA, 0xBB, 0xCC]);
    wire
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input: Box<dyn Read> = match std::env::args().nth(1) {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(Cursor::new(sample())),
    };

    let mut reader = MessageReader::new(input);
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut errors = 0usize;

    for item in reader.by_ref() {
        match item {
            Ok(message) => {
                println!("{message}");
                *counts.entry(message.name()).or_default() += 1;
            }
            Err(e) => {
                eprintln!("error: {e}");
                errors += 1;
            }
        }
    }

    println!();
    for (name, count) in &counts {
        println!("{count:>6}  {name}");
    }
    println!("errors: {errors}, bytes discarded: {}", reader.discarded());
    Ok(())
}
