use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gnsswire_proto::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    #[serde(flatten)]
    message: &'a Message,
    hex: String,
    timestamp: String,
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                message,
                hex: frame_hex(message),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PROTOCOL", "NAME", "SIZE", "SUMMARY"])
                .add_row(vec![
                    message.kind_name().to_string(),
                    message.name(),
                    raw_len(message).to_string(),
                    summary(message),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} size={} {}",
                message.kind_name(),
                message.name(),
                raw_len(message),
                summary(message)
            );
        }
        OutputFormat::Raw => {
            if let Some(raw) = message.raw() {
                print_raw(raw);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn summary(message: &Message) -> String {
    match message {
        Message::Nmea(nmea) => nmea.as_str().to_string(),
        Message::Unknown(_) => frame_hex(message),
        other => other.to_string(),
    }
}

fn frame_hex(message: &Message) -> String {
    message.raw().map(hex::encode).unwrap_or_default()
}

fn raw_len(message: &Message) -> usize {
    message.raw().map_or(0, |raw| raw.len())
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn json_output_flattens_message_fields() {
        let message = Message::decode(Bytes::from_static(&[
            0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34,
        ]))
        .expect("frame should decode");
        let out = MessageOutput {
            message: &message,
            hex: frame_hex(&message),
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_value(&out).expect("output should serialize");
        assert_eq!(json["protocol"], "UBX");
        assert_eq!(json["name"], "UBX-0x0a-0x04");
        assert_eq!(json["hex"], "b5620a0400000e34");
        assert_eq!(json["len"], 8);
    }

    #[test]
    fn nmea_summary_is_the_sentence() {
        let message = Message::decode(Bytes::from_static(
            b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n",
        ))
        .expect("sentence should decode");
        assert!(summary(&message).starts_with("$GPGGA,123519"));
    }
}
