use gnsswire_session::SessionConfig;

use crate::cmd::{connect, SendArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, USAGE};

pub async fn run(args: SendArgs) -> CliResult<i32> {
    let payload = parse_hex(&args.hex)?;
    let (session, messages) = connect(&args.addr, SessionConfig::default()).await?;
    drop(messages);

    session
        .write(payload)
        .await
        .map_err(|err| session_error("send failed", err))?;
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(CliError::new(USAGE, "--hex must not be empty"));
    }
    hex::decode(&compact).map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ignores_whitespace() {
        assert_eq!(
            parse_hex("b5 62 0a 04\n00 00 0e 34").unwrap(),
            vec![0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34]
        );
    }

    #[test]
    fn parse_hex_rejects_odd_length_and_empty() {
        assert_eq!(parse_hex("b56").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("  ").unwrap_err().code, USAGE);
    }
}
