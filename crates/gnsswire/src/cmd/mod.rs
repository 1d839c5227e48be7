use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use gnsswire_proto::ubx::{DynModel, FixMode};
use gnsswire_session::{MessageStream, Session, SessionConfig};
use tokio::net::TcpStream;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod request;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a capture file (or stdin) and print each message.
    Decode(DecodeArgs),
    /// Connect to a receiver and print decoded messages.
    Listen(ListenArgs),
    /// Send one configuration command and wait for its ACK/NAK.
    Request(RequestArgs),
    /// Write raw bytes to a receiver without waiting for a response.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Listen(args) => block_on(listen::run(args, format)),
        Command::Request(args) => block_on(request::run(args, format)),
        Command::Send(args) => block_on(send::run(args)),
        Command::Version(args) => version::run(args),
    }
}

fn block_on<F>(future: F) -> CliResult<i32>
where
    F: std::future::Future<Output = CliResult<i32>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?
        .block_on(future)
}

async fn connect(addr: &str, config: SessionConfig) -> CliResult<(Session, MessageStream)> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|err| io_error(&format!("connect to {addr} failed"), err))?;
    let _ = stream.set_nodelay(true);
    tracing::debug!(addr, "connected");
    Ok(Session::spawn(stream, config))
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Stop at the first frame that fails to decode.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Receiver address (HOST:PORT), e.g. a serial-to-TCP bridge.
    pub addr: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Receiver address (HOST:PORT).
    pub addr: String,
    /// Time to wait for the ACK/NAK (e.g. 5s, 500ms). Default: 5s.
    #[arg(long)]
    pub timeout: Option<String>,
    #[command(subcommand)]
    pub command: RequestCommand,
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Set the output rate of one message (UBX-CFG-MSG).
    CfgMsg(CfgMsgArgs),
    /// Set the measurement and navigation rate (UBX-CFG-RATE).
    CfgRate(CfgRateArgs),
    /// Change navigation engine settings (UBX-CFG-NAV5).
    CfgNav5(CfgNav5Args),
}

#[derive(Args, Debug)]
pub struct CfgMsgArgs {
    /// Message class, decimal or 0x-prefixed hex.
    #[arg(long, value_parser = parse_u8)]
    pub class: u8,
    /// Message id, decimal or 0x-prefixed hex.
    #[arg(long, value_parser = parse_u8)]
    pub id: u8,
    /// Output rate on the current port, in navigation solutions.
    #[arg(long)]
    pub rate: u8,
}

#[derive(Args, Debug)]
pub struct CfgRateArgs {
    /// Measurement period in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub meas_rate: u16,
    /// Measurement cycles per navigation solution.
    #[arg(long, default_value_t = 1)]
    pub nav_rate: u16,
    /// Time reference (0 = UTC, 1 = GPS).
    #[arg(long, default_value_t = 1)]
    pub time_ref: u16,
}

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("setting")
        .required(true)
        .multiple(true)
        .args(["dyn_model", "fix_mode", "min_elev"])
))]
pub struct CfgNav5Args {
    /// Dynamic platform model (portable, stationary, pedestrian, automotive, ...).
    #[arg(long)]
    pub dyn_model: Option<DynModel>,
    /// Position fixing mode (2d, 3d, auto).
    #[arg(long)]
    pub fix_mode: Option<FixMode>,
    /// Minimum satellite elevation in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub min_elev: Option<i8>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Receiver address (HOST:PORT).
    pub addr: String,
    /// Bytes to write, as hex (whitespace allowed).
    #[arg(long)]
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

fn parse_u8(input: &str) -> Result<u8, String> {
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid byte value {input:?}: {err}"))
}
