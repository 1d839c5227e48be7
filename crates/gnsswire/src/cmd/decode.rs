use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use gnsswire_session::{MessageReader, ReaderError};

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, reader_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            decode_stream(BufReader::new(file), args.strict, format)
        }
        _ => decode_stream(io::stdin().lock(), args.strict, format),
    }
}

fn decode_stream<R: Read>(input: R, strict: bool, format: OutputFormat) -> CliResult<i32> {
    let mut reader = MessageReader::new(input);
    let mut decoded = 0usize;
    let mut failed = 0usize;

    for item in reader.by_ref() {
        match item {
            Ok(message) => {
                decoded += 1;
                print_message(&message, format);
            }
            Err(ReaderError::Decode(err)) if !strict => {
                failed += 1;
                eprintln!("decode error: {err}");
            }
            Err(err) => return Err(reader_error("decode failed", err)),
        }
    }

    tracing::info!(
        decoded,
        failed,
        discarded = reader.discarded(),
        "capture decoded"
    );

    Ok(SUCCESS)
}
