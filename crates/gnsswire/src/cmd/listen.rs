use gnsswire_session::SessionConfig;

use crate::cmd::{connect, ListenArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub async fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let (session, mut messages) = connect(&args.addr, SessionConfig::default()).await?;
    let mut printed = 0usize;
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        let item = tokio::select! {
            item = messages.recv() => item,
            _ = &mut interrupt => {
                tracing::info!(printed, "interrupted");
                return Ok(SUCCESS);
            }
        };

        match item {
            Some(Ok(message)) => {
                print_message(&message, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    return Ok(SUCCESS);
                }
            }
            Some(Err(err)) => eprintln!("decode error: {err}"),
            None => break,
        }
    }

    drop(session);
    messages
        .join()
        .await
        .map_err(|err| session_error("receive failed", err))?;
    tracing::info!(printed, "receiver closed the connection");
    Ok(SUCCESS)
}
