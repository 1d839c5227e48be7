use gnsswire_proto::ubx::{CfgMsg, CfgNav5, CfgRate};
use gnsswire_proto::UbxMessage;
use gnsswire_session::SessionConfig;

use crate::cmd::{connect, parse_duration, RequestArgs, RequestCommand};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub async fn run(args: RequestArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = SessionConfig::default();
    if let Some(timeout) = &args.timeout {
        config = config.with_command_timeout(parse_duration(timeout)?);
    }

    let message = build_command(&args.command);
    let name = message.name();
    let (session, messages) = connect(&args.addr, config).await?;
    // Only the ACK matters here; don't buffer the receiver's output.
    drop(messages);

    tracing::debug!(command = %name, "sending");
    let ack = session
        .request(message)
        .await
        .map_err(|err| command_error(&format!("{name} failed"), err))?;

    print_message(&ack, format);
    Ok(SUCCESS)
}

fn build_command(command: &RequestCommand) -> UbxMessage {
    match command {
        RequestCommand::CfgMsg(args) => CfgMsg::set_rate(args.class, args.id, args.rate).into(),
        RequestCommand::CfgRate(args) => CfgRate {
            meas_rate: args.meas_rate,
            nav_rate: args.nav_rate,
            time_ref: args.time_ref,
        }
        .into(),
        RequestCommand::CfgNav5(args) => CfgNav5 {
            dyn_model: args.dyn_model,
            fix_mode: args.fix_mode,
            min_elev: args.min_elev,
        }
        .into(),
    }
}
