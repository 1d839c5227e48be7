//! Send UBX-CFG-RATE through a session and wait for the ACK.
//!
//! The receiver here is simulated over an in-memory duplex: it frames what
//! the host writes and acknowledges every CFG message it sees.
//!
//! Run with:
//!   cargo run --example configure-rate --features cli

use gnsswire::frame::Chunker;
use gnsswire::proto::ubx::{Ack, CfgRate};
use gnsswire::proto::{Message, UbxMessage};
use gnsswire::session::{Session, SessionConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

async fn simulated_receiver(mut device: DuplexStream) -> std::io::Result<()> {
    let mut chunker = Chunker::new();
    let mut buf = [0u8; 512];

    loop {
        let n = device.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        for frame in chunker.feed(&buf[..n]) {
            let Ok(Message::Ubx(msg)) = Message::from_frame(frame) else {
                continue;
            };
            if msg.is_cfg() {
                eprintln!("receiver: got {}", msg.name());
                let ack = UbxMessage::ack(Ack::new(msg.class(), msg.id()));
                device.write_all(&ack.encode().map_err(std::io::Error::other)?).await?;
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (host, device) = tokio::io::duplex(4096);
    let receiver = tokio::spawn(simulated_receiver(device));

    let (session, messages) = Session::spawn(host, SessionConfig::default());
    let rate = CfgRate {
        meas_rate: 200,
        ..CfgRate::default()
    };
    let ack = session.request(rate.into()).await?;
    println!("host: {ack}");

    drop(session);
    drop(messages);
    receiver.abort();
    Ok(())
}
