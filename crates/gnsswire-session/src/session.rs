//! Async session over a duplex byte transport.
//!
//! One driver task owns the frame decoder and the command queue. Every
//! write to the receiver goes through a single writer task, so a stalled
//! write never holds up reading or command deadlines:
//!
//! ```text
//! Session::request ─┐                       ┌─► writer task ─► transport (write)
//! Session::write   ─┼─► mpsc ─► driver task ─┤
//!                   │                       └─◄ transport (read) ─► MessageStream
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use gnsswire_frame::FrameCodec;
use gnsswire_proto::{DecodeError, Message, UbxMessage};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::codec::FramedRead;

use crate::command::Command;
use crate::config::SessionConfig;
use crate::error::{CommandError, Result, SessionError};
use crate::matcher::AckMatcher;
use crate::queue::{CommandQueue, Pending};

type Decoded = std::result::Result<Message, DecodeError>;

enum Request {
    Command {
        command: Command,
        timeout: Option<Duration>,
        reply: oneshot::Sender<Pending<Message>>,
    },
    Write {
        data: Bytes,
        done: oneshot::Sender<std::io::Result<()>>,
    },
}

/// Handle for sending commands and raw bytes to the receiver.
///
/// Cheap to clone. The driver keeps running while any handle or the
/// [`MessageStream`] is alive, until the transport closes.
#[derive(Debug, Clone)]
pub struct Session {
    tx: mpsc::UnboundedSender<Request>,
}

impl Session {
    /// Start a driver task on the current tokio runtime.
    ///
    /// The [`MessageStream`] is unbounded: every inbound message is queued
    /// until it is read. A caller that only issues commands should drop the
    /// stream; the driver keeps running and stops buffering.
    pub fn spawn<T>(io: T, config: SessionConfig) -> (Session, MessageStream)
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (tx, requests) = mpsc::unbounded_channel();
        let (messages, rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(io, config, requests, messages));
        (Session { tx }, MessageStream { rx, driver })
    }

    /// Send a configuration command and wait for the receiver's ACK.
    ///
    /// Resolves with the ACK-ACK. A NAK rejects with
    /// [`CommandError::Rejected`] carrying the NAK.
    pub async fn request(
        &self,
        message: UbxMessage,
    ) -> std::result::Result<Message, CommandError<Message>> {
        self.submit(message, None).await
    }

    /// Like [`request`](Self::request) with a per-command deadline.
    pub async fn request_with_timeout(
        &self,
        message: UbxMessage,
        timeout: Duration,
    ) -> std::result::Result<Message, CommandError<Message>> {
        self.submit(message, Some(timeout)).await
    }

    async fn submit(
        &self,
        message: UbxMessage,
        timeout: Option<Duration>,
    ) -> std::result::Result<Message, CommandError<Message>> {
        let command = Command::new(message)?;
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Command {
                command,
                timeout,
                reply,
            })
            .map_err(|_| CommandError::Closed)?;
        let pending = rx.await.map_err(|_| CommandError::Closed)?;
        pending.await
    }

    /// Write bytes to the transport, outside the command queue.
    pub async fn write(&self, data: impl Into<Bytes>) -> Result<()> {
        let (done, rx) = oneshot::channel();
        self.tx
            .send(Request::Write {
                data: data.into(),
                done,
            })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// True once the driver has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Every decoded message from the receiver, in arrival order.
///
/// Frames that fail to decode are yielded as errors; the stream continues.
/// The stream ends when the transport closes.
#[derive(Debug)]
pub struct MessageStream {
    rx: mpsc::UnboundedReceiver<Decoded>,
    driver: JoinHandle<Result<()>>,
}

impl MessageStream {
    pub async fn recv(&mut self) -> Option<Decoded> {
        self.rx.recv().await
    }

    /// Wait for the driver to stop and report why.
    pub async fn join(self) -> Result<()> {
        match self.driver.await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "session driver failed");
                Err(SessionError::Closed)
            }
        }
    }
}

impl Stream for MessageStream {
    type Item = Decoded;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Decoded>> {
        self.rx.poll_recv(cx)
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// One queued write. Commands carry no completion handle; pass-through
/// writes report back to their caller.
struct WriteOp {
    data: Bytes,
    done: Option<oneshot::Sender<std::io::Result<()>>>,
}

async fn drive<T>(
    io: T,
    config: SessionConfig,
    mut requests: mpsc::UnboundedReceiver<Request>,
    messages: mpsc::UnboundedSender<Decoded>,
) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(io);
    let (writes, write_rx) = mpsc::unbounded_channel();
    let mut write_task = tokio::spawn(write_loop(writer, write_rx));
    let mut frames = FramedRead::new(reader, FrameCodec::with_config(config.frame.clone()));
    let mut queue = CommandQueue::with_timeout(AckMatcher, config.command_timeout);
    let mut accepting = true;

    let result = loop {
        if let Some(command) = queue.poll_transmit() {
            tracing::debug!(command = %command.message().name(), "transmitting");
            let _ = writes.send(WriteOp {
                data: command.bytes().clone(),
                done: None,
            });
        }
        if !accepting && messages.is_closed() {
            break Ok(());
        }

        let deadline = queue.deadline().map(Instant::from_std);
        let timer = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now));

        // Expiry is checked before anything else that became ready in the
        // same turn.
        tokio::select! {
            biased;

            () = timer, if deadline.is_some() => queue.handle_timeout(now()),

            written = &mut write_task => {
                break match written {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(err.into()),
                    Err(err) => {
                        tracing::error!(error = %err, "session writer failed");
                        Err(SessionError::Closed)
                    }
                };
            },

            request = requests.recv(), if accepting => match request {
                Some(Request::Command { command, timeout, reply }) => {
                    let timeout = timeout.unwrap_or(config.command_timeout);
                    let _ = reply.send(queue.push_with(command, timeout, now()));
                }
                Some(Request::Write { data, done }) => {
                    let _ = writes.send(WriteOp { data, done: Some(done) });
                }
                None => accepting = false,
            },

            frame = frames.next() => match frame {
                Some(Ok(frame)) => {
                    let decoded = Message::from_frame(frame);
                    match &decoded {
                        Ok(message) => queue.input(message, now()),
                        Err(err) => tracing::warn!(error = %err, "frame failed to decode"),
                    }
                    let _ = messages.send(decoded);
                }
                Some(Err(err)) => break Err(err.into()),
                None => {
                    tracing::debug!(
                        discarded = frames.decoder().discarded(),
                        "transport closed"
                    );
                    break Ok(());
                }
            },
        }
    };

    queue.close();
    if let Err(err) = &result {
        tracing::error!(error = %err, "session stopped");
    }
    result
}

/// Sole owner of the transport's write half, so commands and pass-through
/// writes never interleave and a slow write never blocks reading.
async fn write_loop<W>(
    mut writer: W,
    mut ops: mpsc::UnboundedReceiver<WriteOp>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(op) = ops.recv().await {
        let written = write_flush(&mut writer, &op.data).await;
        let failure = written
            .as_ref()
            .err()
            .map(|err| std::io::Error::new(err.kind(), err.to_string()));
        if let Some(done) = op.done {
            let _ = done.send(written);
        }
        if let Some(err) = failure {
            return Err(err);
        }
    }
    Ok(())
}

async fn write_flush<W>(writer: &mut W, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(data).await?;
    writer.flush().await
}
