//! FIFO command queue with one command in flight.
//!
//! The queue does no I/O and reads no clock. Callers pass the current
//! [`Instant`] into every operation, transmit whatever
//! [`poll_transmit`](CommandQueue::poll_transmit) hands out, and call
//! [`handle_timeout`](CommandQueue::handle_timeout) once
//! [`deadline`](CommandQueue::deadline) has passed.
//!
//! ```text
//! push ─► queued ─► active ─┬─► resolved   (matcher)
//!                           ├─► rejected   (matcher, timeout)
//!                           └─► closed     (close / drop)
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::config::DEFAULT_COMMAND_TIMEOUT;
use crate::error::CommandError;
use crate::matcher::{ResponseMatcher, Verdict};

type Outcome<R> = Result<R, CommandError<R>>;

struct Entry<C, R> {
    command: C,
    timeout: Duration,
    reply: oneshot::Sender<Outcome<R>>,
}

struct Active<C, R> {
    entry: Entry<C, R>,
    deadline: Instant,
    transmitted: bool,
}

/// The caller's handle on a queued command.
///
/// Resolves exactly once. If the queue goes away first the result is
/// [`CommandError::Closed`].
#[derive(Debug)]
#[must_use = "a command's outcome is only observed by awaiting its Pending"]
pub struct Pending<R> {
    rx: oneshot::Receiver<Outcome<R>>,
}

impl<R> Future for Pending<R> {
    type Output = Outcome<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(CommandError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Serializes commands onto a channel that has no request ids.
pub struct CommandQueue<C, R, M> {
    matcher: M,
    timeout: Duration,
    queued: VecDeque<Entry<C, R>>,
    active: Option<Active<C, R>>,
    closed: bool,
    _response: PhantomData<fn(&R)>,
}

impl<C, R, M> CommandQueue<C, R, M>
where
    M: ResponseMatcher<C, R>,
{
    /// Create a queue with the default 5 s command timeout.
    pub fn new(matcher: M) -> Self {
        Self::with_timeout(matcher, DEFAULT_COMMAND_TIMEOUT)
    }

    pub fn with_timeout(matcher: M, timeout: Duration) -> Self {
        Self {
            matcher,
            timeout,
            queued: VecDeque::new(),
            active: None,
            closed: false,
            _response: PhantomData,
        }
    }

    /// Queue a command with the default timeout.
    pub fn push(&mut self, command: C, now: Instant) -> Pending<R> {
        let timeout = self.timeout;
        self.push_with(command, timeout, now)
    }

    /// Queue a command with its own timeout.
    ///
    /// If nothing is in flight the command becomes active immediately and
    /// its deadline is armed from `now`.
    pub fn push_with(&mut self, command: C, timeout: Duration, now: Instant) -> Pending<R> {
        let (reply, rx) = oneshot::channel();
        if self.closed {
            let _ = reply.send(Err(CommandError::Closed));
            return Pending { rx };
        }

        self.queued.push_back(Entry {
            command,
            timeout,
            reply,
        });
        self.promote(now);
        Pending { rx }
    }

    /// Offer a response to the active command.
    ///
    /// Without an active command this does nothing. A command whose
    /// deadline has passed is timed out first and never sees the response,
    /// however late the caller got around to delivering it.
    pub fn input(&mut self, response: &R, now: Instant) {
        let Some(active) = &self.active else {
            return;
        };
        if now >= active.deadline {
            self.handle_timeout(now);
            return;
        }

        match self.matcher.check(&active.entry.command, response) {
            Verdict::Ignore => {}
            Verdict::Resolve(response) => self.settle(Ok(response), now),
            Verdict::Reject(err) => self.settle(Err(err), now),
        }
    }

    /// Reject the active command if its deadline has passed.
    pub fn handle_timeout(&mut self, now: Instant) {
        let Some(active) = &self.active else {
            return;
        };
        if now < active.deadline {
            return;
        }

        let timeout = active.entry.timeout;
        tracing::warn!(timeout_ms = timeout.as_millis() as u64, "command timed out");
        self.settle(Err(CommandError::Timeout(timeout)), now);
    }

    /// When the active command times out, if one is in flight.
    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|active| active.deadline)
    }

    /// The newly activated command, once, for transmission.
    pub fn poll_transmit(&mut self) -> Option<&C> {
        let active = self.active.as_mut()?;
        if active.transmitted {
            return None;
        }
        active.transmitted = true;
        Some(&active.entry.command)
    }

    /// Reject the active and all queued commands with [`CommandError::Closed`].
    ///
    /// Later pushes are rejected immediately.
    pub fn close(&mut self) {
        self.closed = true;
        if let Some(active) = self.active.take() {
            let _ = active.entry.reply.send(Err(CommandError::Closed));
        }
        for entry in self.queued.drain(..) {
            let _ = entry.reply.send(Err(CommandError::Closed));
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Commands waiting behind the active one.
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    fn settle(&mut self, outcome: Outcome<R>, now: Instant) {
        if let Some(active) = self.active.take() {
            tracing::debug!(ok = outcome.is_ok(), "command settled");
            // The caller may have stopped waiting.
            let _ = active.entry.reply.send(outcome);
        }
        self.promote(now);
    }

    fn promote(&mut self, now: Instant) {
        if self.active.is_some() {
            return;
        }
        let Some(entry) = self.queued.pop_front() else {
            return;
        };

        tracing::debug!(
            timeout_ms = entry.timeout.as_millis() as u64,
            queued = self.queued.len(),
            "command active"
        );
        self.active = Some(Active {
            deadline: now + entry.timeout,
            entry,
            transmitted: false,
        });
    }
}

impl<C, R, M> std::fmt::Debug for CommandQueue<C, R, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("timeout", &self.timeout)
            .field("active", &self.active.is_some())
            .field("queued", &self.queued.len())
            .field("closed", &self.closed)
            .finish()
    }
}
