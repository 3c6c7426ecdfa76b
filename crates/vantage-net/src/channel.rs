//! Queues between the network I/O thread and the tick thread.
//!
//! The I/O thread decodes server messages and pushes them through an
//! [`InboundSender`]; the tick loop owns the matching [`InboundQueue`] and
//! drains it completely at the start of every tick, so world mutations only
//! ever happen on the tick thread. Outbound messages travel the other way
//! through an [`Outbox`].

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use tracing::warn;

use crate::messages::{ClientMessage, ServerMessage};

/// Errors from pushing into a closed queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The receiving side has been dropped.
    #[error("channel disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Creates a connected inbound sender/queue pair.
pub fn inbound_channel() -> (InboundSender, InboundQueue) {
    let (tx, rx) = unbounded();
    (InboundSender { tx }, InboundQueue { rx })
}

/// Producer half, owned by the network I/O thread.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: Sender<ServerMessage>,
}

impl InboundSender {
    /// Enqueues a decoded server message for the tick thread.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Disconnected`] once the session is gone.
    pub fn send(&self, msg: ServerMessage) -> Result<(), ChannelError> {
        self.tx.send(msg).map_err(|_| ChannelError::Disconnected)
    }
}

/// Consumer half, owned by the tick loop.
#[derive(Debug)]
pub struct InboundQueue {
    rx: Receiver<ServerMessage>,
}

impl InboundQueue {
    /// Takes every message queued so far without blocking.
    pub fn drain(&self) -> Vec<ServerMessage> {
        let mut out = Vec::with_capacity(self.rx.len());
        loop {
            match self.rx.try_recv() {
                Ok(msg) => out.push(msg),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no messages are waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Creates a connected outbox and the receiver the network layer reads.
pub fn outbound_channel() -> (Outbox, Receiver<ClientMessage>) {
    let (tx, rx) = unbounded();
    (Outbox { tx }, rx)
}

/// Sending half for messages bound to the server.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: Sender<ClientMessage>,
}

impl Outbox {
    /// Sends a message to the network layer.
    ///
    /// A closed connection is logged and otherwise ignored: the session keeps
    /// ticking until its owner tears it down.
    pub fn send(&self, msg: ClientMessage) {
        if self.tx.send(msg).is_err() {
            warn!("Outbound channel closed, dropping client message");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
