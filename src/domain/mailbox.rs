//! Per-connection outbound queue.
//!
//! [`Mailbox`] wraps the sending half of an unbounded
//! [`tokio::sync::mpsc`] channel. The broker enqueues events while holding
//! its lock, and the connection task drains the receiver in FIFO order, so
//! a peer observes events in exactly the order the broker produced them.

use tokio::sync::mpsc;

use super::ServerEvent;

/// Sending side of one connection's outbound queue.
///
/// The queue is unbounded: enqueueing under the broker lock never waits on
/// a slow reader. A client that stops reading grows its own queue until
/// its socket closes, and only its own connection task holds that memory.
#[derive(Debug, Clone)]
pub struct Mailbox {
    sender: mpsc::UnboundedSender<ServerEvent>,
}

impl Mailbox {
    /// Creates a mailbox and the receiver the connection task drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueues an event without waiting.
    ///
    /// Returns `false` if the connection task has already gone away, in
    /// which case the event is dropped.
    pub fn deliver(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
