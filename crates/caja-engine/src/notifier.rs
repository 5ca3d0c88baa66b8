//! # Event Notifier
//!
//! Fire-and-forget dispatch of domain events to the host's fan-out loop.
//!
//! ## Decoupling Rule
//! Events are collected during a transaction and emitted only AFTER a
//! successful commit, over an unbounded channel. The storage failure domain
//! and the notification failure domain never mix:
//!
//! - emission is never awaited inside the atomic unit
//! - a closed or missing sink logs a warning and drops the event
//! - nothing here can roll back committed state
//!
//! Delivery is therefore at-most-once best-effort from the engine's point of
//! view; hosts that need stronger guarantees put a durable queue behind the
//! receiving half.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use caja_core::DomainEvent;

/// Handle for emitting domain events.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<DomainEvent>>,
}

impl Notifier {
    /// Creates a notifier and the receiving half the host drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx: Some(tx) }, rx)
    }

    /// A notifier with no sink: every event is dropped silently.
    pub fn disabled() -> Self {
        Notifier { tx: None }
    }

    /// Emits an event, best-effort.
    ///
    /// Never blocks, never errors. A send failure (receiver dropped) is
    /// logged and swallowed.
    pub fn emit(&self, event: DomainEvent) {
        let Some(tx) = &self.tx else {
            debug!(kind = event.kind(), "Notifier disabled; dropping event");
            return;
        };

        if let Err(err) = tx.send(event) {
            warn!(kind = err.0.kind(), "Event sink closed; dropping event");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
