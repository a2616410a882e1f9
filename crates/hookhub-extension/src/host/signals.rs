//! Named signals that extension signal hooks connect receivers to.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::ids::DispatchUid;

/// An event delivered to signal receivers.
#[derive(Debug, Clone)]
pub struct SignalEvent {
    /// Name of the signal that fired.
    pub signal: String,
    /// Identifier of the sender that fired the signal.
    pub sender: String,
    /// Arbitrary event data.
    pub payload: serde_json::Value,
}

/// Receiver callback. Held strongly for as long as the connection lives.
pub type SignalCallback = Arc<dyn Fn(&SignalEvent) + Send + Sync>;

struct Receiver {
    uid: DispatchUid,
    sender: Option<String>,
    callback: SignalCallback,
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("uid", &self.uid)
            .field("sender", &self.sender)
            .field("callback", &"<callback>")
            .finish()
    }
}

/// A named event with a list of connected receivers.
///
/// Connections are addressed by their [`DispatchUid`], never by callback
/// identity, so the same callback may be connected several times.
#[derive(Debug)]
pub struct Signal {
    name: String,
    receivers: RwLock<Vec<Receiver>>,
}

impl Signal {
    /// Creates a signal with no receivers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Returns the signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connects a receiver, optionally only for events from `sender`.
    ///
    /// Connecting a uid that is already connected is a no-op.
    pub fn connect(&self, callback: SignalCallback, sender: Option<String>, uid: DispatchUid) {
        let mut receivers = self.receivers.write().unwrap_or_else(|e| e.into_inner());

        if receivers.iter().any(|r| r.uid == uid) {
            debug!(signal = %self.name, dispatch_uid = %uid, "Receiver already connected");
            return;
        }

        receivers.push(Receiver {
            uid,
            sender,
            callback,
        });
        debug!(signal = %self.name, dispatch_uid = %uid, receivers = receivers.len(), "Receiver connected");
    }

    /// Disconnects the receiver with this uid.
    ///
    /// Returns `false` if no such receiver was connected.
    pub fn disconnect(&self, uid: DispatchUid) -> bool {
        let mut receivers = self.receivers.write().unwrap_or_else(|e| e.into_inner());
        let before = receivers.len();
        receivers.retain(|r| r.uid != uid);

        let removed = receivers.len() < before;
        debug!(signal = %self.name, dispatch_uid = %uid, removed = removed, "Receiver disconnected");
        removed
    }

    /// Fires the signal, calling matching receivers in connection order.
    ///
    /// Returns the number of receivers called.
    pub fn send(&self, sender: &str, payload: serde_json::Value) -> usize {
        let event = SignalEvent {
            signal: self.name.clone(),
            sender: sender.to_string(),
            payload,
        };

        // Callbacks run outside the lock so they may connect or disconnect.
        let callbacks: Vec<SignalCallback> = {
            let receivers = self.receivers.read().unwrap_or_else(|e| e.into_inner());
            receivers
                .iter()
                .filter(|r| r.sender.as_deref().is_none_or(|s| s == sender))
                .map(|r| r.callback.clone())
                .collect()
        };

        for callback in &callbacks {
            callback(&event);
        }

        trace!(signal = %self.name, sender = %sender, called = callbacks.len(), "Signal sent");
        callbacks.len()
    }

    /// Returns whether a receiver with this uid is connected.
    pub fn is_connected(&self, uid: DispatchUid) -> bool {
        self.receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|r| r.uid == uid)
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
