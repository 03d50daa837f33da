//! Demultiplexes the host's shared output stream into per-session sinks.
//!
//! Each rendered session subscribes once and receives only its own bytes,
//! in arrival order. Unsubscribing (or dropping the receiver) releases the
//! sink, so nothing is ever delivered into a disposed surface.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::session::SessionId;

/// Receiving end handed to whatever renders a session's output.
pub type OutputReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

pub struct IoBridge {
    sinks: HashMap<SessionId, mpsc::UnboundedSender<Vec<u8>>>,
}

impl IoBridge {
    pub fn new() -> Self {
        Self {
            sinks: HashMap::new(),
        }
    }

    /// Register an output sink for `id`, replacing any previous one.
    pub fn subscribe(&mut self, id: SessionId) -> OutputReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sinks.insert(id, tx);
        rx
    }

    /// Tear down the sink for `id`. Safe to call for unknown ids.
    pub fn unsubscribe(&mut self, id: SessionId) {
        self.sinks.remove(&id);
    }

    pub fn is_subscribed(&self, id: SessionId) -> bool {
        self.sinks.contains_key(&id)
    }

    /// Deliver output bytes to the matching session's sink.
    ///
    /// Events for sessions without a sink are dropped. A closed receiver
    /// counts as an implicit unsubscribe and the sink is discarded.
    pub fn deliver(&mut self, id: SessionId, data: Vec<u8>) {
        let Some(sink) = self.sinks.get(&id) else {
            return;
        };
        if sink.send(data).is_err() {
            log::debug!("output sink for session {id} closed; dropping it");
            self.sinks.remove(&id);
        }
    }

    /// Append the synthetic process-exit notice to the session's output.
    ///
    /// Additive only: callers invoke this from the same single consumer
    /// that delivers output, so it can never be reordered ahead of bytes
    /// already delivered for the session.
    pub fn deliver_exit_notice(&mut self, id: SessionId, code: Option<u32>) {
        self.deliver(id, exit_notice(code));
    }
}

impl Default for IoBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_notice(code: Option<u32>) -> Vec<u8> {
    match code {
        Some(code) => format!("\r\n[process exited with code {code}]\r\n").into_bytes(),
        None => b"\r\n[process exited]\r\n".to_vec(),
    }
}
