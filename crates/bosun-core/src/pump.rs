//! Background tasks that keep the workspace fed.
//!
//! The event pump drains the host's shared event stream into the
//! workspace; the autosave task snapshots the layout on a fixed interval
//! and once more at shutdown. Both lock the shared workspace briefly per
//! step and never hold the guard across an await.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::host::HostEventReceiver;
use crate::workspace::Workspace;

/// Drain host events into the workspace until the host side closes the
/// channel (i.e. the host was dropped).
pub fn start_event_pump(
    workspace: Arc<Mutex<Workspace>>,
    mut events: HostEventReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Ok(mut ws) = workspace.lock() else {
                return; // Poisoned lock.
            };
            ws.handle_host_event(event);
        }
    })
}

/// Save the layout every `period`, and a final time when the stop channel
/// fires (shutdown). Saves are best-effort; the workspace logs and
/// swallows store failures.
pub fn start_autosave(
    workspace: Arc<Mutex<Workspace>>,
    period: Duration,
    mut stop_rx: mpsc::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = stop_rx.recv() => {
                    if let Ok(ws) = workspace.lock() {
                        ws.save();
                    }
                    return;
                }
            }
            let Ok(ws) = workspace.lock() else {
                return;
            };
            ws.save();
        }
    })
}
