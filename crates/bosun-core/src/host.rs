//! Process-host boundary: the contract the orchestration core requires from
//! whatever actually spawns and feeds interactive shells.
//!
//! The host consumes commands keyed by [`SessionId`] and produces a single
//! shared stream of [`HostEvent`]s. The core demultiplexes that stream into
//! per-session sinks (see [`crate::bridge`]); cross-session ordering is
//! neither guaranteed nor required, per-session arrival order is preserved.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::error::HostError;
use crate::session::SessionId;

/// Parameters for spawning a session's shell process.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    /// Shell to launch; `None` lets the host pick the user's default.
    pub shell: Option<String>,
    /// Working directory; `None` lets the host fall back to home.
    pub cwd: Option<PathBuf>,
    pub rows: u16,
    pub cols: u16,
}

/// What the host reports back after a successful spawn.
///
/// The host resolves defaults (shell path, working directory), so the core
/// records what actually ran rather than what was requested.
#[derive(Debug, Clone)]
pub struct SpawnedSession {
    pub shell: String,
    pub cwd: PathBuf,
}

/// Events emitted by the process host on the shared event channel.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Bytes produced by the session's process.
    Output { id: SessionId, data: Vec<u8> },
    /// The session's process terminated. `code` is `None` when the host
    /// only observed the output stream closing.
    Exit { id: SessionId, code: Option<u32> },
}

pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Commands the core issues to the process host.
///
/// `spawn` and `kill` failures propagate to the caller; `write` and
/// `resize` are treated as fire-and-forget by the workspace, which logs
/// and swallows their errors.
pub trait ProcessHost: Send + Sync {
    fn spawn(&self, id: SessionId, spec: &SpawnSpec) -> Result<SpawnedSession, HostError>;
    fn write(&self, id: SessionId, data: &[u8]) -> Result<(), HostError>;
    fn resize(&self, id: SessionId, rows: u16, cols: u16) -> Result<(), HostError>;
    fn kill(&self, id: SessionId) -> Result<(), HostError>;
}
