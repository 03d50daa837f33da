use thiserror::Error;

use crate::group::GroupId;
use crate::session::SessionId;

/// Errors reported by a process host implementation.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn shell: {0}")]
    Spawn(String),
    #[error("host I/O error: {0}")]
    Io(String),
    #[error("host has no session {0}")]
    SessionNotFound(SessionId),
}

/// Errors reported by a layout store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("layout store failure: {0}")]
    Backend(String),
}

/// Errors surfaced to callers of the workspace.
///
/// Host failures during create/delete propagate here with local state left
/// unchanged. Fire-and-forget paths (write, resize, save) never produce
/// one of these; they log and swallow instead.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("no session with id {0}")]
    SessionNotFound(SessionId),
    #[error("no group with id {0}")]
    GroupNotFound(GroupId),
}
