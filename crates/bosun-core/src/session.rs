use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::group::GroupId;

/// Unique identifier for a terminal session.
pub type SessionId = u64;

/// Default terminal dimensions used when the caller does not propose any.
pub const DEFAULT_ROWS: u16 = 24;
pub const DEFAULT_COLS: u16 = 80;

/// Status of a terminal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SessionStatus {
    Running,
    Stopped,
    Error(String),
}

/// A managed shell session and its UI-facing metadata.
///
/// The registry is the sole owner of these records. Groups and the split
/// view refer to sessions by [`SessionId`] only; the matching output sink
/// lives in the I/O bridge under the same id and is released on deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    /// `None` means ungrouped, which is a valid state rather than an error.
    pub group_id: Option<GroupId>,
    /// Shell path as resolved by the process host.
    pub shell: String,
    /// Working directory as resolved by the process host.
    pub cwd: PathBuf,
    /// Command written to the shell shortly after it starts, if any.
    pub startup_command: Option<String>,
    pub status: SessionStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Last dimensions requested from the host.
    pub rows: u16,
    pub cols: u16,
}
