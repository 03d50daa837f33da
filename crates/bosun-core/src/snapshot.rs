//! Persisted layout shape and the persistence collaborator boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::group::{GroupId, SessionGroup};
use crate::session::{SessionId, SessionStatus};

/// Persisted form of one session.
///
/// The id is informational: a restore re-spawns processes, so sessions get
/// fresh ids and only the record's order, name, cwd, shell, group
/// reference and startup command feed recreation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub name: String,
    pub group_id: Option<GroupId>,
    pub shell: String,
    pub cwd: PathBuf,
    pub status: SessionStatus,
    pub created_at: i64,
    pub startup_command: Option<String>,
}

/// Full snapshot: sessions + groups + active id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub sessions: Vec<SessionRecord>,
    pub groups: Vec<SessionGroup>,
    pub active_session_id: Option<SessionId>,
}

/// The persistence collaborator.
///
/// `save` is best-effort from the workspace's perspective (logged, never
/// surfaced); `load` returning `None` means no snapshot has ever been
/// written, which restores to an empty workspace rather than erroring.
pub trait LayoutStore: Send {
    fn save(&self, snapshot: &LayoutSnapshot) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<LayoutSnapshot>, StoreError>;
}
