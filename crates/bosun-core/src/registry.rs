//! Canonical arena of session records.
//!
//! Keyed by opaque [`SessionId`] with explicit existence checks at every
//! access point; groups and the split view hold back-references only, so a
//! deleted session can never dangle. Insertion order is preserved and
//! defines listing order and cyclic focus traversal.

use std::collections::HashMap;

use crate::group::GroupId;
use crate::session::{Session, SessionId, SessionStatus};

pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    /// Insertion order of the ids in `sessions`.
    order: Vec<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn insert(&mut self, session: Session) {
        debug_assert!(!self.sessions.contains_key(&session.id));
        self.order.push(session.id);
        self.sessions.insert(session.id, session);
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(session)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sessions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    pub fn ids(&self) -> &[SessionId] {
        &self.order
    }

    pub fn first_id(&self) -> Option<SessionId> {
        self.order.first().copied()
    }

    /// Sessions belonging to `group` (or ungrouped when `None`), in
    /// insertion order.
    pub fn sessions_in_group(&self, group: Option<GroupId>) -> Vec<&Session> {
        self.iter().filter(|s| s.group_id == group).collect()
    }

    pub fn rename(&mut self, id: SessionId, name: impl Into<String>) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_group(&mut self, id: SessionId, group: Option<GroupId>) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.group_id = group;
                true
            }
            None => false,
        }
    }

    /// Local-only, idempotent status update. Returns `false` if the session
    /// no longer exists (e.g. an exit event raced a deletion).
    pub fn set_status(&mut self, id: SessionId, status: SessionStatus) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.status = status;
                true
            }
            None => false,
        }
    }

    /// The id after `id` in insertion order, wrapping at the end.
    pub fn next_after(&self, id: SessionId) -> Option<SessionId> {
        let pos = self.order.iter().position(|&other| other == id)?;
        Some(self.order[(pos + 1) % self.order.len()])
    }

    /// The id before `id` in insertion order, wrapping at the start.
    pub fn previous_before(&self, id: SessionId) -> Option<SessionId> {
        let pos = self.order.iter().position(|&other| other == id)?;
        let len = self.order.len();
        Some(self.order[(pos + len - 1) % len])
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
