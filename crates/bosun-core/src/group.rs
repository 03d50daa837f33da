use serde::{Deserialize, Serialize};

/// Unique identifier for a session group.
pub type GroupId = u64;

/// A named, ordered, collapsible container of sessions.
///
/// Groups never own session records; membership is derived from each
/// session's `group_id` back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGroup {
    pub id: GroupId,
    pub name: String,
    pub collapsed: bool,
    /// Sidebar ordering. Not required to be contiguous.
    pub order: i64,
}

/// Owns the set of groups and allocates their ids.
pub struct GroupSet {
    groups: Vec<SessionGroup>,
    next_id: GroupId,
}

impl GroupSet {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a new group at the end of the display order.
    pub fn create(&mut self, name: impl Into<String>) -> GroupId {
        let id = self.next_id;
        self.next_id += 1;
        self.groups.push(SessionGroup {
            id,
            name: name.into(),
            collapsed: false,
            order: self.groups.len() as i64,
        });
        id
    }

    /// Insert a group verbatim, as loaded from a snapshot.
    ///
    /// Bumps the id allocator past the restored id so later `create` calls
    /// cannot collide with it.
    pub fn insert_restored(&mut self, group: SessionGroup) {
        self.next_id = self.next_id.max(group.id + 1);
        self.groups.push(group);
    }

    pub fn remove(&mut self, id: GroupId) -> Option<SessionGroup> {
        let pos = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(pos))
    }

    pub fn rename(&mut self, id: GroupId, name: impl Into<String>) -> bool {
        match self.groups.iter_mut().find(|g| g.id == id) {
            Some(group) => {
                group.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Flip the collapsed flag, returning the new state.
    pub fn toggle_collapsed(&mut self, id: GroupId) -> Option<bool> {
        let group = self.groups.iter_mut().find(|g| g.id == id)?;
        group.collapsed = !group.collapsed;
        Some(group.collapsed)
    }

    pub fn get(&self, id: GroupId) -> Option<&SessionGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.get(id).is_some()
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SessionGroup> {
        self.groups.iter()
    }

    /// Groups in display order: `order` ascending, ties broken by
    /// insertion order (stable).
    pub fn sorted(&self) -> Vec<&SessionGroup> {
        let mut out: Vec<&SessionGroup> = self.groups.iter().collect();
        out.sort_by_key(|g| g.order);
        out
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for GroupSet {
    fn default() -> Self {
        Self::new()
    }
}
