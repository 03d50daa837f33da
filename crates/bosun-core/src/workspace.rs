//! The orchestration service: one explicit instance owning sessions,
//! groups, split view, active focus and the host/store collaborators.
//!
//! Every UI action enters through here. Mutations are plain `&mut self`
//! steps, so they are atomic and non-preemptible with respect to each
//! other; the embedding application wraps the workspace in `Arc<Mutex<…>>`
//! and the background pumps (see [`crate::pump`]) lock it briefly per
//! event. Host calls that can fail (spawn, kill) propagate their error
//! with local state untouched; write and resize are fire-and-forget.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::bridge::{IoBridge, OutputReceiver};
use crate::error::WorkspaceError;
use crate::group::{GroupId, GroupSet, SessionGroup};
use crate::host::{HostEvent, ProcessHost, SpawnSpec};
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionId, SessionStatus, DEFAULT_COLS, DEFAULT_ROWS};
use crate::snapshot::{LayoutSnapshot, LayoutStore, SessionRecord};
use crate::split::{SplitDirection, SplitRemoval, SplitView};

/// How long to let a fresh shell initialize before its startup command is
/// written.
const STARTUP_COMMAND_DELAY: Duration = Duration::from_millis(500);

/// Parameters for [`Workspace::create_session`].
#[derive(Debug, Clone, Default)]
pub struct CreateParams {
    pub name: String,
    pub shell: Option<String>,
    pub cwd: Option<PathBuf>,
    pub group_id: Option<GroupId>,
    pub startup_command: Option<String>,
    pub rows: Option<u16>,
    pub cols: Option<u16>,
}

impl CreateParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

pub struct Workspace {
    registry: SessionRegistry,
    groups: GroupSet,
    split: SplitView,
    bridge: IoBridge,
    active: Option<SessionId>,
    host: Arc<dyn ProcessHost>,
    store: Option<Box<dyn LayoutStore>>,
    next_session_id: SessionId,
}

impl Workspace {
    /// A workspace without a persistence collaborator; save/load degrade
    /// to logged no-ops.
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            groups: GroupSet::new(),
            split: SplitView::new(),
            bridge: IoBridge::new(),
            active: None,
            host,
            store: None,
            next_session_id: 1,
        }
    }

    pub fn with_store(host: Arc<dyn ProcessHost>, store: Box<dyn LayoutStore>) -> Self {
        let mut workspace = Self::new(host);
        workspace.store = Some(store);
        workspace
    }

    // ---- session lifecycle ----

    /// Create a session via a round-trip to the process host.
    ///
    /// The record is inserted only after the host confirms the spawn; a
    /// host failure propagates and leaves the workspace untouched. On
    /// success the new session becomes active, the initial dimensions are
    /// pushed to the host, and any startup command is scheduled after a
    /// short shell-initialization delay.
    pub fn create_session(&mut self, params: CreateParams) -> Result<SessionId, WorkspaceError> {
        if let Some(group) = params.group_id {
            if !self.groups.contains(group) {
                return Err(WorkspaceError::GroupNotFound(group));
            }
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        let rows = params.rows.unwrap_or(DEFAULT_ROWS);
        let cols = params.cols.unwrap_or(DEFAULT_COLS);
        let spec = SpawnSpec {
            shell: params.shell.clone(),
            cwd: params.cwd.clone(),
            rows,
            cols,
        };
        let spawned = self.host.spawn(id, &spec)?;

        if let Err(e) = self.host.resize(id, rows, cols) {
            log::warn!("initial resize for session {id} failed: {e}");
        }

        self.registry.insert(Session {
            id,
            name: params.name,
            group_id: params.group_id,
            shell: spawned.shell,
            cwd: spawned.cwd,
            startup_command: params.startup_command.clone(),
            status: SessionStatus::Running,
            created_at: Utc::now().timestamp(),
            rows,
            cols,
        });
        self.active = Some(id);

        if let Some(command) = params.startup_command {
            schedule_startup_command(Arc::clone(&self.host), id, command);
        }

        log::info!("created session {id}");
        Ok(id)
    }

    /// Delete a session.
    ///
    /// Host deletion happens first; if it fails, nothing changes locally.
    /// On success the output sink is released, the session leaves the
    /// split view (which may disable it), the record is removed, and the
    /// active selection falls back to a remaining session — never `None`
    /// while any session exists.
    pub fn delete_session(&mut self, id: SessionId) -> Result<(), WorkspaceError> {
        if !self.registry.contains(id) {
            log::debug!("delete of unknown session {id} ignored");
            return Ok(());
        }
        self.host.kill(id)?;

        self.bridge.unsubscribe(id);
        if let SplitRemoval::Disabled {
            remaining: Some(remaining),
        } = self.split.remove(id)
        {
            if self.registry.contains(remaining) {
                self.active = Some(remaining);
            }
        }
        self.registry.remove(id);
        if self.active == Some(id) {
            self.active = self.registry.first_id();
        }

        log::info!("deleted session {id}");
        Ok(())
    }

    pub fn rename_session(
        &mut self,
        id: SessionId,
        name: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        if self.registry.rename(id, name) {
            Ok(())
        } else {
            Err(WorkspaceError::SessionNotFound(id))
        }
    }

    /// Move a session into a group (or out of any, with `None`). The
    /// target group must exist.
    pub fn set_session_group(
        &mut self,
        id: SessionId,
        group: Option<GroupId>,
    ) -> Result<(), WorkspaceError> {
        if let Some(group) = group {
            if !self.groups.contains(group) {
                return Err(WorkspaceError::GroupNotFound(group));
            }
        }
        if self.registry.set_group(id, group) {
            Ok(())
        } else {
            Err(WorkspaceError::SessionNotFound(id))
        }
    }

    pub fn set_startup_command(
        &mut self,
        id: SessionId,
        command: Option<String>,
    ) -> Result<(), WorkspaceError> {
        match self.registry.get_mut(id) {
            Some(session) => {
                session.startup_command = command;
                Ok(())
            }
            None => Err(WorkspaceError::SessionNotFound(id)),
        }
    }

    /// Local-only status transition, driven by bridge exit events.
    /// Idempotent; silently ignores ids that no longer exist.
    pub fn update_status(&mut self, id: SessionId, status: SessionStatus) {
        self.registry.set_status(id, status);
    }

    // ---- I/O ----

    /// Fire-and-forget input to the session's process. Failures are
    /// logged, never surfaced; the UI does not block on delivery.
    pub fn write(&self, id: SessionId, data: &[u8]) {
        if let Err(e) = self.host.write(id, data) {
            log::warn!("write to session {id} failed: {e}");
        }
    }

    /// Fire-and-forget resize, issued whenever the session's display
    /// surface is re-measured. Records the requested dimensions locally.
    pub fn resize(&mut self, id: SessionId, rows: u16, cols: u16) {
        if let Some(session) = self.registry.get_mut(id) {
            session.rows = rows;
            session.cols = cols;
        }
        if let Err(e) = self.host.resize(id, rows, cols) {
            log::warn!("resize of session {id} failed: {e}");
        }
    }

    /// Register the output sink for a rendered session. Returns `None`
    /// for unknown ids.
    pub fn subscribe_output(&mut self, id: SessionId) -> Option<OutputReceiver> {
        if !self.registry.contains(id) {
            return None;
        }
        Some(self.bridge.subscribe(id))
    }

    /// Tear down a session's output sink when its display surface goes
    /// away.
    pub fn unsubscribe_output(&mut self, id: SessionId) {
        self.bridge.unsubscribe(id);
    }

    /// Feed one host event into the model. The referenced session may
    /// have been deleted while the event was in flight, so the id is
    /// re-validated before anything is committed.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Output { id, data } => {
                if self.registry.contains(id) {
                    self.bridge.deliver(id, data);
                } else {
                    log::debug!("dropping output for deleted session {id}");
                }
            }
            HostEvent::Exit { id, code } => {
                if !self.registry.contains(id) {
                    log::debug!("dropping exit for deleted session {id}");
                    return;
                }
                self.update_status(id, SessionStatus::Stopped);
                self.bridge.deliver_exit_notice(id, code);
                log::info!("session {id} exited (code {code:?})");
            }
        }
    }

    // ---- focus ----

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active
    }

    /// Set the active selection. Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<SessionId>) {
        match id {
            Some(id) if !self.registry.contains(id) => {
                log::debug!("ignoring activation of unknown session {id}");
            }
            other => self.active = other,
        }
    }

    /// Cyclic focus over registry insertion order. A no-op with fewer
    /// than two sessions.
    pub fn focus_next(&mut self) {
        self.focus_step(true);
    }

    pub fn focus_previous(&mut self) {
        self.focus_step(false);
    }

    fn focus_step(&mut self, forward: bool) {
        match self.active {
            Some(current) => {
                let next = if forward {
                    self.registry.next_after(current)
                } else {
                    self.registry.previous_before(current)
                };
                if let Some(next) = next {
                    self.active = Some(next);
                }
            }
            None => self.active = self.registry.first_id(),
        }
    }

    /// 1-based focus shortcut; out-of-range indexes are a no-op.
    pub fn focus_by_index(&mut self, index: usize) {
        if index == 0 || index > self.registry.len() {
            return;
        }
        self.active = Some(self.registry.ids()[index - 1]);
    }

    // ---- groups ----

    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        self.groups.create(name)
    }

    /// Delete a group. Two-step protocol: every member is re-parented to
    /// ungrouped first, then the group itself is removed, so an
    /// interruption between the steps leaves sessions ungrouped and the
    /// group present — the safe failure direction. Unknown ids are a
    /// no-op.
    pub fn delete_group(&mut self, id: GroupId) {
        if !self.groups.contains(id) {
            log::debug!("delete of unknown group {id} ignored");
            return;
        }
        let members: Vec<SessionId> = self
            .registry
            .sessions_in_group(Some(id))
            .iter()
            .map(|s| s.id)
            .collect();
        for member in members {
            self.registry.set_group(member, None);
        }
        self.groups.remove(id);
        log::info!("deleted group {id}");
    }

    pub fn rename_group(
        &mut self,
        id: GroupId,
        name: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        if self.groups.rename(id, name) {
            Ok(())
        } else {
            Err(WorkspaceError::GroupNotFound(id))
        }
    }

    pub fn toggle_group_collapsed(&mut self, id: GroupId) -> Result<bool, WorkspaceError> {
        self.groups
            .toggle_collapsed(id)
            .ok_or(WorkspaceError::GroupNotFound(id))
    }

    // ---- split view ----

    pub fn split_view(&self) -> &SplitView {
        &self.split
    }

    /// Compose the given sessions side by side. Ids that no longer exist
    /// are dropped (defensive re-validation); fewer than two valid ids is
    /// a no-op. On success the first pane becomes active.
    pub fn enable_split(&mut self, ids: &[SessionId], direction: SplitDirection) {
        let mut valid: Vec<SessionId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if self.registry.contains(id) && !valid.contains(&id) {
                valid.push(id);
            }
        }
        let first = valid.first().copied();
        if self.split.enable(valid, direction) {
            self.active = first;
        }
    }

    /// Add a session to the split view. When the view is disabled this
    /// seeds a new split from the current active session plus `id`
    /// (no-op if they coincide or nothing is active).
    pub fn add_to_split(&mut self, id: SessionId) {
        if !self.registry.contains(id) {
            return;
        }
        if self.split.is_enabled() {
            self.split.add(id);
            return;
        }
        let Some(active) = self.active else {
            return;
        };
        if active == id {
            return;
        }
        let direction = self.split.direction();
        self.split.enable(vec![active, id], direction);
    }

    /// Remove a session from the split view; dropping below two panes
    /// disables the view and focuses the sole survivor.
    pub fn remove_from_split(&mut self, id: SessionId) {
        if let SplitRemoval::Disabled {
            remaining: Some(remaining),
        } = self.split.remove(id)
        {
            if self.registry.contains(remaining) {
                self.active = Some(remaining);
            }
        }
    }

    pub fn set_split_direction(&mut self, direction: SplitDirection) {
        self.split.set_direction(direction);
    }

    /// Interactive divider drag; see [`SplitView::resize_divider`].
    pub fn resize_divider(&mut self, divider: usize, pointer_fraction: f32) {
        self.split.resize_divider(divider, pointer_fraction);
    }

    /// Compose every session of a group into a split. No-op for fewer
    /// than two members.
    pub fn split_group(&mut self, group: GroupId, direction: SplitDirection) {
        let members: Vec<SessionId> = self
            .registry
            .sessions_in_group(Some(group))
            .iter()
            .map(|s| s.id)
            .collect();
        self.enable_split(&members, direction);
    }

    // ---- accessors ----

    pub fn sessions(&self) -> Vec<&Session> {
        self.registry.iter().collect()
    }

    pub fn get_session(&self, id: SessionId) -> Option<&Session> {
        self.registry.get(id)
    }

    pub fn sessions_in_group(&self, group: Option<GroupId>) -> Vec<&Session> {
        self.registry.sessions_in_group(group)
    }

    pub fn groups_sorted(&self) -> Vec<&SessionGroup> {
        self.groups.sorted()
    }

    pub fn get_group(&self, id: GroupId) -> Option<&SessionGroup> {
        self.groups.get(id)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ---- persistence ----

    /// Assemble the current layout snapshot.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            sessions: self
                .registry
                .iter()
                .map(|s| SessionRecord {
                    id: s.id,
                    name: s.name.clone(),
                    group_id: s.group_id,
                    shell: s.shell.clone(),
                    cwd: s.cwd.clone(),
                    status: s.status.clone(),
                    created_at: s.created_at,
                    startup_command: s.startup_command.clone(),
                })
                .collect(),
            groups: self.groups.iter().cloned().collect(),
            active_session_id: self.active,
        }
    }

    /// Best-effort save of the full snapshot. Runs opportunistically (on
    /// a fixed interval and at shutdown); failures are logged and
    /// swallowed, and a missing store degrades to a no-op.
    pub fn save(&self) {
        let Some(store) = &self.store else {
            log::debug!("no layout store configured; skipping save");
            return;
        };
        if let Err(e) = store.save(&self.snapshot()) {
            log::warn!("layout save failed: {e}");
        }
    }

    /// Restore the last snapshot, if any.
    ///
    /// Groups are inserted first, verbatim — they have no dependency on
    /// sessions. Sessions are then recreated strictly sequentially in
    /// persisted order through the normal create path; the order matters
    /// because it drives default active selection and because spawning is
    /// a side-effecting host call that must not be issued concurrently. A
    /// failed entry is logged and skipped without aborting the rest. The
    /// first successfully recreated session becomes active, and every
    /// restored session starts Running — only metadata is resumed, never
    /// process state. No error escapes.
    pub fn load(&mut self) {
        let Some(store) = &self.store else {
            log::debug!("no layout store configured; skipping load");
            return;
        };
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                log::warn!("layout load failed: {e}");
                return;
            }
        };

        for group in snapshot.groups {
            self.groups.insert_restored(group);
        }

        let mut first_restored = None;
        for record in snapshot.sessions {
            // A group reference the snapshot no longer contains restores
            // as ungrouped rather than dangling.
            let group_id = record.group_id.filter(|&g| self.groups.contains(g));
            let params = CreateParams {
                name: record.name.clone(),
                shell: Some(record.shell),
                cwd: Some(record.cwd),
                group_id,
                startup_command: record.startup_command,
                rows: None,
                cols: None,
            };
            match self.create_session(params) {
                Ok(id) => {
                    if first_restored.is_none() {
                        first_restored = Some(id);
                    }
                }
                Err(e) => {
                    log::warn!("failed to restore session '{}': {e}", record.name);
                }
            }
        }

        if first_restored.is_some() {
            self.active = first_restored;
        }
        log::info!(
            "restored {} sessions, {} groups",
            self.registry.len(),
            self.groups.len()
        );
    }
}

/// Give the shell a moment to initialize, then feed it the startup
/// command. Delivery is best-effort like any other write.
fn schedule_startup_command(host: Arc<dyn ProcessHost>, id: SessionId, command: String) {
    std::thread::spawn(move || {
        std::thread::sleep(STARTUP_COMMAND_DELAY);
        let line = format!("{command}\n");
        if let Err(e) = host.write(id, line.as_bytes()) {
            log::warn!("startup command for session {id} failed: {e}");
        }
    });
}
