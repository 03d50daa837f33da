//! bosun-core: session orchestration and split-view layout for the bosun
//! terminal workspace.
//!
//! This crate owns the in-memory model — sessions, groups, active focus,
//! split composition — and the protocols around it: the I/O bridge that
//! demultiplexes process output into per-session sinks, and the
//! save/restore protocol against the persistence collaborator. The
//! process host itself (the thing that spawns real shells) sits behind the
//! [`ProcessHost`] trait; `bosun-pty` provides the production
//! implementation.
//!
//! # Architecture
//!
//! - [`Workspace`] — the orchestration service every UI action enters.
//! - [`SessionRegistry`] — canonical arena of session records.
//! - [`GroupSet`] — named, ordered, collapsible session containers.
//! - [`SplitView`] — the Disabled/Enabled multi-pane layout machine.
//! - [`IoBridge`] — per-session output sinks fed from the host's shared
//!   event stream.
//! - [`pump`] — background tasks: host-event pump and interval autosave.

pub mod action;
pub mod bridge;
pub mod error;
pub mod group;
pub mod host;
pub mod pump;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod split;
pub mod workspace;

#[cfg(test)]
mod test_util;

pub use action::Action;
pub use bridge::{IoBridge, OutputReceiver};
pub use error::{HostError, StoreError, WorkspaceError};
pub use group::{GroupId, GroupSet, SessionGroup};
pub use host::{
    HostEvent, HostEventReceiver, HostEventSender, ProcessHost, SpawnSpec, SpawnedSession,
};
pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SessionStatus, DEFAULT_COLS, DEFAULT_ROWS};
pub use snapshot::{LayoutSnapshot, LayoutStore, SessionRecord};
pub use split::{SplitDirection, SplitRemoval, SplitView};
pub use workspace::{CreateParams, Workspace};
