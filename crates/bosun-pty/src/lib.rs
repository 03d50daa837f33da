//! bosun-pty: the production process host for the bosun workspace.
//!
//! Spawns login shells over portable-pty, pumps their output on dedicated
//! per-session reader threads into the core's shared event channel, and
//! reports process exits.
//!
//! # Architecture
//!
//! - [`PtyHandle`] — low-level PTY process management (spawn, read, write,
//!   resize, kill).
//! - [`PtyHost`] — implements `bosun_core::ProcessHost` over a table of
//!   handles, one reader thread per live session.

pub mod host;
pub mod pty;

pub use host::PtyHost;
pub use pty::{PtyError, PtyHandle};
