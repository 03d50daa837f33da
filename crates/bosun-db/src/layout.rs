//! Snapshot save and load against the relational schema.
//!
//! The whole snapshot is replaced atomically on save; session rows carry
//! an explicit `position` column so the persisted order — which drives
//! restore order and default active selection — survives round-trips.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use bosun_core::{
    LayoutSnapshot, LayoutStore, SessionGroup, SessionRecord, SessionStatus, StoreError,
};

const META_ACTIVE_SESSION: &str = "active_session_id";
const META_SAVED_AT: &str = "saved_at";

pub fn save_snapshot(conn: &Connection, snapshot: &LayoutSnapshot) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM sessions", [])?;
    tx.execute("DELETE FROM groups", [])?;

    for group in &snapshot.groups {
        tx.execute(
            "INSERT INTO groups (id, name, collapsed, display_order) VALUES (?1, ?2, ?3, ?4)",
            params![group.id as i64, group.name, group.collapsed, group.order],
        )?;
    }

    for (position, session) in snapshot.sessions.iter().enumerate() {
        let (status, status_message) = status_to_columns(&session.status);
        tx.execute(
            "INSERT INTO sessions
                 (id, position, name, group_id, shell, cwd,
                  status, status_message, created_at, startup_command)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                session.id as i64,
                position as i64,
                session.name,
                session.group_id.map(|g| g as i64),
                session.shell,
                session.cwd.to_string_lossy().into_owned(),
                status,
                status_message,
                session.created_at,
                session.startup_command,
            ],
        )?;
    }

    match snapshot.active_session_id {
        Some(id) => {
            tx.execute(
                "INSERT INTO meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![META_ACTIVE_SESSION, id.to_string()],
            )?;
        }
        None => {
            tx.execute(
                "DELETE FROM meta WHERE key = ?1",
                params![META_ACTIVE_SESSION],
            )?;
        }
    }

    // Marks that a snapshot exists at all; an untouched database loads as
    // "no snapshot" rather than an empty layout.
    tx.execute(
        "INSERT INTO meta (key, value) VALUES (?1, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![META_SAVED_AT],
    )?;

    tx.commit()
}

pub fn load_snapshot(conn: &Connection) -> rusqlite::Result<Option<LayoutSnapshot>> {
    let saved_at: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![META_SAVED_AT],
            |row| row.get(0),
        )
        .optional()?;
    if saved_at.is_none() {
        return Ok(None);
    }

    let mut stmt =
        conn.prepare("SELECT id, name, collapsed, display_order FROM groups ORDER BY rowid")?;
    let groups = stmt
        .query_map([], |row| {
            Ok(SessionGroup {
                id: row.get::<_, i64>(0)? as u64,
                name: row.get(1)?,
                collapsed: row.get(2)?,
                order: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, group_id, shell, cwd,
                status, status_message, created_at, startup_command
         FROM sessions ORDER BY position",
    )?;
    let sessions = stmt
        .query_map([], |row| {
            Ok(SessionRecord {
                id: row.get::<_, i64>(0)? as u64,
                name: row.get(1)?,
                group_id: row.get::<_, Option<i64>>(2)?.map(|g| g as u64),
                shell: row.get(3)?,
                cwd: PathBuf::from(row.get::<_, String>(4)?),
                status: status_from_columns(&row.get::<_, String>(5)?, row.get(6)?),
                created_at: row.get(7)?,
                startup_command: row.get(8)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let active_session_id = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![META_ACTIVE_SESSION],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .and_then(|value| value.parse().ok());

    Ok(Some(LayoutSnapshot {
        sessions,
        groups,
        active_session_id,
    }))
}

fn status_to_columns(status: &SessionStatus) -> (&'static str, Option<&str>) {
    match status {
        SessionStatus::Running => ("running", None),
        SessionStatus::Stopped => ("stopped", None),
        SessionStatus::Error(message) => ("error", Some(message.as_str())),
    }
}

fn status_from_columns(status: &str, message: Option<String>) -> SessionStatus {
    match status {
        "stopped" => SessionStatus::Stopped,
        "error" => SessionStatus::Error(message.unwrap_or_default()),
        _ => SessionStatus::Running,
    }
}

/// `LayoutStore` over an owned SQLite connection.
pub struct SqliteLayoutStore {
    conn: Connection,
}

impl SqliteLayoutStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (and initialize if needed) the database at `path`.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Ok(Self::new(crate::open(path)?))
    }
}

impl LayoutStore for SqliteLayoutStore {
    fn save(&self, snapshot: &LayoutSnapshot) -> Result<(), StoreError> {
        save_snapshot(&self.conn, snapshot).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn load(&self) -> Result<Option<LayoutSnapshot>, StoreError> {
        load_snapshot(&self.conn).map_err(|e| StoreError::Backend(e.to_string()))
    }
}
