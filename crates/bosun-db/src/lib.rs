//! bosun-db: SQLite-backed layout persistence for the bosun workspace.
//!
//! Stores the layout snapshot (sessions + groups + active id) relationally
//! and exposes it to the core through [`SqliteLayoutStore`], the
//! production `bosun_core::LayoutStore`.

pub mod layout;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub use layout::SqliteLayoutStore;

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    schema::initialize(&conn)?;
    Ok(conn)
}

/// Default database location under the user's data directory.
pub fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("bosun").join("layout.db3")
}
