use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::DatabaseLocation;

/// Open the configured database, run lazy migrations, and return a live
/// connection. File-backed databases get their parent directory created on
/// demand.
pub fn open(location: &DatabaseLocation) -> Result<Connection> {
    let conn = match location {
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
            info!(path = %path.display(), "opening library database");
            Connection::open(path).context("failed to open SQLite database")?
        }
        DatabaseLocation::InMemory => {
            info!("opening in-memory library database");
            Connection::open_in_memory().context("failed to open in-memory SQLite database")?
        }
    };

    ensure_schema(&conn)?;
    Ok(conn)
}

/// Shorthand for a fresh in-memory database with the schema applied.
pub fn open_in_memory() -> Result<Connection> {
    open(&DatabaseLocation::InMemory)
}

/// Create every table if it is missing. The function also toggles
/// `PRAGMA foreign_keys = ON` so cascading deletes from authors to books and
/// from books/readers to the join table actually fire.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create authors table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            pub_date TEXT NOT NULL,
            author_id INTEGER NOT NULL,
            FOREIGN KEY(author_id) REFERENCES authors(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create books table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS readers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            state TEXT NOT NULL CHECK (length(state) <= 3)
        )",
        [],
    )
    .context("failed to create readers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reader_books (
            reader_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            PRIMARY KEY (reader_id, book_id),
            FOREIGN KEY(reader_id) REFERENCES readers(id) ON DELETE CASCADE,
            FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create reader_books table")?;

    debug!("library schema ready");
    Ok(())
}
