use anyhow::{anyhow, Context, Result};
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use super::query::NameFilter;
use super::to_count;
use crate::models::{Author, Counted};

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn counted_author_from_row(row: &Row<'_>) -> rusqlite::Result<Counted<Author>> {
    Ok(Counted::new(author_from_row(row)?, to_count(row.get(2)?)))
}

/// Insert a new author and return the hydrated struct.
pub fn create_author(conn: &Connection, name: &str) -> Result<Author> {
    conn.execute("INSERT INTO authors (name) VALUES (?1)", params![name])
        .context("failed to insert author")?;

    Ok(Author {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Every author in insertion order.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    fetch_authors_matching(conn, &NameFilter::Any)
}

pub fn fetch_authors_matching(conn: &Connection, filter: &NameFilter) -> Result<Vec<Author>> {
    let clause = filter.where_clause("a.name");
    let sql = format!("SELECT a.id, a.name FROM authors a{} ORDER BY a.id", clause.sql);

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare author query")?;

    let authors = stmt
        .query_map(params_from_iter(clause.params.iter()), author_from_row)
        .context("failed to load authors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect authors")?;

    debug!(?filter, count = authors.len(), "fetched authors");
    Ok(authors)
}

pub fn fetch_author(conn: &Connection, id: i64) -> Result<Author> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM authors WHERE id = ?1")
        .context("failed to prepare author lookup")?;

    let mut rows = stmt
        .query_map([id], author_from_row)
        .context("failed to look up author")?;

    match rows.next() {
        Some(author) => author.context("failed to read author row"),
        None => Err(anyhow!("Author {id} not found")),
    }
}

pub fn count_authors(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
        .context("failed to count authors")?;
    Ok(to_count(count))
}

/// Each author with the number of books they wrote. Authors without books are
/// included with a count of zero so "least books" questions see them.
pub fn authors_with_book_counts(conn: &Connection) -> Result<Vec<Counted<Author>>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, COUNT(b.id)
             FROM authors a
             LEFT JOIN books b ON b.author_id = a.id
             GROUP BY a.id
             ORDER BY a.id",
        )
        .context("failed to prepare author book count query")?;

    let counts = stmt
        .query_map([], counted_author_from_row)
        .context("failed to count books per author")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect author book counts")?;

    Ok(counts)
}

/// Authors who wrote strictly more than `threshold` books.
pub fn authors_with_more_books_than(
    conn: &Connection,
    threshold: u64,
) -> Result<Vec<Counted<Author>>> {
    let threshold = i64::try_from(threshold).context("book threshold out of range")?;
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, COUNT(b.id)
             FROM authors a
             INNER JOIN books b ON b.author_id = a.id
             GROUP BY a.id
             HAVING COUNT(b.id) > ?1
             ORDER BY a.id",
        )
        .context("failed to prepare prolific author query")?;

    let counts = stmt
        .query_map([threshold], counted_author_from_row)
        .context("failed to load prolific authors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect prolific authors")?;

    Ok(counts)
}

/// Each author with the total number of reader/book links across all of their
/// books: one reader reading two of the author's books counts twice.
pub fn authors_with_read_counts(conn: &Connection) -> Result<Vec<Counted<Author>>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, COUNT(rb.reader_id)
             FROM authors a
             LEFT JOIN books b ON b.author_id = a.id
             LEFT JOIN reader_books rb ON rb.book_id = b.id
             GROUP BY a.id
             ORDER BY a.id",
        )
        .context("failed to prepare author read count query")?;

    let counts = stmt
        .query_map([], counted_author_from_row)
        .context("failed to count reads per author")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect author read counts")?;

    Ok(counts)
}

/// For a single reader, how many of the books they read each author wrote.
/// Only authors that appear at least once are returned.
pub fn author_counts_for_reader(conn: &Connection, reader_id: i64) -> Result<Vec<Counted<Author>>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, COUNT(*)
             FROM reader_books rb
             INNER JOIN books b ON b.id = rb.book_id
             INNER JOIN authors a ON a.id = b.author_id
             WHERE rb.reader_id = ?1
             GROUP BY a.id
             ORDER BY a.id",
        )
        .context("failed to prepare reader author query")?;

    let counts = stmt
        .query_map([reader_id], counted_author_from_row)
        .context("failed to count authors for reader")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect reader author counts")?;

    Ok(counts)
}

/// Delete every author. The schema cascades to books and from there to the
/// reader join table.
pub fn delete_all_authors(conn: &Connection) -> Result<usize> {
    let deleted = conn
        .execute("DELETE FROM authors", [])
        .context("failed to delete authors")?;
    debug!(deleted, "deleted authors");
    Ok(deleted)
}
