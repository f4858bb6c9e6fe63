use anyhow::{bail, Context, Result};
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use super::query::NameFilter;
use super::to_count;
use crate::models::{Counted, Reader};

/// Longest region code the `readers.state` column accepts.
pub const MAX_STATE_LEN: usize = 3;

fn reader_from_row(row: &Row<'_>) -> rusqlite::Result<Reader> {
    Ok(Reader {
        id: row.get(0)?,
        name: row.get(1)?,
        state: row.get(2)?,
    })
}

/// Insert a reader. Region codes longer than [`MAX_STATE_LEN`] characters are
/// rejected up front so the caller gets a readable message instead of a
/// `CHECK` constraint failure.
pub fn create_reader(conn: &Connection, name: &str, state: &str) -> Result<Reader> {
    if state.chars().count() > MAX_STATE_LEN {
        bail!("State code {state:?} is longer than {MAX_STATE_LEN} characters.");
    }

    conn.execute(
        "INSERT INTO readers (name, state) VALUES (?1, ?2)",
        params![name, state],
    )
    .context("failed to insert reader")?;

    Ok(Reader {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        state: state.to_string(),
    })
}

pub fn fetch_readers(conn: &Connection) -> Result<Vec<Reader>> {
    fetch_readers_matching(conn, &NameFilter::Any)
}

pub fn fetch_readers_matching(conn: &Connection, filter: &NameFilter) -> Result<Vec<Reader>> {
    let clause = filter.where_clause("r.name");
    let sql = format!(
        "SELECT r.id, r.name, r.state FROM readers r{} ORDER BY r.id",
        clause.sql
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare reader query")?;

    let readers = stmt
        .query_map(params_from_iter(clause.params.iter()), reader_from_row)
        .context("failed to load readers")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect readers")?;

    debug!(?filter, count = readers.len(), "fetched readers");
    Ok(readers)
}

pub fn count_readers(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM readers", [], |row| row.get(0))
        .context("failed to count readers")?;
    Ok(to_count(count))
}

/// Link a reader to each of `book_ids`. Using `INSERT OR IGNORE` makes repeated
/// links a no-op, so the association behaves like a set.
///
/// No transaction is opened here; callers that need the batch to be atomic
/// (the seeder) wrap the call in their own.
pub fn add_books_to_reader(conn: &Connection, reader_id: i64, book_ids: &[i64]) -> Result<()> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO reader_books (reader_id, book_id) VALUES (?1, ?2)")
        .context("failed to prepare reader book link")?;

    for book_id in book_ids {
        stmt.execute(params![reader_id, book_id])
            .with_context(|| format!("failed to link book {book_id} to reader {reader_id}"))?;
    }

    Ok(())
}

/// Each reader with the number of books they read, including readers with
/// none.
pub fn readers_with_book_counts(conn: &Connection) -> Result<Vec<Counted<Reader>>> {
    let mut stmt = conn
        .prepare(
            "SELECT r.id, r.name, r.state, COUNT(rb.book_id)
             FROM readers r
             LEFT JOIN reader_books rb ON rb.reader_id = r.id
             GROUP BY r.id
             ORDER BY r.id",
        )
        .context("failed to prepare reader book count query")?;

    let counts = stmt
        .query_map([], |row| {
            Ok(Counted::new(reader_from_row(row)?, to_count(row.get(3)?)))
        })
        .context("failed to count books per reader")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect reader book counts")?;

    Ok(counts)
}

/// Delete every reader; their book links cascade.
pub fn delete_all_readers(conn: &Connection) -> Result<usize> {
    let deleted = conn
        .execute("DELETE FROM readers", [])
        .context("failed to delete readers")?;
    debug!(deleted, "deleted readers");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::{create_author, create_book, fetch_books_for_reader, open_in_memory};

    #[test]
    fn long_state_codes_are_rejected() {
        let conn = open_in_memory().unwrap();

        let err = create_reader(&conn, "William Oppenheimer", "KENT").unwrap_err();
        assert!(err.to_string().contains("longer than 3"));
        assert_eq!(count_readers(&conn).unwrap(), 0);

        create_reader(&conn, "William Oppenheimer", "KY").unwrap();
        assert_eq!(count_readers(&conn).unwrap(), 1);
    }

    #[test]
    fn linking_the_same_book_twice_is_a_no_op() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Charlie Marples").unwrap();
        let date = NaiveDate::from_ymd_opt(1944, 9, 9).unwrap();
        let book = create_book(&conn, "House of Dark Hill", date, author.id).unwrap();
        let reader = create_reader(&conn, "Evelyn Kirkland", "KY").unwrap();

        add_books_to_reader(&conn, reader.id, &[book.id, book.id]).unwrap();
        add_books_to_reader(&conn, reader.id, &[book.id]).unwrap();

        assert_eq!(fetch_books_for_reader(&conn, reader.id).unwrap().len(), 1);
    }

    #[test]
    fn linking_an_unknown_book_fails() {
        let conn = open_in_memory().unwrap();
        let reader = create_reader(&conn, "Xavier Petrov", "KY").unwrap();
        assert!(add_books_to_reader(&conn, reader.id, &[404]).is_err());
    }

    #[test]
    fn book_counts_include_idle_readers_and_survive_deletes() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "David Harmon").unwrap();
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let first = create_book(&conn, "Sister on Blue Walk", date, author.id).unwrap();
        let second = create_book(&conn, "Brother in High Valley", date, author.id).unwrap();
        let avid = create_reader(&conn, "Sam Snake", "KY").unwrap();
        let idle = create_reader(&conn, "Rooster Jones", "OH").unwrap();
        add_books_to_reader(&conn, avid.id, &[first.id, second.id]).unwrap();

        let counts = readers_with_book_counts(&conn).unwrap();
        assert_eq!(
            counts,
            vec![Counted::new(avid, 2), Counted::new(idle.clone(), 0)]
        );

        let matching = fetch_readers_matching(&conn, &NameFilter::contains("Jones")).unwrap();
        assert_eq!(matching, vec![idle]);

        assert_eq!(delete_all_readers(&conn).unwrap(), 2);
        assert!(fetch_readers(&conn).unwrap().is_empty());
    }
}
