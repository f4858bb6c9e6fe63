use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use super::query::BookFilter;
use super::to_count;
use crate::models::{Book, Counted};

/// Columns shared by every book query, in the order `book_from_row` expects.
const BOOK_COLUMNS: &str = "b.id, b.title, b.pub_date, b.author_id, a.name";

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        pub_date: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
    })
}

fn counted_book_from_row(row: &Row<'_>) -> rusqlite::Result<Counted<Book>> {
    Ok(Counted::new(book_from_row(row)?, to_count(row.get(5)?)))
}

/// Insert a book owned by `author_id`. The author's name is read back so the
/// returned struct displays the same way a fetched one would.
pub fn create_book(
    conn: &Connection,
    title: &str,
    pub_date: NaiveDate,
    author_id: i64,
) -> Result<Book> {
    conn.execute(
        "INSERT INTO books (title, pub_date, author_id) VALUES (?1, ?2, ?3)",
        params![title, pub_date, author_id],
    )
    .context("failed to insert book")?;

    let id = conn.last_insert_rowid();
    let author = super::fetch_author(conn, author_id)?;
    Ok(Book {
        id,
        title: title.to_string(),
        pub_date,
        author_id,
        author_name: author.name,
    })
}

pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    fetch_books_matching(conn, &BookFilter::new())
}

/// Books matching `filter`, ordered by id.
pub fn fetch_books_matching(conn: &Connection, filter: &BookFilter) -> Result<Vec<Book>> {
    let clause = filter.where_clause();
    let sql = format!(
        "SELECT {BOOK_COLUMNS}
         FROM books b
         INNER JOIN authors a ON a.id = b.author_id{}
         ORDER BY b.id",
        clause.sql
    );

    let mut stmt = conn.prepare(&sql).context("failed to prepare book query")?;

    let books = stmt
        .query_map(params_from_iter(clause.params.iter()), book_from_row)
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    debug!(?filter, count = books.len(), "fetched books");
    Ok(books)
}

/// Every book linked to a reader.
pub fn fetch_books_for_reader(conn: &Connection, reader_id: i64) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT {BOOK_COLUMNS}
         FROM books b
         INNER JOIN authors a ON a.id = b.author_id
         INNER JOIN reader_books rb ON rb.book_id = b.id
         WHERE rb.reader_id = ?1
         ORDER BY b.id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare reader books query")?;

    let books = stmt
        .query_map([reader_id], book_from_row)
        .context("failed to iterate reader books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect reader books")?;

    Ok(books)
}

pub fn count_books(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .context("failed to count books")?;
    Ok(to_count(count))
}

/// Each book with the number of readers linked to it, unread books included.
pub fn books_with_reader_counts(conn: &Connection) -> Result<Vec<Counted<Book>>> {
    let sql = format!(
        "SELECT {BOOK_COLUMNS}, COUNT(rb.reader_id)
         FROM books b
         INNER JOIN authors a ON a.id = b.author_id
         LEFT JOIN reader_books rb ON rb.book_id = b.id
         GROUP BY b.id
         ORDER BY b.id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare book reader count query")?;

    let counts = stmt
        .query_map([], counted_book_from_row)
        .context("failed to count readers per book")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect book reader counts")?;

    Ok(counts)
}

/// Books read by strictly more than `threshold` readers.
pub fn books_read_by_more_than(conn: &Connection, threshold: u64) -> Result<Vec<Counted<Book>>> {
    let threshold = i64::try_from(threshold).context("reader threshold out of range")?;
    let sql = format!(
        "SELECT {BOOK_COLUMNS}, COUNT(rb.reader_id)
         FROM books b
         INNER JOIN authors a ON a.id = b.author_id
         INNER JOIN reader_books rb ON rb.book_id = b.id
         GROUP BY b.id
         HAVING COUNT(rb.reader_id) > ?1
         ORDER BY b.id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare popular book query")?;

    let counts = stmt
        .query_map([threshold], counted_book_from_row)
        .context("failed to load popular books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect popular books")?;

    Ok(counts)
}

/// The `limit` most-read books, highest reader count first. Equal counts are
/// broken by the lower id so the ranking is stable between runs.
pub fn most_read_books(conn: &Connection, limit: usize) -> Result<Vec<Counted<Book>>> {
    let limit = i64::try_from(limit).context("book limit out of range")?;
    let sql = format!(
        "SELECT {BOOK_COLUMNS}, COUNT(rb.reader_id) AS readers
         FROM books b
         INNER JOIN authors a ON a.id = b.author_id
         LEFT JOIN reader_books rb ON rb.book_id = b.id
         GROUP BY b.id
         ORDER BY readers DESC, b.id
         LIMIT ?1"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare top books query")?;

    let counts = stmt
        .query_map([limit], counted_book_from_row)
        .context("failed to rank books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect top books")?;

    Ok(counts)
}

/// Delete every book; reader links cascade.
pub fn delete_all_books(conn: &Connection) -> Result<usize> {
    let deleted = conn
        .execute("DELETE FROM books", [])
        .context("failed to delete books")?;
    debug!(deleted, "deleted books");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_books_to_reader, create_author, create_reader, open_in_memory};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn created_book_round_trips_through_the_store() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Telly Quail").unwrap();
        let book = create_book(&conn, "Dogs in Flat Park", ymd(1931, 2, 28), author.id).unwrap();

        assert_eq!(book.author_name, "Telly Quail");
        assert_eq!(fetch_books(&conn).unwrap(), vec![book]);
    }

    #[test]
    fn book_requires_an_existing_author() {
        let conn = open_in_memory().unwrap();
        assert!(create_book(&conn, "Orphan", ymd(2000, 1, 1), 99).is_err());
    }

    #[test]
    fn published_before_is_strict_on_the_year() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Zed Rooster").unwrap();
        create_book(&conn, "Early", ymd(1983, 12, 31), author.id).unwrap();
        create_book(&conn, "Boundary", ymd(1984, 1, 1), author.id).unwrap();
        create_book(&conn, "Late", ymd(2001, 7, 4), author.id).unwrap();

        let titles = |filter: BookFilter| -> Vec<String> {
            fetch_books_matching(&conn, &filter)
                .unwrap()
                .into_iter()
                .map(|b| b.title)
                .collect()
        };

        assert_eq!(titles(BookFilter::new().published_before(1984)), vec!["Early"]);
        assert_eq!(
            titles(BookFilter::new().published_from(1984)),
            vec!["Boundary", "Late"]
        );
        assert_eq!(
            titles(BookFilter::new().published_from(1984).published_before(2000)),
            vec!["Boundary"]
        );
        assert_eq!(titles(BookFilter::new().title_contains("at")), vec!["Late"]);
    }

    #[test]
    fn reader_counts_and_rankings() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Vera Ivanov").unwrap();
        let other = create_author(&conn, "Umberto Lavrov").unwrap();
        let a = create_book(&conn, "A", ymd(1900, 1, 1), author.id).unwrap();
        let b = create_book(&conn, "B", ymd(1900, 1, 2), author.id).unwrap();
        let c = create_book(&conn, "C", ymd(1900, 1, 3), other.id).unwrap();
        let d = create_book(&conn, "D", ymd(1900, 1, 4), other.id).unwrap();

        for name in ["R1", "R2", "R3"] {
            let reader = create_reader(&conn, name, "KY").unwrap();
            add_books_to_reader(&conn, reader.id, &[c.id, b.id]).unwrap();
        }
        let last = create_reader(&conn, "R4", "KY").unwrap();
        add_books_to_reader(&conn, last.id, &[c.id, a.id]).unwrap();

        let counts: Vec<(i64, u64)> = books_with_reader_counts(&conn)
            .unwrap()
            .into_iter()
            .map(|c| (c.item.id, c.count))
            .collect();
        assert_eq!(counts, vec![(a.id, 1), (b.id, 3), (c.id, 4), (d.id, 0)]);

        let top: Vec<i64> = most_read_books(&conn, 3)
            .unwrap()
            .into_iter()
            .map(|c| c.item.id)
            .collect();
        assert_eq!(top, vec![c.id, b.id, a.id]);

        let popular: Vec<i64> = books_read_by_more_than(&conn, 2)
            .unwrap()
            .into_iter()
            .map(|c| c.item.id)
            .collect();
        assert_eq!(popular, vec![b.id, c.id]);

        let for_last: Vec<String> = fetch_books_for_reader(&conn, last.id)
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(for_last, vec!["A", "C"]);
    }

    #[test]
    fn deleting_books_clears_reader_links() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Farrah Namath").unwrap();
        let book = create_book(&conn, "Story of Grey Haven", ymd(1977, 3, 3), author.id).unwrap();
        let reader = create_reader(&conn, "Sam", "KY").unwrap();
        add_books_to_reader(&conn, reader.id, &[book.id]).unwrap();

        assert_eq!(delete_all_books(&conn).unwrap(), 1);
        assert!(fetch_books_for_reader(&conn, reader.id).unwrap().is_empty());
        assert_eq!(count_books(&conn).unwrap(), 0);
    }
}
