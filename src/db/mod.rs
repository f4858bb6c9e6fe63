//! Persistence module split across logical submodules. Every function takes a
//! borrowed `rusqlite::Connection` and encapsulates one query, so the report
//! and seeder stay free of SQL.

mod authors;
mod books;
mod connection;
mod query;
mod readers;

pub use authors::{
    author_counts_for_reader, authors_with_book_counts, authors_with_more_books_than,
    authors_with_read_counts, count_authors, create_author, delete_all_authors, fetch_author,
    fetch_authors, fetch_authors_matching,
};
pub use books::{
    books_read_by_more_than, books_with_reader_counts, count_books, create_book,
    delete_all_books, fetch_books, fetch_books_for_reader, fetch_books_matching, most_read_books,
};
pub use connection::{ensure_schema, open, open_in_memory};
pub use query::{BookFilter, NameFilter};
pub use readers::{
    add_books_to_reader, count_readers, create_reader, delete_all_readers, fetch_readers,
    fetch_readers_matching, readers_with_book_counts, MAX_STATE_LEN,
};

/// SQLite hands back `COUNT(*)` as a signed integer; it is never negative.
fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
