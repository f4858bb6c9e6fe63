//! Domain models that mirror the SQLite schema. These types stay light-weight
//! data holders so the persistence layer can hydrate them and the report can
//! print them without either side knowing much about the other.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A person who writes books. Authors own their books: deleting an author
/// cascades to every book that references it.
pub struct Author {
    /// Primary key from the database.
    pub id: i64,
    /// Display name, e.g. `Vera Petrov`.
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single title written by exactly one author. The author's name is hydrated
/// through a join so the book can render itself without another lookup.
pub struct Book {
    /// Primary key from the database.
    pub id: i64,
    pub title: String,
    /// Calendar publication date, stored as ISO `YYYY-MM-DD` text.
    pub pub_date: NaiveDate,
    /// Foreign key into `authors`.
    pub author_id: i64,
    /// Name of the owning author at the time the row was read.
    pub author_name: String,
}

impl fmt::Display for Book {
    /// Render as `Title by Author in 1971-04-12`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} in {}",
            self.title,
            self.author_name,
            self.pub_date.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Someone who reads books. The many-to-many link to books lives in the
/// `reader_books` join table rather than on this struct.
pub struct Reader {
    pub id: i64,
    pub name: String,
    /// Short region code (at most three characters), e.g. `KY`.
    pub state: String,
}

impl fmt::Display for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An entity paired with the result of a count aggregation, such as an author
/// with the number of books they wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counted<T> {
    pub item: T,
    pub count: u64,
}

impl<T> Counted<T> {
    pub fn new(item: T, count: u64) -> Self {
        Self { item, count }
    }

    /// Split into the `(item, count)` pair the extremum finder consumes.
    pub fn into_pair(self) -> (T, u64) {
        (self.item, self.count)
    }
}

impl<T: fmt::Display> fmt::Display for Counted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.item, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_display_includes_author_and_iso_date() {
        let book = Book {
            id: 1,
            title: "Night on Wet River".to_string(),
            pub_date: NaiveDate::from_ymd_opt(1971, 4, 2).unwrap(),
            author_id: 7,
            author_name: "Sam Quail".to_string(),
        };

        assert_eq!(
            book.to_string(),
            "Night on Wet River by Sam Quail in 1971-04-02"
        );
    }

    #[test]
    fn counted_display_appends_count() {
        let author = Author {
            id: 3,
            name: "Gina Jones".to_string(),
        };

        assert_eq!(Counted::new(author, 4).to_string(), "Gina Jones (4)");
    }
}
