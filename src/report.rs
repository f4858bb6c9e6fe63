//! The fixed sequence of demonstration queries, printed section by section.
//! Output goes to any `io::Write` so tests can capture it in a buffer.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use rusqlite::Connection;
use tracing::debug;

use crate::config::ReportConfig;
use crate::db::{self, BookFilter, NameFilter};
use crate::extrema::{find_extrema, Extrema};
use crate::models::{Counted, Reader};

/// How many books the popularity ranking lists.
const TOP_BOOKS: usize = 3;

/// Find the tie groups of a counted collection, or `None` when it is empty.
pub fn tie_groups<T: Clone>(counted: Vec<Counted<T>>) -> Result<Option<Extrema<T>>> {
    if counted.is_empty() {
        return Ok(None);
    }
    let extrema = find_extrema(counted.into_iter().map(Counted::into_pair))?;
    Ok(Some(extrema))
}

pub struct Report<W: Write> {
    out: W,
    /// Color headings with ANSI escapes.
    styled: bool,
}

impl<W: Write> Report<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run every section against `conn` in order.
    pub fn run(&mut self, conn: &Connection, config: &ReportConfig) -> Result<()> {
        self.totals(conn)?;
        self.authors_named(conn, &config.name_needle)?;
        self.books_before(conn, config.published_before)?;
        self.prolific_authors(conn)?;
        self.author_book_extrema(conn)?;

        let first_reader = db::fetch_readers(conn)?.into_iter().next();
        self.books_read_by(conn, first_reader.as_ref())?;
        self.reader_extrema(conn)?;
        self.most_read_authors(conn)?;
        self.top_books(conn)?;
        self.widely_read_books(conn)?;
        self.favorite_authors(conn, first_reader.as_ref())?;

        self.out.flush().context("failed to flush report output")
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        let title = format!("*** {title}");
        let written = if self.styled {
            writeln!(self.out, "{}", title.bold().cyan())
        } else {
            writeln!(self.out, "{title}")
        };
        written.context("failed to write report heading")
    }

    fn line(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}").context("failed to write report line")
    }

    fn lines<T: Display>(&mut self, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return self.line("(none)");
        }
        for item in items {
            self.line(item)?;
        }
        Ok(())
    }

    fn totals(&mut self, conn: &Connection) -> Result<()> {
        self.heading("Library")?;
        let authors = db::count_authors(conn)?;
        let books = db::count_books(conn)?;
        let readers = db::count_readers(conn)?;
        self.line(format!(
            "{authors} authors, {books} books, {readers} readers"
        ))
    }

    fn authors_named(&mut self, conn: &Connection, needle: &str) -> Result<()> {
        self.heading(&format!("Authors with {needle:?} in their name"))?;
        let authors = db::fetch_authors_matching(conn, &NameFilter::contains(needle))?;
        self.lines(&authors)
    }

    fn books_before(&mut self, conn: &Connection, year: i32) -> Result<()> {
        self.heading(&format!("Books published before {year}"))?;
        let books = db::fetch_books_matching(conn, &BookFilter::new().published_before(year))?;
        let rows: Vec<String> = books
            .iter()
            .map(|book| format!("{} {}", book.title, book.pub_date.format("%Y")))
            .collect();
        self.lines(&rows)
    }

    fn prolific_authors(&mut self, conn: &Connection) -> Result<()> {
        self.heading("Authors who have written multiple books")?;
        let authors = db::authors_with_more_books_than(conn, 1)?;
        self.lines(&authors)
    }

    fn author_book_extrema(&mut self, conn: &Connection) -> Result<()> {
        let groups = tie_groups(db::authors_with_book_counts(conn)?)?;
        self.extrema_sections(
            groups,
            "Author(s) who wrote the most books",
            Some("Author(s) who wrote the least books"),
        )
    }

    fn books_read_by(&mut self, conn: &Connection, reader: Option<&Reader>) -> Result<()> {
        match reader {
            Some(reader) => {
                self.heading(&format!("Books read by {reader}"))?;
                let books = db::fetch_books_for_reader(conn, reader.id)?;
                self.lines(&books)
            }
            None => {
                self.heading("Books read by the first reader")?;
                self.line("(none)")
            }
        }
    }

    fn reader_extrema(&mut self, conn: &Connection) -> Result<()> {
        let groups = tie_groups(db::readers_with_book_counts(conn)?)?;
        self.extrema_sections(
            groups,
            "Reader(s) who read the most books",
            Some("Reader(s) who read the least books"),
        )
    }

    fn most_read_authors(&mut self, conn: &Connection) -> Result<()> {
        let groups = tie_groups(db::authors_with_read_counts(conn)?)?;
        self.extrema_sections(groups, "Author(s) whose books have been read the most", None)
    }

    fn top_books(&mut self, conn: &Connection) -> Result<()> {
        self.heading(&format!("Top {TOP_BOOKS} most popular books"))?;
        let books = db::most_read_books(conn, TOP_BOOKS)?;
        self.lines(&books)
    }

    fn widely_read_books(&mut self, conn: &Connection) -> Result<()> {
        self.heading("Books with more than two readers")?;
        let books = db::books_read_by_more_than(conn, 2)?;
        self.lines(&books)
    }

    fn favorite_authors(&mut self, conn: &Connection, reader: Option<&Reader>) -> Result<()> {
        let Some(reader) = reader else {
            self.heading("Favorite author(s) of the first reader")?;
            return self.line("(none)");
        };

        let groups = tie_groups(db::author_counts_for_reader(conn, reader.id)?)?;
        self.extrema_sections(groups, &format!("Favorite author(s) of {reader}"), None)
    }

    /// Print the max group under `most`, and the min group under `least` when
    /// given. An empty collection prints `(none)` under each heading.
    fn extrema_sections<T: Display>(
        &mut self,
        groups: Option<Extrema<T>>,
        most: &str,
        least: Option<&str>,
    ) -> Result<()> {
        let Some(extrema) = groups else {
            debug!(most, "no rows for extremum section");
            self.heading(most)?;
            self.line("(none)")?;
            if let Some(least) = least {
                self.heading(least)?;
                self.line("(none)")?;
            }
            return Ok(());
        };

        self.heading(&format!("{most} ({})", extrema.max_count))?;
        self.lines(&extrema.max_group)?;
        if let Some(least) = least {
            self.heading(&format!("{least} ({})", extrema.min_count))?;
            self.lines(&extrema.min_group)?;
        }
        Ok(())
    }
}
