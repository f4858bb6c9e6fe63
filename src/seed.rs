//! Random sample data for an empty library: authors with made-up names, books
//! with made-up titles and dates, and readers who each picked a handful of
//! books. The RNG is injected so runs can be reproduced with a fixed seed.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use tracing::info;

use crate::config::SeedConfig;
use crate::db;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "David", "Evelyn", "Farrah", "Gina", "Rooster", "Sam", "Telly",
    "Umberto", "Vera", "William", "Xavier", "Zed",
];
const LAST_NAMES: &[&str] = &[
    "Harmon",
    "Ivanov",
    "Jones",
    "Kirkland",
    "Lavrov",
    "Marples",
    "Namath",
    "Oppenheimer",
    "Petrov",
    "Quail",
    "Rooster",
    "Snake",
];

const NOUNS: &[&str] = &["Anne", "Night", "Dogs", "Sister", "Brother", "House", "Story"];
const PREPOSITIONS: &[&str] = &["on", "of", "in"];
const ADJECTIVES: &[&str] = &[
    "Green", "Blue", "Bald", "Dark", "High", "Wet", "Muddy", "Grey", "Flat",
];
const LOCATIONS: &[&str] = &[
    "Gables", "Mountain", "Hill", "River", "Park", "Walk", "Haven", "Statue", "Stadium", "Valley",
];

/// First publication year generated (inclusive).
const FIRST_YEAR: i32 = 1900;
/// Last publication year generated (exclusive).
const END_YEAR: i32 = 2024;

/// How many rows a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub authors: usize,
    pub books: usize,
    pub readers: usize,
    /// Reader/book associations.
    pub links: usize,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words[rng.gen_range(0..words.len())]
}

/// `First Last`, e.g. `Vera Oppenheimer`.
pub fn make_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// `Noun preposition Adjective Location`, e.g. `House on Muddy River`.
pub fn make_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {} {} {}",
        pick(rng, NOUNS),
        pick(rng, PREPOSITIONS),
        pick(rng, ADJECTIVES),
        pick(rng, LOCATIONS)
    )
}

/// A date between 1900 and 2023. Days stop at 28 so every month is valid.
pub fn make_pub_date<R: Rng + ?Sized>(rng: &mut R) -> Result<NaiveDate> {
    let year = rng.gen_range(FIRST_YEAR..END_YEAR);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid generated date {year}-{month}-{day}"))
}

/// Populate the store according to `config` inside a single transaction.
pub fn create_data<R: Rng + ?Sized>(
    conn: &Connection,
    config: &SeedConfig,
    rng: &mut R,
) -> Result<SeedSummary> {
    if config.authors == 0 && config.books > 0 {
        bail!("cannot create books without any authors");
    }

    let tx = conn
        .unchecked_transaction()
        .context("failed to start seeding transaction")?;

    let mut authors = Vec::with_capacity(config.authors);
    for _ in 0..config.authors {
        authors.push(db::create_author(&tx, &make_name(rng))?);
    }

    let mut book_ids = Vec::with_capacity(config.books);
    for _ in 0..config.books {
        let author = &authors[rng.gen_range(0..authors.len())];
        let book = db::create_book(&tx, &make_title(rng), make_pub_date(rng)?, author.id)?;
        book_ids.push(book.id);
    }

    // An empty or inverted range still yields `min_reads` books per reader.
    let read_range = config.min_reads..config.max_reads.max(config.min_reads + 1);
    let mut links = 0;
    for _ in 0..config.readers {
        let reader = db::create_reader(&tx, &make_name(rng), &config.state)?;
        let amount = rng.gen_range(read_range.clone()).min(book_ids.len());
        let picked: Vec<i64> = book_ids.choose_multiple(rng, amount).copied().collect();
        db::add_books_to_reader(&tx, reader.id, &picked)?;
        links += picked.len();
    }

    tx.commit().context("failed to commit seeded data")?;

    let summary = SeedSummary {
        authors: authors.len(),
        books: book_ids.len(),
        readers: config.readers,
        links,
    };
    info!(?summary, "seeded library");
    Ok(summary)
}

/// Seed only when there are no books yet. Returns `None` when existing data
/// was left untouched.
pub fn seed_if_empty<R: Rng + ?Sized>(
    conn: &Connection,
    config: &SeedConfig,
    rng: &mut R,
) -> Result<Option<SeedSummary>> {
    if db::count_books(conn)? > 0 {
        info!("Not making new data");
        return Ok(None);
    }
    create_data(conn, config, rng).map(Some)
}

/// Remove every reader, book, and author.
pub fn clean_all_data(conn: &Connection) -> Result<()> {
    info!("Cleaning up...");
    db::delete_all_readers(conn)?;
    db::delete_all_books(conn)?;
    db::delete_all_authors(conn)?;
    info!("Done");
    Ok(())
}
