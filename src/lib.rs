//! Core library surface for the library demo: a small SQLite-backed catalog of
//! authors, books, and readers, a seeder that fills it with random sample data,
//! and a report that runs a fixed set of queries over it.
//!
//! The `bin` target wires these together; tests and other tooling can reuse
//! the same pieces against an in-memory database.
pub mod config;
pub mod db;
pub mod extrema;
pub mod models;
pub mod report;
pub mod seed;

/// Configuration handed to the persistence layer at startup.
pub use config::{Config, ConfigError, DatabaseLocation, ReportConfig, SeedConfig};

/// The tie-aware extremum scan used by every "most"/"least" question.
pub use extrema::{find_extrema, EmptyInputError, Extrema};

/// The domain types that other layers manipulate.
pub use models::{Author, Book, Counted, Reader};

pub use report::Report;
pub use seed::{clean_all_data, create_data, seed_if_empty, SeedSummary};
