//! Runtime configuration. Everything the program needs before touching the
//! database is collected into [`Config`] and handed to [`crate::db::open`]
//! explicitly; nothing is read from ambient global state after startup.

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-demo";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";

/// Environment variable overriding the database file location.
pub const DB_PATH_VAR: &str = "LIBRARY_DB_PATH";
/// Environment variable fixing the RNG seed used to generate sample data.
pub const SEED_VAR: &str = "LIBRARY_SEED";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not locate home directory; set LIBRARY_DB_PATH")]
    NoHomeDirectory,
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Throwaway database that disappears when the connection drops.
    InMemory,
}

/// How much sample data to generate when the store is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub authors: usize,
    pub books: usize,
    pub readers: usize,
    /// Inclusive lower bound on books linked to each reader.
    pub min_reads: usize,
    /// Exclusive upper bound on books linked to each reader.
    pub max_reads: usize,
    /// Region code given to every generated reader.
    pub state: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            authors: 10,
            books: 50,
            readers: 50,
            min_reads: 3,
            max_reads: 8,
            state: "KY".to_string(),
        }
    }
}

/// Parameters of the filtering queries in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Substring that author names must contain (case-sensitive).
    pub name_needle: String,
    /// Books published strictly before this year are listed.
    pub published_before: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            name_needle: "S".to_string(),
            published_before: 1984,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseLocation,
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    pub seed: SeedConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Build the configuration from process environment variables, falling
    /// back to `~/.library-demo/library.sqlite`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup(DB_PATH_VAR).filter(|value| !value.trim().is_empty()) {
            Some(path) if path == ":memory:" => DatabaseLocation::InMemory,
            Some(path) => DatabaseLocation::File(PathBuf::from(path)),
            None => DatabaseLocation::File(default_db_path()?),
        };

        let rng_seed = match lookup(SEED_VAR) {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidNumber {
                    var: SEED_VAR,
                    value,
                }
            })?),
            None => None,
        };

        Ok(Self {
            database,
            rng_seed,
            seed: SeedConfig::default(),
            report: ReportConfig::default(),
        })
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_path_and_seed_are_used() {
        let config =
            Config::from_lookup(lookup_from(&[(DB_PATH_VAR, "/tmp/lib.db"), (SEED_VAR, "7")]))
                .unwrap();

        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/tmp/lib.db"))
        );
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.seed, SeedConfig::default());
    }

    #[test]
    fn memory_marker_selects_in_memory_database() {
        let config = Config::from_lookup(lookup_from(&[(DB_PATH_VAR, ":memory:")])).unwrap();
        assert_eq!(config.database, DatabaseLocation::InMemory);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn malformed_seed_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(DB_PATH_VAR, ":memory:"), (SEED_VAR, "abc")]))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: SEED_VAR,
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn defaults_match_the_classic_demo() {
        let seed = SeedConfig::default();
        assert_eq!((seed.authors, seed.books, seed.readers), (10, 50, 50));
        assert_eq!((seed.min_reads, seed.max_reads), (3, 8));
        assert_eq!(seed.state, "KY");

        let report = ReportConfig::default();
        assert_eq!(report.name_needle, "S");
        assert_eq!(report.published_before, 1984);
    }
}
