//! Binary entry point: resolve configuration, open the database, seed it when
//! empty, print the report, and optionally wipe everything afterwards.
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::tty::IsTty;
use library_demo::{clean_all_data, db, seed_if_empty, Config, DatabaseLocation, Report};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "library-demo",
    version,
    about = "Seed a small library database and run some queries over it"
)]
struct Cli {
    /// SQLite file to use (defaults to ~/.library-demo/library.sqlite or LIBRARY_DB_PATH)
    #[arg(long, value_name = "PATH", conflicts_with = "in_memory")]
    database: Option<PathBuf>,

    /// Use a throwaway in-memory database
    #[arg(long)]
    in_memory: bool,

    /// Fixed RNG seed for reproducible sample data (or LIBRARY_SEED)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Substring to look for in author names
    #[arg(long, value_name = "TEXT")]
    needle: Option<String>,

    /// List books published before this year
    #[arg(long, value_name = "YEAR")]
    before: Option<i32>,

    /// Wipe existing data before seeding
    #[arg(long)]
    reseed: bool,

    /// Delete all data after printing the report
    #[arg(long)]
    clean: bool,

    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    /// Layer command-line flags over the environment-derived configuration.
    fn apply(self, mut config: Config) -> Config {
        if self.in_memory {
            config.database = DatabaseLocation::InMemory;
        } else if let Some(path) = self.database {
            config.database = DatabaseLocation::File(path);
        }
        if let Some(seed) = self.seed {
            config.rng_seed = Some(seed);
        }
        if let Some(needle) = self.needle {
            config.report.name_needle = needle;
        }
        if let Some(year) = self.before {
            config.report.published_before = year;
        }
        config
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "library_demo=debug"
    } else {
        "library_demo=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (reseed, clean) = (cli.reseed, cli.clean);
    let config = cli.apply(Config::from_env()?);
    info!("Start");

    let conn = db::open(&config.database)?;

    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if reseed {
        clean_all_data(&conn)?;
    }
    seed_if_empty(&conn, &config.seed, &mut rng)?;

    let stdout = io::stdout();
    let styled = stdout.is_tty();
    let mut report = Report::new(stdout.lock(), styled);
    report.run(&conn, &config.report)?;

    if clean {
        clean_all_data(&conn)?;
    }
    Ok(())
}
