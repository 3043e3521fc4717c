//! Habitline CLI - normalize habit spreadsheet rows and ingest them into a store.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod source;

use commands::{hash, ingest, list, parse_date, unpivot};

const DEFAULT_CONFIG_PATH: &str = "etl/config/habits.yml";

#[derive(Parser)]
#[command(name = "habitline")]
#[command(about = "Habit spreadsheet normalization and ingestion CLI")]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one date cell to a UTC instant
    ParseDate {
        /// Cell text (date, datetime, ISO 8601 or spreadsheet serial)
        value: String,
        /// IANA time zone for values without an offset
        #[arg(long, default_value = "America/Chicago")]
        tz: String,
    },
    /// Print the content hash of every row
    Hash {
        /// Rows file (.json array of objects or .csv with headers)
        rows: String,
        /// Print base64url instead of hex
        #[arg(long)]
        b64: bool,
        /// Keep numeric-looking CSV cells as text
        #[arg(long)]
        keep_text: bool,
    },
    /// Print the events of every row
    Unpivot {
        /// Rows file (.json array of objects or .csv with headers)
        rows: String,
        /// Habit configuration file
        #[arg(long, env = "HABITS_CFG", default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
        /// Keep numeric-looking CSV cells as text
        #[arg(long)]
        keep_text: bool,
    },
    /// Ingest rows into a snapshot store
    Ingest {
        /// Rows file (.json array of objects or .csv with headers)
        rows: String,
        /// Snapshot store file (created if missing)
        #[arg(long)]
        store: String,
        /// Habit configuration file
        #[arg(long, env = "HABITS_CFG", default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        /// Source label stored with every event
        #[arg(long, default_value = habitline_store::DEFAULT_SOURCE)]
        source: String,
        /// Abort on the first unparseable date
        #[arg(long)]
        strict: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
        /// Keep numeric-looking CSV cells as text
        #[arg(long)]
        keep_text: bool,
    },
    /// List events in a snapshot store
    List {
        /// Snapshot store file
        #[arg(long)]
        store: String,
        /// Only events of this reporter
        #[arg(long)]
        user: Option<String>,
        /// Only events of this habit id
        #[arg(long)]
        habit: Option<String>,
        /// Only events at or after this RFC 3339 instant
        #[arg(long)]
        after: Option<String>,
        /// Only events at or before this RFC 3339 instant
        #[arg(long)]
        before: Option<String>,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::ParseDate { value, tz } => parse_date::run(value, tz),
        Commands::Hash {
            rows,
            b64,
            keep_text,
        } => hash::run(rows, b64, keep_text),
        Commands::Unpivot {
            rows,
            config,
            json,
            keep_text,
        } => unpivot::run(rows, config, json, keep_text),
        Commands::Ingest {
            rows,
            store,
            config,
            source,
            strict,
            json,
            keep_text,
        } => ingest::run(ingest::IngestArgs {
            rows,
            store,
            config,
            source,
            strict,
            json,
            keep_text,
        }),
        Commands::List {
            store,
            user,
            habit,
            after,
            before,
            json,
        } => list::run(list::ListArgs {
            store,
            user,
            habit,
            after,
            before,
            json,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
