//! Ingest command implementation.

use crate::output;
use crate::source;
use habitline_core::{HabitConfig, Unpivoter};
use habitline_store::{ingest, IngestOptions, SnapshotStore};

pub struct IngestArgs {
    pub rows: String,
    pub store: String,
    pub config: String,
    pub source: String,
    pub strict: bool,
    pub json: bool,
    pub keep_text: bool,
}

pub fn run(args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = HabitConfig::load(&args.config)
        .map_err(|e| format!("Failed to load config {}: {}", args.config, e))?;
    let unpivoter = Unpivoter::new(config);
    let rows = source::read_rows(&args.rows, args.keep_text)?;

    let mut store = SnapshotStore::open(&args.store)
        .map_err(|e| format!("Failed to open store {}: {}", args.store, e))?;
    let options = IngestOptions {
        source: args.source,
        strict: args.strict,
    };

    // Rows written before a strict-mode failure are kept in the snapshot.
    let result = ingest(&rows, &unpivoter, &mut store, &options);
    store.save()?;
    let report = result?;

    if args.json {
        println!("{}", output::format_json(&report));
    } else {
        output::print_report(&report);
    }
    Ok(())
}
