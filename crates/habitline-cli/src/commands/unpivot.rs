//! Unpivot command implementation.

use crate::output;
use crate::source;
use habitline_core::{HabitConfig, Unpivoter};

pub fn run(
    rows: String,
    config: String,
    json: bool,
    keep_text: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = HabitConfig::load(&config)
        .map_err(|e| format!("Failed to load config {}: {}", config, e))?;
    let unpivoter = Unpivoter::new(config);
    let rows = source::read_rows(&rows, keep_text)?;

    if !json {
        output::print_table_header();
    }

    let mut failed = 0usize;
    for (index, row) in rows.iter().enumerate() {
        let events = match unpivoter.unpivot(row) {
            Ok(events) => events,
            Err(e) => {
                eprintln!("row {}: {}", index, e);
                failed += 1;
                continue;
            }
        };
        for event in &events {
            if json {
                println!("{}", output::format_json(event));
            } else {
                println!("{}", output::format_event_row(event));
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, "rows with unparseable dates were skipped");
    }
    Ok(())
}
