//! Hash command implementation.

use crate::source;
use habitline_core::row_hash;

pub fn run(rows: String, b64: bool, keep_text: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rows = source::read_rows(&rows, keep_text)?;
    for row in &rows {
        let hash = row_hash(row)?;
        if b64 {
            println!("{}", hash.to_b64());
        } else {
            println!("{}", hash);
        }
    }
    Ok(())
}
