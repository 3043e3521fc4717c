//! Parse-date command implementation.

use habitline_core::config::parse_timezone;
use habitline_core::DateNormalizer;

pub fn run(value: String, tz: String) -> Result<(), Box<dyn std::error::Error>> {
    let tz = parse_timezone(&tz)?;
    let instant = DateNormalizer::new().normalize_str(&value, tz)?;
    println!("{}", instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    Ok(())
}
