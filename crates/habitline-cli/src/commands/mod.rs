pub mod hash;
pub mod ingest;
pub mod list;
pub mod parse_date;
pub mod unpivot;
