pub mod csv_append;

use std::time::SystemTime;

pub use csv_append::{CsvAccumulator, Record};

/// the current utc time, like `2026-10-16T12:00:00Z`
pub fn utc_timestamp() -> String {
    humantime::format_rfc3339_seconds(SystemTime::now()).to_string()
}
