use std::path::Path;

use anyhow::Context;
use chrono::{Local, TimeZone};
use serde::de::DeserializeOwned;

/// First and last year of the engagement report
pub const REPORT_YEARS: (i32, i32) = (2006, 2013);

/// Read and parse JSON document.
/// The file is closed before parsing starts
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// `YYYY-MM` of the unix timestamp in `tz`
pub fn month_key_in<Tz: TimeZone>(tz: &Tz, timestamp: i64) -> Option<String>
where Tz::Offset: std::fmt::Display {
    tz.timestamp_opt(timestamp, 0)
        .earliest()
        .map(|t| t.format("%Y-%m").to_string())
}

/// `YYYY-MM` of the unix timestamp in local time
pub fn month_key(timestamp: i64) -> Option<String> {
    month_key_in(&Local, timestamp)
}

/// Every month of the report, `2006-01` to `2013-12`
pub fn report_months() -> impl Iterator<Item = String> {
    let (first, last) = REPORT_YEARS;
    (first..=last).flat_map(|year| (1..=12).map(move |month| format!("{year}-{month:02}")))
}
