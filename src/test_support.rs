//! Builders shared by unit tests.

use crate::config::{FEATURE_COUNT, REQUIRED_COLUMNS};

/// CSV with the required header (optionally preceded by one extra column)
/// and the given rows.
pub fn csv_with_rows(extra_header: Option<&str>, rows: &[Vec<String>]) -> Vec<u8> {
    let mut headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    if let Some(h) = extra_header {
        headers.insert(0, h.to_string());
    }
    let mut out = headers.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

/// 23 distinct integer cells: `seed * 100 + column index`.
pub fn numeric_row(seed: usize) -> Vec<String> {
    (0..FEATURE_COUNT).map(|i| (seed * 100 + i).to_string()).collect()
}

/// A plausible record; `age` and `limit` land in AGE and LIMIT_BAL.
pub fn credit_row(limit: f64, age: f64) -> Vec<String> {
    let mut row = vec!["0".to_string(); FEATURE_COUNT];
    row[0] = limit.to_string();
    row[1] = "2".to_string();
    row[2] = "2".to_string();
    row[3] = "1".to_string();
    row[4] = age.to_string();
    row
}
