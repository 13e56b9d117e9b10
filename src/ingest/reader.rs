use crate::error::{AppError, Result};
use crate::types::InputTable;

/// Parse an uploaded CSV body. A header row is mandatory and every record
/// must have the header's field count.
pub fn read_csv(bytes: &[u8]) -> Result<InputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::Parse("the file has no header row".to_string()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(InputTable { headers, records })
}
