use crate::error::{AppError, Result};
use crate::types::{format_value, AugmentedTable};

/// Serialize the augmented table as UTF-8 CSV: header row, then one line per
/// row in table order. The percentage column always carries two decimals.
pub fn export(table: &AugmentedTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(AugmentedTable::column_names())
        .map_err(|e| AppError::Export(e.to_string()))?;

    for row in &table.rows {
        let mut record: Vec<String> = row.features.iter().map(|v| format_value(*v)).collect();
        record.push(format!("{:.2}", row.probability_pct));
        record.push(row.label.as_text().to_string());
        writer
            .write_record(&record)
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))
}
