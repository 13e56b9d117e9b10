use tracing::debug;

use crate::config::{FEATURE_COUNT, REQUIRED_COLUMNS};
use crate::error::{AppError, Result};
use crate::ingest::ValidatedTable;
use crate::model::Classifier;
use crate::types::{AugmentedRow, AugmentedTable, FeatureRow, PredictedLabel};

/// Project onto the required columns, score the whole batch once, and attach
/// the label and probability columns. Columns outside `REQUIRED_COLUMNS` are
/// not carried into the result.
pub fn infer(validated: &ValidatedTable, classifier: &dyn Classifier) -> Result<AugmentedTable> {
    let batch = project(validated)?;

    let labels = classifier.predict(&batch)?;
    let probabilities = classifier.predict_probability(&batch)?;

    if labels.len() != batch.len() || probabilities.len() != batch.len() {
        return Err(AppError::Inference(format!(
            "model returned {} labels and {} probabilities for {} rows",
            labels.len(),
            probabilities.len(),
            batch.len()
        )));
    }

    let rows = batch
        .into_iter()
        .zip(labels.into_iter().zip(probabilities))
        .enumerate()
        .map(|(i, (features, (raw_label, probability)))| -> Result<AugmentedRow> {
            let label = PredictedLabel::from_raw(raw_label).ok_or_else(|| {
                AppError::Inference(format!("row {}: label {raw_label} is not 0 or 1", i + 1))
            })?;
            if !(0.0..=1.0).contains(&probability) {
                return Err(AppError::Inference(format!(
                    "row {}: probability {probability} outside [0, 1]",
                    i + 1
                )));
            }
            Ok(AugmentedRow::new(features, probability, label))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = rows.len(), model = classifier.name(), "Batch scored");
    Ok(AugmentedTable { rows })
}

/// Required columns in canonical order, converted to numbers.
fn project(validated: &ValidatedTable) -> Result<Vec<FeatureRow>> {
    validated
        .table
        .records
        .iter()
        .enumerate()
        .map(|(row_idx, record)| -> Result<FeatureRow> {
            let mut features = [0.0; FEATURE_COUNT];
            for (slot, &col) in validated.positions.iter().enumerate() {
                let cell = record.get(col).map(|s| s.trim()).unwrap_or_default();
                features[slot] = parse_cell(cell).ok_or_else(|| {
                    AppError::Inference(format!(
                        "row {}, column {}: {:?} is not a number",
                        row_idx + 1,
                        REQUIRED_COLUMNS[slot],
                        cell
                    ))
                })?;
            }
            Ok(features)
        })
        .collect()
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok()
}
