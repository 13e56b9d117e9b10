use crate::config::{FEATURE_COUNT, LABEL_COLUMN, PROBABILITY_COLUMN, REQUIRED_COLUMNS};

/// One record's model inputs, in `REQUIRED_COLUMNS` order.
pub type FeatureRow = [f64; FEATURE_COUNT];

// ---------------------------------------------------------------------------
// Uploaded table
// ---------------------------------------------------------------------------

/// Parsed upload: header names and raw cell text, in file order.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl InputTable {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// Prediction label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictedLabel {
    /// Model output 0.
    NoDefault,
    /// Model output 1.
    Default,
}

impl PredictedLabel {
    /// Display order used by every chart: negative first.
    pub const ALL: [PredictedLabel; 2] = [PredictedLabel::NoDefault, PredictedLabel::Default];

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(PredictedLabel::NoDefault),
            1 => Some(PredictedLabel::Default),
            _ => None,
        }
    }

    pub fn as_text(self) -> &'static str {
        match self {
            PredictedLabel::NoDefault => "No",
            PredictedLabel::Default => "Yes",
        }
    }
}

impl std::fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

// ---------------------------------------------------------------------------
// Augmented table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRow {
    pub features: FeatureRow,
    /// Raw model score in [0, 1]; never re-rounded.
    pub probability: f64,
    /// `probability * 100` rounded to 2 decimals.
    pub probability_pct: f64,
    pub label: PredictedLabel,
}

impl AugmentedRow {
    pub fn new(features: FeatureRow, probability: f64, label: PredictedLabel) -> Self {
        Self {
            features,
            probability,
            probability_pct: round2(probability * 100.0),
            label,
        }
    }

    pub fn feature(&self, index: usize) -> f64 {
        self.features[index]
    }
}

/// Projected required columns plus the two derived prediction columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AugmentedTable {
    pub rows: Vec<AugmentedRow>,
}

impl AugmentedTable {
    /// The 23 required columns followed by the probability and label columns.
    pub fn column_names() -> Vec<&'static str> {
        let mut names = REQUIRED_COLUMNS.to_vec();
        names.push(PROBABILITY_COLUMN);
        names.push(LABEL_COLUMN);
        names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count_label(&self, label: PredictedLabel) -> usize {
        self.rows.iter().filter(|r| r.label == label).count()
    }

    /// Values of one feature column for rows carrying `label`, in row order.
    pub fn feature_by_label(&self, index: usize, label: PredictedLabel) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.label == label)
            .map(|r| r.feature(index))
            .collect()
    }
}

/// Two-decimal rounding, ties to even.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Shortest decimal text that parses back to the same `f64`.
pub fn format_value(v: f64) -> String {
    format!("{v}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_rounded_to_two_decimals() {
        let row = AugmentedRow::new([0.0; FEATURE_COUNT], 0.123456, PredictedLabel::NoDefault);
        assert_eq!(row.probability_pct, 12.35);
        assert_eq!(row.probability, 0.123456);

        let row = AugmentedRow::new([0.0; FEATURE_COUNT], 0.81, PredictedLabel::Default);
        assert_eq!(row.probability_pct, 81.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round2(12.125), 12.12);
        assert_eq!(round2(12.375), 12.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(-0.625), -0.62);
    }

    #[test]
    fn label_text_and_raw_mapping() {
        assert_eq!(PredictedLabel::from_raw(1), Some(PredictedLabel::Default));
        assert_eq!(PredictedLabel::from_raw(0), Some(PredictedLabel::NoDefault));
        assert_eq!(PredictedLabel::from_raw(2), None);
        assert_eq!(PredictedLabel::Default.to_string(), "Yes");
        assert_eq!(PredictedLabel::NoDefault.to_string(), "No");
    }

    #[test]
    fn column_names_end_with_derived_columns() {
        let names = AugmentedTable::column_names();
        assert_eq!(names.len(), 25);
        assert_eq!(names[0], "LIMIT_BAL");
        assert_eq!(names[22], "PAY_AMT6");
        assert_eq!(names[23], PROBABILITY_COLUMN);
        assert_eq!(names[24], LABEL_COLUMN);
    }

    #[test]
    fn integral_values_format_without_fraction() {
        assert_eq!(format_value(20000.0), "20000");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(0.1), "0.1");
    }
}
