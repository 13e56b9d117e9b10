use crate::config::PREVIEW_ROWS;
use crate::types::{AugmentedRow, AugmentedTable, PredictedLabel};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub positive_count: usize,
    /// `positive_count / total * 100`; `None` when the table has no rows.
    pub percentage: Option<f64>,
}

impl Summary {
    /// Percentage with two decimals, e.g. "33.33".
    pub fn percentage_text(&self) -> Option<String> {
        self.percentage.map(|p| format!("{p:.2}"))
    }

    /// Short natural-language report shown above the preview.
    pub fn text(&self) -> String {
        match self.percentage_text() {
            None => "The uploaded file contains no records, so there is nothing to analyze."
                .to_string(),
            Some(pct) => format!(
                "According to the uploaded file, the model predicts that {} of {} customers \
                 will not pay their debts next month. This represents {}% of the analyzed base.",
                self.positive_count, self.total, pct
            ),
        }
    }
}

pub fn summarize(table: &AugmentedTable) -> Summary {
    let total = table.len();
    let positive_count = table.count_label(PredictedLabel::Default);
    let percentage = (total > 0).then(|| positive_count as f64 / total as f64 * 100.0);
    Summary {
        total,
        positive_count,
        percentage,
    }
}

/// First rows of the augmented table, in original order.
pub fn preview(table: &AugmentedTable) -> &[AugmentedRow] {
    &table.rows[..table.len().min(PREVIEW_ROWS)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FEATURE_COUNT;

    fn table(labels: &[PredictedLabel]) -> AugmentedTable {
        AugmentedTable {
            rows: labels
                .iter()
                .enumerate()
                .map(|(i, l)| {
                    let mut features = [0.0; FEATURE_COUNT];
                    features[0] = i as f64;
                    AugmentedRow::new(features, 0.5, *l)
                })
                .collect(),
        }
    }

    #[test]
    fn one_of_three_is_33_33_percent() {
        use crate::types::PredictedLabel::{Default as Yes, NoDefault as No};
        let s = summarize(&table(&[No, Yes, No]));
        assert_eq!(s.total, 3);
        assert_eq!(s.positive_count, 1);
        assert_eq!(s.percentage_text().as_deref(), Some("33.33"));
        assert!(s.text().contains("1 of 3 customers"));
        assert!(s.text().contains("33.33%"));
    }

    #[test]
    fn zero_rows_report_no_data() {
        let s = summarize(&AugmentedTable::default());
        assert_eq!(s.total, 0);
        assert_eq!(s.positive_count, 0);
        assert_eq!(s.percentage, None);
        assert!(s.text().contains("no records"));
    }

    #[test]
    fn preview_keeps_first_ten_rows_in_order() {
        let t = table(&[PredictedLabel::NoDefault; 14]);
        let rows = preview(&t);
        assert_eq!(rows.len(), PREVIEW_ROWS);
        let firsts: Vec<f64> = rows.iter().map(|r| r.features[0]).collect();
        assert_eq!(firsts, (0..10).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn preview_of_short_table_is_whole_table() {
        let t = table(&[PredictedLabel::Default; 3]);
        assert_eq!(preview(&t).len(), 3);
    }
}
