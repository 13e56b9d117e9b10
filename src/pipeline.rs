use tracing::info;

use crate::error::Result;
use crate::export::export;
use crate::inference::infer;
use crate::ingest::{read_csv, validate};
use crate::model::Classifier;
use crate::report::{preview, render_charts, summarize, Chart, Summary};
use crate::types::{AugmentedRow, AugmentedTable};

/// Everything produced for one accepted upload.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: Summary,
    pub table: AugmentedTable,
    pub charts: Vec<Chart>,
    /// CSV body served by the download endpoint.
    pub export: Vec<u8>,
}

impl Report {
    pub fn preview(&self) -> &[AugmentedRow] {
        preview(&self.table)
    }
}

/// Validate, score, summarize, chart and export one uploaded file.
/// Any error aborts the whole run; nothing partial is returned.
pub fn process_upload(raw: &[u8], classifier: &dyn Classifier) -> Result<Report> {
    let input = read_csv(raw)?;
    let input_rows = input.row_count();
    let input_columns = input.headers.len();

    let validated = validate(input)?;
    let table = infer(&validated, classifier)?;
    let summary = summarize(&table);
    let charts = render_charts(&table);
    let export_bytes = export(&table)?;

    info!(
        rows = input_rows,
        input_columns,
        positives = summary.positive_count,
        model = classifier.name(),
        "Upload scored"
    );

    Ok(Report {
        summary,
        table,
        charts,
        export: export_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FEATURE_COUNT;
    use crate::error::AppError;
    use crate::model::classifier::fixed::FixedClassifier;
    use crate::report::charts::ChartData;
    use crate::test_support::{credit_row, csv_with_rows, numeric_row};

    #[test]
    fn three_row_upload_end_to_end() {
        let csv = csv_with_rows(
            Some("ID"),
            &[
                [vec!["1".to_string()], credit_row(20_000.0, 24.0)].concat(),
                [vec!["2".to_string()], credit_row(120_000.0, 26.0)].concat(),
                [vec!["3".to_string()], credit_row(90_000.0, 34.0)].concat(),
            ],
        );
        let model = FixedClassifier::new(vec![0, 1, 0], vec![0.12, 0.81, 0.40]);

        let report = process_upload(&csv, &model).unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.positive_count, 1);
        assert_eq!(report.summary.percentage_text().as_deref(), Some("33.33"));
        assert_eq!(report.preview().len(), 3);
        assert_eq!(report.charts.len(), 4);

        let text = String::from_utf8(report.export.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(!lines[0].contains("ID"), "extra columns are not exported");
        assert_eq!(lines[0].split(',').count(), FEATURE_COUNT + 2);
        assert!(lines[1].ends_with(",12.00,No"));
        assert!(lines[2].ends_with(",81.00,Yes"));
        assert!(lines[3].ends_with(",40.00,No"));
    }

    #[test]
    fn missing_pay_6_is_rejected_before_inference() {
        let csv = b"LIMIT_BAL,SEX,EDUCATION,MARRIAGE,AGE,PAY_0,PAY_2,PAY_3,PAY_4,PAY_5,\
BILL_AMT1,BILL_AMT2,BILL_AMT3,BILL_AMT4,BILL_AMT5,BILL_AMT6,\
PAY_AMT1,PAY_AMT2,PAY_AMT3,PAY_AMT4,PAY_AMT5,PAY_AMT6\n\
20000,2,2,1,24,2,2,-1,-1,-2,3913,3102,689,0,0,0,0,689,0,0,0,0\n";
        let model = FixedClassifier::new(vec![1], vec![0.9]);

        match process_upload(csv, &model) {
            Err(AppError::Schema { missing }) => assert_eq!(missing, vec!["PAY_6".to_string()]),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn header_only_upload_reports_no_data() {
        let csv = csv_with_rows(None, &[]);
        let model = FixedClassifier::new(vec![], vec![]);

        let report = process_upload(&csv, &model).unwrap();

        assert_eq!(report.summary.total, 0);
        assert!(report.summary.percentage.is_none());
        assert!(report.charts.iter().all(|c| c.data == ChartData::Empty));
        assert_eq!(String::from_utf8(report.export).unwrap().lines().count(), 1);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let model = FixedClassifier::new(vec![], vec![]);
        let err = process_upload(b"", &model).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn row_count_is_preserved() {
        let rows: Vec<Vec<String>> = (0..37).map(numeric_row).collect();
        let csv = csv_with_rows(None, &rows);
        let labels: Vec<u8> = (0..37).map(|i| u8::from(i % 4 == 0)).collect();
        let probs: Vec<f64> = (0..37).map(|i| f64::from(i) / 40.0).collect();
        let model = FixedClassifier::new(labels, probs);

        let report = process_upload(&csv, &model).unwrap();
        assert_eq!(report.table.len(), 37);
        assert_eq!(report.summary.positive_count, 10);
        assert_eq!(report.preview().len(), 10);
    }
}
