use crate::config::{FEATURE_COUNT, REQUIRED_COLUMNS};
use crate::error::{AppError, Result};
use crate::types::InputTable;

/// An upload known to carry every required column.
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    pub table: InputTable,
    /// `positions[i]` is the input column holding `REQUIRED_COLUMNS[i]`.
    pub positions: [usize; FEATURE_COUNT],
}

/// Check the header for every required column (exact, case-sensitive).
/// Extra columns are allowed. With duplicate names the first one wins.
pub fn validate(table: InputTable) -> Result<ValidatedTable> {
    let mut positions = [0usize; FEATURE_COUNT];
    let mut missing = Vec::new();

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match table.column_index(name) {
            Some(idx) => positions[slot] = idx,
            None => missing.push((*name).to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(AppError::Schema { missing });
    }
    Ok(ValidatedTable { table, positions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(headers: &[&str]) -> InputTable {
        InputTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            records: Vec::new(),
        }
    }

    #[test]
    fn accepts_required_columns_in_any_order() {
        let mut headers: Vec<&str> = REQUIRED_COLUMNS.iter().rev().copied().collect();
        headers.insert(3, "ID");
        let validated = validate(table_with(&headers)).unwrap();

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            assert_eq!(validated.table.headers[validated.positions[slot]], *name);
        }
    }

    #[test]
    fn every_single_missing_column_is_rejected() {
        for skip in REQUIRED_COLUMNS {
            let headers: Vec<&str> = REQUIRED_COLUMNS.iter().copied().filter(|c| *c != skip).collect();
            match validate(table_with(&headers)) {
                Err(AppError::Schema { missing }) => assert_eq!(missing, vec![skip.to_string()]),
                other => panic!("expected schema error without {skip}, got {other:?}"),
            }
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let headers: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|c| if *c == "AGE" { "age".to_string() } else { c.to_string() })
            .collect();
        let table = InputTable {
            headers,
            records: Vec::new(),
        };
        match validate(table) {
            Err(AppError::Schema { missing }) => assert_eq!(missing, vec!["AGE".to_string()]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_header_uses_first_occurrence() {
        let mut headers = REQUIRED_COLUMNS.to_vec();
        headers.push("AGE");
        let validated = validate(table_with(&headers)).unwrap();
        assert_eq!(validated.positions[4], 4);
    }

    #[test]
    fn lists_all_missing_columns_in_canonical_order() {
        match validate(table_with(&["ID", "AGE"])) {
            Err(AppError::Schema { missing }) => {
                assert_eq!(missing.len(), FEATURE_COUNT - 1);
                assert_eq!(missing[0], "LIMIT_BAL");
                assert!(!missing.contains(&"AGE".to_string()));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
