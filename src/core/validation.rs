use crate::core::{Record, ValidationResult};

pub const REQUIRED_COLUMNS: [&str; 2] = ["review_text", "brand"];
pub const PRODUCT_COLUMNS: [&str; 2] = ["product_id", "product_name"];

pub const MISSING_COLUMNS_PREFIX: &str = "Missing required columns: ";
pub const MISSING_PRODUCT_MESSAGE: &str = "Must include either product_id OR product_name";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Also check every row after the first. Off by default: the upload is
    /// assumed to share the first row's schema.
    pub per_row_schema: bool,
}

/// Checks the required-column contract against the first record's columns.
///
/// Both checks always run, so a file can fail both at once. An empty upload
/// has no first record and fails both.
pub fn validate_records(records: &[Record]) -> ValidationResult {
    validate_with_options(records, ValidationOptions::default())
}

pub fn validate_with_options(records: &[Record], options: ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::passed();
    let first = records.first();

    let missing = missing_required(first);
    if !missing.is_empty() {
        result.push(format!("{}{}", MISSING_COLUMNS_PREFIX, missing.join(", ")));
    }
    if !has_product_column(first) {
        result.push(MISSING_PRODUCT_MESSAGE);
    }

    if options.per_row_schema {
        for (index, record) in records.iter().enumerate().skip(1) {
            let row = index + 1;
            let missing = missing_required(Some(record));
            if !missing.is_empty() {
                result.push(format!(
                    "Row {}: missing required columns: {}",
                    row,
                    missing.join(", ")
                ));
            }
            if !has_product_column(Some(record)) {
                result.push(format!(
                    "Row {}: must include either product_id OR product_name",
                    row
                ));
            }
        }
    }

    result
}

fn missing_required(record: Option<&Record>) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !record.is_some_and(|r| r.contains_column(column)))
        .collect()
}

fn has_product_column(record: Option<&Record>) -> bool {
    record.is_some_and(|r| PRODUCT_COLUMNS.iter().any(|c| r.contains_column(c)))
}
