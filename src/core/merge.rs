use crate::core::warranty::format_date;
use crate::domain::model::{Record, StorageSummary, WarrantyInfo};
use std::collections::HashSet;

pub const SHIP_DATE_COLUMN: &str = "Ship Date";
pub const WARRANTY_EXPIRATION_COLUMN: &str = "Warranty Expiration";
pub const STORAGE_COLUMN: &str = "Storage";

/// Columns the enrichment may add, in append order.
pub const ENRICHMENT_COLUMNS: [&str; 3] =
    [SHIP_DATE_COLUMN, WARRANTY_EXPIRATION_COLUMN, STORAGE_COLUMN];

/// Column identity: lowercase with all whitespace removed.
pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Header names deduplicated by normalized identity, first spelling wins.
pub fn canonical_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| seen.insert(normalize_column_name(name)))
        .map(str::to_string)
        .collect()
}

/// The enrichment columns not already present among `original_columns`.
pub fn appended_columns(original_columns: &[String]) -> Vec<&'static str> {
    let existing: HashSet<String> = original_columns
        .iter()
        .map(|c| normalize_column_name(c))
        .collect();

    ENRICHMENT_COLUMNS
        .into_iter()
        .filter(|c| !existing.contains(&normalize_column_name(c)))
        .collect()
}

/// Full output header: canonical input columns followed by the new ones.
pub fn output_columns(original_columns: &[String]) -> Vec<String> {
    original_columns
        .iter()
        .cloned()
        .chain(appended_columns(original_columns).into_iter().map(str::to_string))
        .collect()
}

/// Value of the first column whose normalized name matches `column`.
pub fn find_value<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    let wanted = normalize_column_name(column);
    record
        .data
        .iter()
        .find(|(name, _)| normalize_column_name(name) == wanted)
        .map(|(_, value)| value.as_str())
}

pub fn merge(
    record: &Record,
    original_columns: &[String],
    warranty: &WarrantyInfo,
    storage: &StorageSummary,
) -> Record {
    let mut data: Vec<(String, String)> = original_columns
        .iter()
        .map(|column| {
            let value = record.get(column).unwrap_or_default();
            (column.clone(), value.to_string())
        })
        .collect();

    for column in appended_columns(original_columns) {
        let value = match column {
            SHIP_DATE_COLUMN => format_date(warranty.ship_date.as_ref()),
            WARRANTY_EXPIRATION_COLUMN => format_date(warranty.warranty_expiration.as_ref()),
            _ => storage.to_string(),
        };
        data.push((column.to_string(), value));
    }

    Record::new(data)
}
