use chrono::{DateTime, Local};

use crate::config::FETCH_DATE_COLUMN;
use crate::models::{cell_text, PermitTable, RawPermit};

pub const FETCH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn fetch_timestamp(at: DateTime<Local>) -> String {
    at.format(FETCH_DATE_FORMAT).to_string()
}

/// Keeps `fields` of every record, in order, and stamps each row with `fetched_at`.
///
/// Records keep the order they arrived in. No records means no rows.
pub fn process_permits(records: &[RawPermit], fields: &[String], fetched_at: &str) -> PermitTable {
    if records.is_empty() {
        return PermitTable::default();
    }

    let mut columns = fields.to_vec();
    columns.push(FETCH_DATE_COLUMN.to_string());

    let rows = records
        .iter()
        .map(|record| {
            let mut row: Vec<String> = fields
                .iter()
                .map(|field| cell_text(record.get(field)))
                .collect();
            row.push(fetched_at.to_string());
            row
        })
        .collect();

    PermitTable { columns, rows }
}
