use serde::Serialize;
use std::fmt;
use std::slice;

use crate::schema::SchemaRegistry;
use crate::table::{Column, Table};

/// Missing-value summary for one column of an imported table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityRecord {
    pub column_name: String,
    pub missing_count: usize,
    pub total_count: usize,
}

impl fmt::Display for QualityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has {} missing values out of {} total values.",
            self.column_name, self.missing_count, self.total_count
        )
    }
}

/// Lazy, single-pass sequence of quality records in table column order
///
/// Columns without absent cells are skipped.
pub struct QualityRecords<'a> {
    columns: slice::Iter<'a, Column>,
    registry: &'a SchemaRegistry,
    total_count: usize,
}

impl Iterator for QualityRecords<'_> {
    type Item = QualityRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for column in self.columns.by_ref() {
            let missing_count = column.missing_count();
            if missing_count == 0 {
                continue;
            }

            let column_name = self
                .registry
                .lookup(&column.key)
                .map_or_else(|| column.key.clone(), |schema| schema.name.clone());

            return Some(QualityRecord {
                column_name,
                missing_count,
                total_count: self.total_count,
            });
        }
        None
    }
}

/// Summarize absent cells per column
pub fn report<'a>(table: &'a Table, registry: &'a SchemaRegistry) -> QualityRecords<'a> {
    QualityRecords {
        columns: table.columns.iter(),
        registry,
        total_count: table.row_count,
    }
}
