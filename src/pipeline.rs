use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cleaning::{self, QualityRecord, StageOutcome};
use crate::log_sink::LogSink;
use crate::schema::{ColumnSchema, SchemaRegistry};
use crate::table::{Column, RawTable, SiteMetadata, Table};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Malformed table: data row {row} has {found} fields, expected {expected}")]
    Structural {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Cleaning stages, in the only order they may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Coerce,
    Scrub,
    Validate,
    Report,
}

/// Cells degraded by each stage for one column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub key: String,
    pub coercion_failures: usize,
    pub sentinel_matches: usize,
    pub range_violations: usize,
}

/// Successful result of one import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedTable {
    pub table: Table,
    pub metadata: SiteMetadata,
    pub quality: Vec<QualityRecord>,
    pub stats: Vec<ColumnStats>,
}

/// Runs Coerce → Scrub → Validate → Report over one raw table
///
/// Columns are matched to the registry by position. A table narrower than the
/// registry uses the leading schema columns; extra columns of a wider table are
/// keyed `Column <n>` and passed through untyped.
pub struct ImportPipeline<'r> {
    registry: &'r SchemaRegistry,
    renames: Option<HashMap<String, String>>,
}

impl<'r> ImportPipeline<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            renames: None,
        }
    }

    /// Rename output columns (old key → new key) once reporting is done
    pub fn with_renames(mut self, renames: HashMap<String, String>) -> Self {
        self.renames = Some(renames);
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    #[instrument(skip_all, fields(rows = raw.row_count()))]
    pub fn run(
        &self,
        raw: RawTable,
        metadata: SiteMetadata,
        sink: &mut dyn LogSink,
    ) -> Result<ImportedTable, PipelineError> {
        let width = match check_structure(&raw) {
            Ok(width) => width,
            Err(e) => {
                sink.error(&format!("Failed to process table: {e}"));
                return Err(e);
            }
        };
        let row_count = raw.row_count();
        self.log_width_mismatch(width, sink);

        let schemas: Vec<Option<&ColumnSchema>> =
            (0..width).map(|position| self.registry.at(position)).collect();
        let keys: Vec<String> = schemas
            .iter()
            .enumerate()
            .map(|(position, schema)| match schema {
                Some(schema) => schema.key.clone(),
                None => format!("Column {}", position + 1),
            })
            .collect();

        let mut stats: Vec<ColumnStats> = keys
            .iter()
            .map(|key| ColumnStats {
                key: key.clone(),
                ..ColumnStats::default()
            })
            .collect();

        debug!(stage = ?Stage::Coerce, width, "Running stage");
        let mut columns = Vec::with_capacity(width);
        for (position, fields) in raw.into_columns(width).into_iter().enumerate() {
            let outcome = cleaning::coerce(&keys[position], fields, schemas[position]);
            stats[position].coercion_failures = outcome.degraded;
            if let (Some(schema), true) = (schemas[position], outcome.degraded > 0) {
                sink.warning(&format!(
                    "Could not convert {} values of {} to {}. Applying coercion.",
                    outcome.degraded,
                    schema.name,
                    schema.effective_type().type_name()
                ));
            }
            columns.push(outcome.column);
        }

        debug!(stage = ?Stage::Scrub, "Running stage");
        let columns = apply_stage(columns, &schemas, cleaning::scrub, |position, outcome| {
            stats[position].sentinel_matches = outcome.degraded;
        });

        debug!(stage = ?Stage::Validate, "Running stage");
        let columns = apply_stage(columns, &schemas, cleaning::validate, |position, outcome| {
            stats[position].range_violations = outcome.degraded;
        });
        for (position, schema) in schemas.iter().enumerate() {
            let violations = stats[position].range_violations;
            if let (Some(schema), true) = (schema, violations > 0) {
                sink.info(&format!(
                    "{} has {} out-of-range values out of {} total values.",
                    schema.name, violations, row_count
                ));
            }
        }

        debug!(stage = ?Stage::Report, "Running stage");
        let mut table = Table::new(columns, row_count);
        let quality: Vec<QualityRecord> = cleaning::report(&table, self.registry)
            .inspect(|record| sink.warning(&record.to_string()))
            .collect();

        if let Some(renames) = &self.renames {
            let renamed = rename_columns(&mut table.columns, renames);
            sink.info(&format!(
                "Renamed {} out of {} columns based on the JSON configuration.",
                renamed,
                table.width()
            ));
        }

        info!(
            rows = row_count,
            columns = width,
            affected_columns = quality.len(),
            "Table cleaned"
        );

        Ok(ImportedTable {
            table,
            metadata,
            quality,
            stats,
        })
    }

    fn log_width_mismatch(&self, width: usize, sink: &mut dyn LogSink) {
        let expected = self.registry.len();
        if width > 0 && width < expected {
            sink.warning(&format!(
                "Table has {width} columns; applying the first {width} of {expected} schema columns."
            ));
        } else if width > expected {
            sink.warning(&format!(
                "Table has {width} columns; {} columns beyond the schema are passed through unchecked.",
                width - expected
            ));
        }
    }
}

/// Width shared by every row, or the first row that disagrees with row 1
fn check_structure(raw: &RawTable) -> Result<usize, PipelineError> {
    let Some(first) = raw.rows.first() else {
        return Ok(0);
    };
    let expected = first.len();

    for (index, row) in raw.rows.iter().enumerate() {
        if row.len() != expected {
            return Err(PipelineError::Structural {
                row: index + 1,
                expected,
                found: row.len(),
            });
        }
    }

    Ok(expected)
}

fn apply_stage<S, R>(
    columns: Vec<Column>,
    schemas: &[Option<&ColumnSchema>],
    stage: S,
    mut record: R,
) -> Vec<Column>
where
    S: Fn(Column, &ColumnSchema) -> StageOutcome,
    R: FnMut(usize, &StageOutcome),
{
    columns
        .into_iter()
        .zip(schemas)
        .enumerate()
        .map(|(position, (column, schema))| match schema {
            Some(schema) => {
                let outcome = stage(column, *schema);
                record(position, &outcome);
                outcome.column
            }
            None => column,
        })
        .collect()
}

fn rename_columns(columns: &mut [Column], renames: &HashMap<String, String>) -> usize {
    let mut renamed = 0;
    for column in columns.iter_mut() {
        if let Some(new_key) = renames.get(&column.key) {
            column.key = new_key.clone();
            renamed += 1;
        }
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemorySink;
    use crate::table::Cell;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn small_registry() -> SchemaRegistry {
        SchemaRegistry::from_columns(vec![
            ColumnSchema::new("Hour", "HH"),
            ColumnSchema::new("Wind Direction", "degrees")
                .with_sentinel(999.0)
                .with_range(0.0, 360.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_check_structure_reports_first_bad_row() {
        let raw = RawTable::new(vec![row(&["1", "2"]), row(&["1", "2"]), row(&["1"])]);
        assert_eq!(
            check_structure(&raw),
            Err(PipelineError::Structural {
                row: 3,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_empty_table() {
        let registry = small_registry();
        let mut sink = MemorySink::new();
        let imported = ImportPipeline::new(&registry)
            .run(RawTable::default(), SiteMetadata::default(), &mut sink)
            .unwrap();

        assert_eq!(imported.table.width(), 0);
        assert_eq!(imported.table.row_count, 0);
        assert!(imported.quality.is_empty());
    }

    #[test]
    fn test_stats_split_by_stage() {
        let registry = small_registry();
        let raw = RawTable::new(vec![
            row(&["1", "999"]),
            row(&["x", "400"]),
            row(&["3", "90"]),
        ]);

        let mut sink = MemorySink::new();
        let imported = ImportPipeline::new(&registry)
            .run(raw, SiteMetadata::default(), &mut sink)
            .unwrap();

        assert_eq!(imported.stats[0].coercion_failures, 1);
        assert_eq!(imported.stats[1].sentinel_matches, 1);
        assert_eq!(imported.stats[1].range_violations, 1);
        assert_eq!(
            imported.table.column("Wind Direction").unwrap().cells,
            vec![Cell::Absent, Cell::Absent, Cell::Int(90)]
        );
        assert!(sink.contains("Wind Direction has 1 out-of-range values out of 3 total values."));
        assert!(sink.contains("Wind Direction has 2 missing values out of 3 total values."));
        assert!(sink.contains("Could not convert 1 values of Hour to int"));
    }

    #[test]
    fn test_renames_applied_after_report() {
        let registry = small_registry();
        let raw = RawTable::new(vec![row(&["1", "-1"])]);
        let renames = HashMap::from([("Wind Direction".to_string(), "wd".to_string())]);

        let mut sink = MemorySink::new();
        let imported = ImportPipeline::new(&registry)
            .with_renames(renames)
            .run(raw, SiteMetadata::default(), &mut sink)
            .unwrap();

        assert_eq!(
            imported.table.column_keys().collect::<Vec<_>>(),
            vec!["Hour", "wd"]
        );
        assert_eq!(imported.quality[0].column_name, "Wind Direction");
        assert!(sink.contains("Renamed 1 out of 2 columns"));
    }
}
