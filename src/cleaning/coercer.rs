use crate::schema::{ColumnSchema, DeclaredType};
use crate::table::{Cell, Column};

use super::StageOutcome;

/// Convert raw fields into the column's declared type
///
/// Unparseable numeric fields and blank fields in typed columns become
/// `Cell::Absent` and are counted. Without a schema the fields are kept
/// verbatim as text.
pub fn coerce(key: &str, raw: Vec<String>, schema: Option<&ColumnSchema>) -> StageOutcome {
    let Some(schema) = schema else {
        let cells = raw.into_iter().map(Cell::Text).collect();
        return StageOutcome::untouched(Column::new(key, cells));
    };

    let declared = schema.effective_type();
    let mut degraded = 0;

    let cells = raw
        .into_iter()
        .map(|field| {
            let cell = coerce_field(field, declared);
            if cell.is_absent() {
                degraded += 1;
            }
            cell
        })
        .collect();

    StageOutcome {
        column: Column::new(key, cells),
        degraded,
    }
}

fn coerce_field(field: String, declared: DeclaredType) -> Cell {
    if field.trim().is_empty() {
        return Cell::Absent;
    }

    match declared {
        DeclaredType::Int => parse_int(&field).map_or(Cell::Absent, Cell::Int),
        DeclaredType::Float => parse_float(&field).map_or(Cell::Absent, Cell::Float),
        DeclaredType::String => Cell::Text(field),
    }
}

/// Integers, or finite floats truncated toward zero (`"55.5"` gives 55)
fn parse_int(field: &str) -> Option<i64> {
    let trimmed = field.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i);
    }

    let f = parse_float(trimmed)?.trunc();
    if f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_float(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
