use crate::schema::ColumnSchema;
use crate::table::Column;

use super::{absent_where, StageOutcome};

/// Mark cells equal to the column's error sentinel as absent
///
/// Must run after coercion: the sentinel is compared against the typed value,
/// so `"99.90"` and `"99.9"` both match a sentinel of `99.9`.
pub fn scrub(column: Column, schema: &ColumnSchema) -> StageOutcome {
    match schema.error_sentinel {
        Some(sentinel) => absent_where(column, |value| value == sentinel),
        None => StageOutcome::untouched(column),
    }
}
