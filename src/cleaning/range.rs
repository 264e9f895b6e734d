use crate::schema::ColumnSchema;
use crate::table::Column;

use super::{absent_where, StageOutcome};

/// Mark cells strictly outside the column's bounds as absent
///
/// The bound values themselves are valid.
pub fn validate(column: Column, schema: &ColumnSchema) -> StageOutcome {
    if !schema.has_bounds() {
        return StageOutcome::untouched(column);
    }

    absent_where(column, |value| schema.is_out_of_range(value))
}
