// Schema-driven cleaning stages
//
// Each stage consumes a column and returns it together with the number of
// cells it turned absent. Stages never fail on individual cells.

pub mod coercer;
pub mod quality;
pub mod range;
pub mod sentinel;

pub use coercer::coerce;
pub use quality::{report, QualityRecord, QualityRecords};
pub use range::validate;
pub use sentinel::scrub;

use crate::table::{Cell, Column};

/// Column after a cleaning stage, with the count of cells that stage degraded
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub column: Column,
    pub degraded: usize,
}

impl StageOutcome {
    pub fn untouched(column: Column) -> Self {
        Self {
            column,
            degraded: 0,
        }
    }
}

/// Replace every present numeric cell matching `reject` with `Cell::Absent`
pub(crate) fn absent_where<F>(mut column: Column, reject: F) -> StageOutcome
where
    F: Fn(f64) -> bool,
{
    let mut degraded = 0;

    for cell in column.cells.iter_mut() {
        if cell.as_f64().is_some_and(&reject) {
            *cell = Cell::Absent;
            degraded += 1;
        }
    }

    StageOutcome { column, degraded }
}
