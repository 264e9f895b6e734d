#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A complete, valid EPW data row (35 fields, no missing values)
pub const VALID_ROW: &str = "1999,1,1,1,60,?9?9?9?9E0?9?9?9?9?9?9?9?9?9?9?9?9*9*9?9?9,-3.0,-7.2,73,82100,0,1415,243,0,0,0,0,0,0,0,190,4.1,0,0,16.1,77777,9,999999999,4,0.0760,0,88,0.160,0.0,0.0";

pub const DRY_BULB: usize = 6;
pub const RELATIVE_HUMIDITY: usize = 8;
pub const PRESSURE: usize = 9;
pub const WIND_DIRECTION: usize = 20;
pub const WIND_SPEED: usize = 21;
pub const AEROSOL_OPTICAL_DEPTH: usize = 29;

pub const LOCATION: &str =
    "LOCATION,Denver Centennial,CO,USA,TMY3,724666,39.57,-104.85,-7.0,1793.0";

/// Valid row with selected fields replaced
pub fn epw_row(overrides: &[(usize, &str)]) -> Vec<String> {
    let mut row: Vec<String> = VALID_ROW.split(',').map(str::to_string).collect();
    for (index, value) in overrides {
        row[*index] = value.to_string();
    }
    row
}

/// Rows that differ only in one column
pub fn rows_with_column(index: usize, values: &[&str]) -> Vec<Vec<String>> {
    values.iter().map(|v| epw_row(&[(index, v)])).collect()
}

/// The eight EPW header records
pub fn epw_header() -> String {
    [
        LOCATION,
        "DESIGN CONDITIONS,0",
        "TYPICAL/EXTREME PERIODS,0",
        "GROUND TEMPERATURES,0",
        "HOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0",
        "COMMENTS 1,synthetic test file",
        "COMMENTS 2,",
        "DATA PERIODS,1,1,Data,Sunday, 1/ 1,12/31",
    ]
    .join("\n")
}

/// Write an EPW file with the standard header and the given data rows
pub fn write_epw(dir: &Path, name: &str, rows: &[Vec<String>]) -> PathBuf {
    let mut contents = epw_header();
    for row in rows {
        contents.push('\n');
        contents.push_str(&row.join(","));
    }
    contents.push('\n');

    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write EPW fixture");
    path
}
