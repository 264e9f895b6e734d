use serde::Serialize;

/// One cleaned cell
///
/// `Absent` marks a value that was unparseable, matched the column's error
/// sentinel, or fell outside its bounds. It serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Absent,
}

impl Cell {
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// Numeric view of the cell, `None` for text and absent cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(_) | Cell::Absent => None,
        }
    }
}

/// Positional rows of raw fields exactly as the file reader produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Split rows into columns; caller guarantees every row has `width` fields
    pub(crate) fn into_columns(self, width: usize) -> Vec<Vec<String>> {
        let mut columns: Vec<Vec<String>> = (0..width)
            .map(|_| Vec::with_capacity(self.rows.len()))
            .collect();

        for row in self.rows {
            for (column, field) in columns.iter_mut().zip(row) {
                column.push(field);
            }
        }

        columns
    }
}

/// A named column of cleaned cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(key: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_absent()).count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Typed, cleaned table produced by one import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>, row_count: usize) -> Self {
        Self { columns, row_count }
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }
}

/// Location of the station a weather file was recorded at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SiteMetadata {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
}
