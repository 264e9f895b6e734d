use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::epw_reader::{RawImport, RawTableSource, ReadError, ReaderSettings};
use crate::schema::{ColumnSchema, DeclaredType, SchemaRegistry};
use crate::table::{RawTable, SiteMetadata};

/// Column-name row plus unit row
pub const SIMULATION_HEADER_ROWS: usize = 2;

/// Reader for simulation result exports (TRNSYS and similar)
///
/// # File structure:
/// ```text
/// Preamble:        optional, ignored
/// Next row:        column names     TIME    TAMB    QHEAT
/// Next row:        column units     h       C       kJ/h
/// Remaining rows:  numeric data, tab separated by default
/// ```
///
/// `skip_rows` counts every row before the data, the two header rows
/// included, so the preamble is `skip_rows - 2` rows long.
///
/// The header rows become the column schema: names are the column keys and
/// every column is declared float. Simulation exports carry no site metadata.
pub struct SimulationReader {
    path: PathBuf,
    settings: ReaderSettings,
}

impl SimulationReader {
    pub fn new(path: impl Into<PathBuf>, settings: ReaderSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read records from any source using the given layout
    pub fn read_from<R: Read>(source: R, settings: ReaderSettings) -> Result<RawImport, ReadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(settings.delimiter)
            .from_reader(source);

        let preamble = settings.skip_rows.saturating_sub(SIMULATION_HEADER_ROWS);
        let mut records = reader.records().skip(preamble);
        let names = records.next().ok_or(ReadError::MissingHeader("column name"))??;
        let units = records.next().ok_or(ReadError::MissingHeader("unit"))??;

        let header_schema = header_schema(&names, &units)?;
        debug!(
            "Simulation header: {:?}",
            header_schema.keys().collect::<Vec<_>>()
        );

        let rows = records
            .map(|record| -> Result<Vec<String>, ReadError> {
                Ok(record?.iter().map(str::to_string).collect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Err(ReadError::NoData(preamble + SIMULATION_HEADER_ROWS));
        }

        Ok(RawImport {
            raw: RawTable::new(rows),
            metadata: SiteMetadata::default(),
            header_schema: Some(header_schema),
        })
    }
}

/// One float column per header field; a blank name falls back to `Column <n>`
fn header_schema(names: &StringRecord, units: &StringRecord) -> Result<SchemaRegistry, ReadError> {
    let columns = names
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let name = match name.trim() {
                "" => format!("Column {}", position + 1),
                trimmed => trimmed.to_string(),
            };
            let unit = units.get(position).unwrap_or("").trim();
            ColumnSchema::new(name, unit).with_type(DeclaredType::Float)
        })
        .collect();

    Ok(SchemaRegistry::from_columns(columns)?)
}

impl RawTableSource for SimulationReader {
    fn load(&self) -> Result<RawImport, ReadError> {
        info!("Reading simulation results: {}", self.path.display());

        let file = File::open(&self.path).map_err(|source| ReadError::Open {
            path: self.path.clone(),
            source,
        })?;
        let import = Self::read_from(file, self.settings)?;

        info!(
            "Read {} data rows from {}",
            import.raw.row_count(),
            self.path.display()
        );
        Ok(import)
    }
}
