use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::schema::{SchemaError, SchemaRegistry};
use crate::table::{RawTable, SiteMetadata};

/// Header records preceding the hourly data in an EPW file
pub const EPW_HEADER_ROWS: usize = 8;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read record: {0}")]
    Csv(#[from] csv::Error),

    #[error("File contains no data rows after {0} header rows")]
    NoData(usize),

    #[error("Missing {0} header row")]
    MissingHeader(&'static str),

    #[error("Invalid column header: {0}")]
    Header(#[from] SchemaError),
}

/// Raw rows plus station metadata handed to the cleaning pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RawImport {
    pub raw: RawTable,
    pub metadata: SiteMetadata,
    /// Columns described by the file's own header rows, if it has any
    pub header_schema: Option<SchemaRegistry>,
}

/// Anything that can produce a positional raw table
pub trait RawTableSource {
    fn load(&self) -> Result<RawImport, ReadError>;
}

/// Layout knowledge the reader needs; the pipeline never sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    pub delimiter: u8,
    pub skip_rows: usize,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: EPW_HEADER_ROWS,
        }
    }
}

/// Reader for EnergyPlus Weather (EPW) files
///
/// # File structure:
/// ```text
/// Row 1:   LOCATION,City,State,Country,Source,WMO,Latitude,Longitude,TimeZone,Elevation
/// Row 2-8: DESIGN CONDITIONS, TYPICAL/EXTREME PERIODS, GROUND TEMPERATURES, ...
/// Row 9+:  Hourly data, 35 comma separated fields, no header
/// ```
pub struct EpwReader {
    path: PathBuf,
    settings: ReaderSettings,
}

impl EpwReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: ReaderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ReaderSettings) -> Self {
        self.settings = settings;
        self
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

        let mut metadata = None;
        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;

            if index < settings.skip_rows {
                if index == 0 {
                    metadata = parse_location(&record);
                }
                debug!("Skipping header record {}: {:?}", index + 1, record.get(0));
                continue;
            }

            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if rows.is_empty() {
            return Err(ReadError::NoData(settings.skip_rows));
        }

        let metadata = metadata.unwrap_or_else(|| {
            warn!("No usable LOCATION header, site metadata left at defaults");
            SiteMetadata::default()
        });

        Ok(RawImport {
            raw: RawTable::new(rows),
            metadata,
            header_schema: None,
        })
    }
}

impl RawTableSource for EpwReader {
    fn load(&self) -> Result<RawImport, ReadError> {
        info!("Reading EPW file: {}", self.path.display());

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

/// Latitude, longitude and elevation from a `LOCATION` header record
fn parse_location(record: &csv::StringRecord) -> Option<SiteMetadata> {
    if !record.get(0)?.trim().eq_ignore_ascii_case("LOCATION") {
        return None;
    }

    let field = |index: usize| -> Option<f64> { record.get(index)?.trim().parse::<f64>().ok() };

    Some(SiteMetadata {
        latitude: field(6)?,
        longitude: field(7)?,
        elevation: field(9)?,
    })
}
