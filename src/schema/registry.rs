use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

use super::column::{ColumnSchema, DeclaredType};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Column '{key}' declares bounds but its type is {type_name}")]
    BoundsOnNonNumeric { key: String, type_name: &'static str },

    #[error("Column '{key}' has min_value {min} greater than max_value {max}")]
    InvertedBounds { key: String, min: f64, max: f64 },

    #[error("Duplicate column key: {0}")]
    DuplicateKey(String),

    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable, ordered set of column contracts
///
/// Column order is the positional order of fields in a raw row.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    columns: Vec<ColumnSchema>,
    index: HashMap<String, usize>,
}

static EPW_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::from_columns(epw_columns())
        .unwrap_or_else(|e| panic!("built-in EPW schema is invalid: {e}"))
});

impl SchemaRegistry {
    /// Build a registry, enforcing that bounds only appear on numeric columns
    pub fn from_columns(columns: Vec<ColumnSchema>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(columns.len());

        for (position, column) in columns.iter().enumerate() {
            let declared = column.effective_type();
            if column.has_bounds() && !declared.is_numeric() {
                return Err(SchemaError::BoundsOnNonNumeric {
                    key: column.key.clone(),
                    type_name: declared.type_name(),
                });
            }
            if let (Some(min), Some(max)) = (column.min_value, column.max_value) {
                if min > max {
                    return Err(SchemaError::InvertedBounds {
                        key: column.key.clone(),
                        min,
                        max,
                    });
                }
            }
            if index.insert(column.key.clone(), position).is_some() {
                return Err(SchemaError::DuplicateKey(column.key.clone()));
            }
        }

        Ok(Self { columns, index })
    }

    /// Parse a JSON array of column contracts
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let columns: Vec<ColumnSchema> = serde_json::from_str(json)?;
        Self::from_columns(columns)
    }

    /// Shared registry for the 35 EnergyPlus Weather (EPW) data fields
    pub fn epw() -> &'static SchemaRegistry {
        &EPW_REGISTRY
    }

    pub fn lookup(&self, key: &str) -> Option<&ColumnSchema> {
        self.index.get(key).map(|&position| &self.columns[position])
    }

    /// Column contract at a positional index
    pub fn at(&self, position: usize) -> Option<&ColumnSchema> {
        self.columns.get(position)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// EPW data dictionary fields in file order
///
/// Fields recorded with decimals (wind speed, visibility, aerosol optical
/// depth, albedo, liquid precipitation depth) are declared float; the int
/// default would truncate their fractional values. Earlier versions of this
/// registry typed only the two temperatures as float.
fn epw_columns() -> Vec<ColumnSchema> {
    use DeclaredType::{Float, String as Text};

    vec![
        ColumnSchema::new("Year", "YYYY"),
        ColumnSchema::new("Month", "MM"),
        ColumnSchema::new("Day", "DD"),
        ColumnSchema::new("Hour", "HH"),
        ColumnSchema::new("Minute", "mm"),
        ColumnSchema::new("Source", "").with_type(Text),
        ColumnSchema::new("Dry Bulb Temperature", "C")
            .with_type(Float)
            .with_sentinel(99.9)
            .with_range(-70.0, 70.0),
        ColumnSchema::new("Dew Point Temperature", "C")
            .with_type(Float)
            .with_sentinel(99.9)
            .with_range(-70.0, 70.0),
        ColumnSchema::new("Relative Humidity", "%")
            .with_sentinel(999.0)
            .with_range(0.0, 110.0),
        ColumnSchema::new("Atmospheric Station Pressure", "Pa")
            .with_sentinel(999_999.0)
            .with_range(31_000.0, 120_000.0),
        ColumnSchema::new("Extraterrestrial Horizontal Radiation", "W/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Extraterrestrial Direct Normal Radiation", "W/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Horizontal Infrared Radiation Intensity", "W/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Global Horizontal Radiation", "W/m²")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Direct Normal Radiation", "W/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Diffuse Horizontal Radiation", "W/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Global Horizontal Illuminance", "lux")
            .with_sentinel(999_999.0)
            .with_min(0.0),
        ColumnSchema::new("Direct Normal Illuminance", "lux")
            .with_sentinel(999_999.0)
            .with_min(0.0),
        ColumnSchema::new("Diffuse Horizontal Illuminance", "lux")
            .with_sentinel(999_999.0)
            .with_min(0.0),
        ColumnSchema::new("Zenith Luminance", "cd/m2")
            .with_sentinel(9999.0)
            .with_min(0.0),
        ColumnSchema::new("Wind Direction", "degrees")
            .with_sentinel(999.0)
            .with_range(0.0, 360.0),
        ColumnSchema::new("Wind Speed", "m/s")
            .with_type(Float)
            .with_sentinel(999.0)
            .with_range(0.0, 40.0),
        ColumnSchema::new("Total Sky Cover", "")
            .with_sentinel(99.0)
            .with_range(0.0, 10.0),
        ColumnSchema::new("Opaque Sky Cover", "")
            .with_sentinel(99.0)
            .with_range(0.0, 10.0),
        ColumnSchema::new("Visibility", "km")
            .with_type(Float)
            .with_sentinel(9999.0),
        ColumnSchema::new("Ceiling Height", "m").with_sentinel(99_999.0),
        ColumnSchema::new("Present Weather Observation", ""),
        ColumnSchema::new("Present Weather Codes", ""),
        ColumnSchema::new("Precipitable Water", "mm").with_sentinel(999.0),
        ColumnSchema::new("Aerosol Optical Depth", "thousandths")
            .with_type(Float)
            .with_sentinel(0.999),
        ColumnSchema::new("Snow Depth", "cm").with_sentinel(999.0),
        ColumnSchema::new("Days Since Last Snowfall", "D").with_sentinel(99.0),
        ColumnSchema::new("Albedo", "")
            .with_type(Float)
            .with_sentinel(999.0),
        ColumnSchema::new("Liquid Precipitation Depth", "mm")
            .with_type(Float)
            .with_sentinel(999.0),
        ColumnSchema::new("Liquid Precipitation Quantity", "hr").with_sentinel(99.0),
    ]
}
