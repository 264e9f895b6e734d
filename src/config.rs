use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::importers::simulation_reader::SIMULATION_HEADER_ROWS;
use crate::importers::{ReaderSettings, EPW_HEADER_ROWS};
use crate::schema::{ColumnSchema, SchemaError, SchemaRegistry};

pub const DEFAULT_PROFILE: &str = "Epw";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_file: PathBuf,
    pub import_config_path: Option<PathBuf>,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            log_file: env::var("IMPORT_LOG_FILE")
                .unwrap_or_else(|_| "log.txt".to_string())
                .into(),
            import_config_path: env::var("IMPORT_CONFIG_PATH").ok().map(PathBuf::from),
            profile: env::var("IMPORT_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON format in configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Separator must be a single byte, got {0:?}")]
    InvalidSeparator(String),

    #[error("Invalid column schema in profile {profile}: {source}")]
    Schema {
        profile: String,
        source: SchemaError,
    },
}

/// Per-type import settings, keyed by type name (e.g. `"Epw"`, `"Trnsys"`)
///
/// ```json
/// { "Epw": { "Settings": { "Separator": ",", "SkipRows": 8, "RenameColumns": true },
///            "RenameDictionary": [ { "Column": "Dry Bulb Temperature", "Rename": "t_db" } ] },
///   "Trnsys": { "Settings": { "Layout": "SimulationResults", "Separator": "\\t" } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ImportProfiles {
    profiles: BTreeMap<String, ImportProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportProfile {
    #[serde(rename = "Settings", default)]
    pub settings: ProfileSettings,
    #[serde(rename = "RenameDictionary", default)]
    pub rename_dictionary: Vec<RenameEntry>,
    /// Replaces the built-in schema when present
    #[serde(rename = "Columns", default)]
    pub columns: Option<Vec<ColumnSchema>>,
}

/// How rows of a file map onto columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FileLayout {
    /// Headerless rows after `SkipRows`, matched to a schema by position
    Positional,
    /// A column-name row and a unit row, then numeric data rows
    SimulationResults,
}

impl FileLayout {
    pub fn default_separator(&self) -> &'static str {
        match self {
            FileLayout::Positional => ",",
            FileLayout::SimulationResults => "\t",
        }
    }

    pub fn default_skip_rows(&self) -> usize {
        match self {
            FileLayout::Positional => EPW_HEADER_ROWS,
            FileLayout::SimulationResults => SIMULATION_HEADER_ROWS,
        }
    }
}

/// Unset keys take the defaults of the resolved [`FileLayout`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSettings {
    #[serde(rename = "Layout", default)]
    pub layout: Option<FileLayout>,
    #[serde(rename = "Separator", default)]
    pub separator: Option<String>,
    #[serde(rename = "SkipRows", default)]
    pub skip_rows: Option<usize>,
    #[serde(rename = "RenameColumns", default)]
    pub rename_columns: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameEntry {
    #[serde(rename = "Column")]
    pub column: String,
    #[serde(rename = "Rename")]
    pub rename: String,
}

impl ImportProfiles {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profiles = Self::from_json_str(&contents)?;
        info!("Configuration loaded successfully from {}.", path.display());
        Ok(profiles)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Profile for a type, or defaults when the type is not configured
    pub fn profile_or_default(&self, type_name: &str) -> ImportProfile {
        match self.profiles.get(type_name) {
            Some(profile) => profile.clone(),
            None => {
                warn!(
                    "No configuration found for Type: {}. Using default settings.",
                    type_name
                );
                ImportProfile::default()
            }
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&ImportProfile> {
        self.profiles.get(type_name)
    }

    pub fn available_types(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

impl ImportProfile {
    /// Layout for this profile
    ///
    /// An explicit `Layout` wins. Otherwise the EPW type and profiles with a
    /// `Columns` list are positional, and any other type is read as
    /// simulation results described by its own header rows.
    pub fn layout(&self, type_name: &str) -> FileLayout {
        match self.settings.layout {
            Some(layout) => layout,
            None if type_name == DEFAULT_PROFILE || self.columns.is_some() => FileLayout::Positional,
            None => FileLayout::SimulationResults,
        }
    }

    pub fn reader_settings(&self, layout: FileLayout) -> Result<ReaderSettings, ConfigError> {
        let configured = self
            .settings
            .separator
            .as_deref()
            .unwrap_or(layout.default_separator());
        let separator = configured.replace("\\t", "\t");
        let delimiter = match separator.as_bytes() {
            [byte] => *byte,
            _ => return Err(ConfigError::InvalidSeparator(configured.to_string())),
        };

        Ok(ReaderSettings {
            delimiter,
            skip_rows: self
                .settings
                .skip_rows
                .unwrap_or_else(|| layout.default_skip_rows()),
        })
    }

    /// Column renames, or `None` when `RenameColumns` is disabled
    pub fn renames(&self) -> Option<HashMap<String, String>> {
        if !self.settings.rename_columns {
            return None;
        }

        Some(
            self.rename_dictionary
                .iter()
                .map(|entry| (entry.column.clone(), entry.rename.clone()))
                .collect(),
        )
    }

    /// Custom schema registry, if the profile defines one
    pub fn schema(&self, profile_name: &str) -> Result<Option<SchemaRegistry>, ConfigError> {
        let Some(columns) = &self.columns else {
            return Ok(None);
        };

        SchemaRegistry::from_columns(columns.clone())
            .map(Some)
            .map_err(|source| ConfigError::Schema {
                profile: profile_name.to_string(),
                source,
            })
    }
}
