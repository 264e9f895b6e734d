use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::{ConfigError, FileLayout, ImportProfile, ImportProfiles, DEFAULT_PROFILE};
use crate::importers::{EpwReader, RawImport, RawTableSource, ReadError, SimulationReader};
use crate::log_sink::LogSink;
use crate::pipeline::{ImportPipeline, ImportedTable, PipelineError};
use crate::schema::SchemaRegistry;

/// Error types for end-to-end weather file imports
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Read failed: {0}")]
    Read(#[from] ReadError),

    #[error("Import failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reads a weather file and runs it through the cleaning pipeline
///
/// Holds the resolved profile for one file type: file layout, reader
/// settings, optional column renames and an optional custom schema replacing
/// the EPW one. Simulation results are cleaned against their own header rows.
#[derive(Debug, Clone)]
pub struct ImportService {
    type_name: String,
    layout: FileLayout,
    profile: ImportProfile,
    custom_schema: Option<SchemaRegistry>,
}

impl ImportService {
    /// Service using the built-in EPW schema and default reader settings
    pub fn epw() -> Self {
        Self {
            type_name: DEFAULT_PROFILE.to_string(),
            layout: FileLayout::Positional,
            profile: ImportProfile::default(),
            custom_schema: None,
        }
    }

    pub fn from_profiles(profiles: &ImportProfiles, type_name: &str) -> Result<Self, ConfigError> {
        let profile = profiles.profile_or_default(type_name);
        let layout = profile.layout(type_name);
        let custom_schema = profile.schema(type_name)?;
        // Validate the separator up front rather than per file
        profile.reader_settings(layout)?;
        info!("Type {} is read with the {:?} layout", type_name, layout);

        Ok(Self {
            type_name: type_name.to_string(),
            layout,
            profile,
            custom_schema,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn layout(&self) -> FileLayout {
        self.layout
    }

    /// Schema configured for this type
    ///
    /// `None` for simulation results, whose schema comes from each file's
    /// header rows.
    pub fn registry(&self) -> Option<&SchemaRegistry> {
        match (&self.custom_schema, self.layout) {
            (Some(schema), _) => Some(schema),
            (None, FileLayout::Positional) => Some(SchemaRegistry::epw()),
            (None, FileLayout::SimulationResults) => None,
        }
    }

    /// Import one weather or simulation results file from disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        sink: &mut dyn LogSink,
    ) -> Result<ImportedTable, ImportError> {
        let path = path.as_ref();
        let settings = self.profile.reader_settings(self.layout)?;
        let reader: Box<dyn RawTableSource> = match self.layout {
            FileLayout::Positional => Box::new(EpwReader::new(path).with_settings(settings)),
            FileLayout::SimulationResults => Box::new(SimulationReader::new(path, settings)),
        };

        sink.section_start("Process Started");
        sink.info(&format!("Reading {} file {}...", self.type_name, path.display()));
        let result = self.import_source(reader.as_ref(), sink);
        sink.section_end("Process Finished");
        result
    }

    /// Import from any raw table source
    pub fn import_source(
        &self,
        source: &dyn RawTableSource,
        sink: &mut dyn LogSink,
    ) -> Result<ImportedTable, ImportError> {
        let start_time = Instant::now();

        let RawImport {
            raw,
            metadata,
            header_schema,
        } = match source.load() {
            Ok(import) => import,
            Err(e) => {
                sink.error(&format!("Failed to read {} file: {}", self.type_name, e));
                return Err(e.into());
            }
        };

        // A configured schema wins over the file's own header
        let registry = match (self.registry(), &header_schema) {
            (Some(configured), _) => configured,
            (None, Some(from_header)) => from_header,
            (None, None) => SchemaRegistry::epw(),
        };

        let mut pipeline = ImportPipeline::new(registry);
        match self.profile.renames() {
            Some(renames) => {
                sink.info(&format!(
                    "> Settings: RenameColumns is ENABLED for Type: {}.",
                    self.type_name
                ));
                pipeline = pipeline.with_renames(renames);
            }
            None => {
                sink.info(&format!(
                    "> Settings: RenameColumns is DISABLED for Type: {}.",
                    self.type_name
                ));
            }
        }

        let imported = pipeline.run(raw, metadata, sink)?;

        if imported.quality.is_empty() {
            info!("No missing values after cleaning");
        } else {
            warn!(
                "{} columns have missing values after cleaning",
                imported.quality.len()
            );
        }
        sink.info(&format!(
            "{} file read and processed successfully ({:.2}s).",
            self.type_name,
            start_time.elapsed().as_secs_f64()
        ));

        Ok(imported)
    }
}
