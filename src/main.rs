use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weather_file_importer::config::{Config, ImportProfiles, DEFAULT_PROFILE};
use weather_file_importer::log_sink::{FileLogSink, LogSink};
use weather_file_importer::pipeline::ImportedTable;
use weather_file_importer::services::ImportService;

#[derive(Parser)]
#[command(name = "weather-import")]
#[command(about = "Import weather files and clean them against the column schema", long_about = None)]
struct Cli {
    /// Weather file(s) to import; repeat for several files
    #[arg(long = "file", required_unless_present = "list_profiles")]
    files: Vec<PathBuf>,

    /// JSON file with per-type import profiles (default: IMPORT_CONFIG_PATH)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Profile (type name) to use from the JSON configuration (default: IMPORT_PROFILE or Epw)
    #[arg(long)]
    profile: Option<String>,

    /// Log file that receives the import report (default: IMPORT_LOG_FILE or log.txt)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Truncate the log file before importing
    #[arg(long)]
    reset_log: bool,

    /// Directory to write the cleaned tables as JSON
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the types defined in the JSON configuration and exit
    #[arg(long)]
    list_profiles: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,weather_file_importer=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let config_path = cli.config.or(config.import_config_path);
    let profile = cli.profile.unwrap_or(config.profile);
    let log_file = cli.log_file.unwrap_or(config.log_file);

    let profiles = match &config_path {
        Some(path) => ImportProfiles::load(path)?,
        None => ImportProfiles::default(),
    };

    if cli.list_profiles {
        let types = profiles.available_types();
        if types.is_empty() {
            println!("No configuration loaded. Unable to print available types.");
        } else {
            println!(
                "Available types in the JSON configuration: [{}]",
                types.join(", ")
            );
        }
        return Ok(());
    }

    let service = if config_path.is_some() || profile != DEFAULT_PROFILE {
        ImportService::from_profiles(&profiles, &profile)?
    } else {
        ImportService::epw()
    };

    let mut sink = FileLogSink::open(&log_file)?;
    if cli.reset_log {
        sink.reset()?;
    }
    info!(
        "Importing {} file(s), logging to {}",
        cli.files.len(),
        sink.path().display()
    );

    if let Some(dir) = &cli.output_dir {
        fs::create_dir_all(dir)?;
    }

    let progress = ProgressBar::new(cli.files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut failed = 0;
    for path in &cli.files {
        progress.set_message(path.display().to_string());

        match service.import_file(path, &mut sink) {
            Ok(imported) => {
                progress.suspend(|| println!("{}", summary(path, &imported)));
                if let Some(dir) = &cli.output_dir {
                    write_output(dir, path, &imported)?;
                }
            }
            Err(e) => {
                progress.suspend(|| error!("Import of {} failed: {}", path.display(), e));
                sink.error(&format!("Import of {} failed: {}", path.display(), e));
                failed += 1;
            }
        }

        progress.inc(1);
    }
    progress.finish_with_message("done");

    if failed > 0 {
        return Err(format!("{failed} of {} imports failed", cli.files.len()).into());
    }

    Ok(())
}

/// Per-file report, printed above the progress bar
fn summary(path: &Path, imported: &ImportedTable) -> String {
    let mut lines = vec![
        format!("\n{}", path.display()),
        "=".repeat(80),
        format!(
            "Rows: {}  Columns: {}  Missing cells: {}",
            imported.table.row_count,
            imported.table.width(),
            imported.table.total_missing()
        ),
        format!(
            "Site: lat {:.3}, lon {:.3}, elevation {:.1} m",
            imported.metadata.latitude, imported.metadata.longitude, imported.metadata.elevation
        ),
    ];
    lines.extend(imported.quality.iter().map(|record| format!("  {record}")));
    lines.join("\n")
}

fn write_output(
    dir: &Path,
    source: &Path,
    imported: &ImportedTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "import".to_string());
    let out_path = dir.join(format!("{stem}.json"));

    fs::write(&out_path, serde_json::to_string_pretty(imported)?)?;
    info!("Wrote cleaned table to {}", out_path.display());
    Ok(())
}
