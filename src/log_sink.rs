//! Log sinks the import pipeline reports through
//!
//! The pipeline never touches a global logger; callers pass a sink.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const SEPARATOR_WIDTH: usize = 125;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

pub trait LogSink {
    fn log(&mut self, level: LogLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Open a titled section of related lines
    fn section_start(&mut self, title: &str) {
        self.info(title);
    }

    fn section_end(&mut self, title: &str) {
        self.info(title);
    }
}

fn emit(level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => info!("{}", message),
        LogLevel::Warning => warn!("{}", message),
        LogLevel::Error => error!("{}", message),
    }
}

/// Forwards every line to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, level: LogLevel, message: &str) {
        emit(level, message);
    }
}

/// Collects lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub entries: Vec<(LogLevel, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().any(|m| m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&mut self, level: LogLevel, message: &str) {
        self.entries.push((level, message.to_string()));
    }
}

/// Appends timestamped lines to a log file and mirrors them to `tracing`
///
/// Line format: `YYYY-mm-dd HH:MM:SS - message`. Sections are framed by a
/// line of 125 dashes. Write failures are reported through `tracing` and do
/// not interrupt the import.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: File,
}

impl FileLogSink {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the log file
    pub fn reset(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.flush()
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{line}") {
            warn!("Failed to write to log file {}: {}", self.path.display(), e);
        }
    }

    fn separator(&mut self) {
        let line = "-".repeat(SEPARATOR_WIDTH);
        self.write_line(&line);
    }
}

impl LogSink for FileLogSink {
    fn log(&mut self, level: LogLevel, message: &str) {
        emit(level, message);
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.write_line(&format!("{timestamp} - {message}"));
    }

    fn section_start(&mut self, title: &str) {
        self.separator();
        self.info(title);
    }

    fn section_end(&mut self, title: &str) {
        self.info(title);
        self.separator();
    }
}
