//! Persistent advisory journal.
//!
//! One JSON object per line, appended to the journal file. The file is opened
//! in append mode for each write so entries already written survive a crash
//! mid-batch.

use anyhow::{Context, Result};
use chrono::{Local, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Level tag of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Advice,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Advice => "ADVICE",
        }
    }
}

/// Appends entries to a JSON-lines journal and echoes them to stdout.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
    echo: bool,
}

impl Journal {
    /// Opens (and if needed creates) the journal's parent directory.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create journal directory: {}", parent.display()))?;
        }
        Ok(Self { path, echo: true })
    }

    /// Disables the console echo; entries still go to the file.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a `{"level", "message", "payload"?}` entry.
    pub fn log<T: Serialize>(&self, level: LogLevel, message: &str, payload: Option<&T>) -> Result<()> {
        if self.echo {
            println!("{}", console_line(level, message));
        }

        let mut entry = Map::new();
        entry.insert("level".to_string(), Value::from(level.label()));
        entry.insert("message".to_string(), Value::from(message));
        if let Some(payload) = payload {
            let payload = serde_json::to_value(payload).context("Failed to serialize journal payload")?;
            entry.insert("payload".to_string(), payload);
        }
        self.append_line(&Value::Object(entry))
    }

    /// Writes a bare JSON payload as its own line.
    pub fn log_json<T: Serialize>(&self, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload).context("Failed to serialize journal payload")?;
        self.append_line(&value)
    }

    fn append_line(&self, value: &Value) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open journal for append: {}", self.path.display()))?;

        writeln!(file, "{}", value).context("Failed to write journal entry")?;
        Ok(())
    }
}

/// Console form of an entry: `<local time> [LEVEL] message`.
pub fn console_line(level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] {}",
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        level.label(),
        message
    )
}

/// Writes a value as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize summary to JSON")?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON file: {}", output_path.display()))?;
    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
