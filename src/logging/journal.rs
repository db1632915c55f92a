// file: src/logging/journal.rs
// version: 1.0.0
// guid: fee30181-8764-472f-8ec5-44693b160b4e

//! Append-only provisioning journal
//!
//! Every record is printed to the console and appended to the log file as
//! `[<timestamp>] [<LEVEL>] <message>`, then mirrored into `tracing`.

use crate::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Journal severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One journal line
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    /// Render the record the way it is written to the log file
    pub fn to_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }

    fn to_console_line(&self) -> String {
        let level = match self.level {
            LogLevel::Info => self.level.as_str().blue(),
            LogLevel::Success => self.level.as_str().green(),
            LogLevel::Warning => self.level.as_str().yellow(),
            LogLevel::Error => self.level.as_str().red().bold(),
        };
        format!(
            "[{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            level,
            self.message
        )
    }
}

/// Journal writing to the console and a persistent log file
pub struct InstallLog {
    path: PathBuf,
    console: bool,
    records: Vec<LogRecord>,
}

impl InstallLog {
    /// Open (or create) the log file for appending
    pub fn open<P: AsRef<Path>>(path: P, console: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            console,
            records: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written through this handle, oldest first
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        let record = LogRecord::new(level, message);

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;

        if self.console {
            println!("{}", record.to_console_line());
        }

        match record.level {
            LogLevel::Info | LogLevel::Success => tracing::debug!("{}", record.message),
            LogLevel::Warning => tracing::warn!("{}", record.message),
            LogLevel::Error => tracing::error!("{}", record.message),
        }

        self.records.push(record);
        Ok(())
    }

    pub fn info(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(LogLevel::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(LogLevel::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(LogLevel::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(LogLevel::Error, message)
    }
}
