//! Navigator configuration
//!
//! Configuration is usually read from a TOML file:
//!
//! ```toml
//! delimiter = "~"
//! severity_column = "Severity"
//! initial_capacity = 40
//!
//! [[files]]
//! path = "/var/log/app/server.log"
//! name = "server"
//!
//! [[columns]]
//! header = "Date"
//! width = 20
//! ```

use crate::error::{Error, Result};
use crate::row::LineFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default column delimiter
pub const DEFAULT_DELIMITER: &str = "~";

/// Default number of rows per page
pub const DEFAULT_CAPACITY: usize = 20;

/// A log file to track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Path to the log file
    pub path: PathBuf,
    /// Name shown to the user; defaults to the file name
    #[serde(default)]
    pub name: Option<String>,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
        })
    }
}

/// A column of structured log lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Header label
    pub header: String,
    /// Display width in characters; 0 leaves the column unbounded
    #[serde(default)]
    pub width: usize,
}

impl ColumnConfig {
    pub fn new(header: impl Into<String>, width: usize) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Configuration for a [`Navigator`](crate::Navigator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Log files, in the order they are cycled through
    pub files: Vec<FileConfig>,
    /// Column delimiter of structured lines
    pub delimiter: String,
    /// Column definitions
    pub columns: Vec<ColumnConfig>,
    /// Header of the column holding the severity, if any
    pub severity_column: Option<String>,
    /// Rows per page until the display reports its real size
    pub initial_capacity: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            columns: Vec::new(),
            severity_column: None,
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl NavigatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it, so that callers can
    /// still fill in missing settings
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::ReadConfig {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&source)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one log file must be configured".to_string(),
            ));
        }

        if self.delimiter.is_empty() {
            return Err(Error::InvalidConfig("delimiter must not be empty".to_string()));
        }

        if self.initial_capacity == 0 {
            return Err(Error::InvalidConfig(
                "initial_capacity must be at least 1".to_string(),
            ));
        }

        if let Some(severity) = &self.severity_column
            && !self.columns.iter().any(|c| &c.header == severity)
        {
            return Err(Error::InvalidConfig(format!(
                "severity column {severity:?} is not a configured column"
            )));
        }

        Ok(())
    }

    pub fn line_format(&self) -> LineFormat {
        LineFormat::new(self.delimiter.clone(), self.columns.clone())
    }
}

/// Builder for [`NavigatorConfig`]
#[derive(Debug, Default)]
pub struct NavigatorConfigBuilder {
    config: NavigatorConfig,
}

impl NavigatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.files.push(FileConfig::new(path));
        self
    }

    pub fn named_file(mut self, path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.config.files.push(FileConfig {
            path: path.into(),
            name: Some(name.into()),
        });
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    pub fn column(mut self, header: impl Into<String>, width: usize) -> Self {
        self.config.columns.push(ColumnConfig::new(header, width));
        self
    }

    pub fn severity_column(mut self, header: impl Into<String>) -> Self {
        self.config.severity_column = Some(header.into());
        self
    }

    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    pub fn build(self) -> NavigatorConfig {
        self.config
    }
}
