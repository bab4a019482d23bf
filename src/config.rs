use crate::error::ScrapeError;
use crate::fetchers::http::DEFAULT_TIMEOUT;
use crate::filter::Selection;
use crate::writers::{OutputFormat, default_formats};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one scraping run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Website or sitemap URL; asked for interactively when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of page requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Output formats to write
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,

    /// Root directory for output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Page count limit and excluded extensions
    #[serde(default)]
    pub selection: Selection,

    /// Whether to prompt for anything not given
    #[serde(default = "default_true")]
    pub interactive: bool,

    /// Whether to draw a progress bar while scraping
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Default value for timeout_secs
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Default value for concurrency (sequential)
fn default_concurrency() -> usize {
    1
}

/// Default value for output_dir
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target: None,
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            formats: default_formats(),
            output_dir: default_output_dir(),
            selection: Selection::default(),
            interactive: true,
            progress: true,
        }
    }
}

impl ScrapeConfig {
    /// Create a configuration with default values for `target`
    pub fn new(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| ScrapeError::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ScrapeError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScrapeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ScrapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.timeout_secs == 0 {
            return Err(ScrapeError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ScrapeError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.formats.is_empty() {
            return Err(ScrapeError::Config(
                "at least one output format is required".to_string(),
            ));
        }
        if self.selection.max_count == Some(0) {
            return Err(ScrapeError::Config(
                "page limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
