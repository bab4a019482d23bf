pub mod json;
pub mod txt;
pub mod xml;

use crate::error::WriteError;
use crate::results::PageRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File formats the results can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Txt,
    Xml,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
            OutputFormat::Xml => "xml",
        }
    }

    /// Name used in messages
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Txt => "TXT",
            OutputFormat::Xml => "XML",
        }
    }

    /// Encode the records in this format
    pub fn render(self, records: &[PageRecord]) -> Result<Vec<u8>, WriteError> {
        match self {
            OutputFormat::Json => json::render(records),
            OutputFormat::Txt => Ok(txt::render(records).into_bytes()),
            OutputFormat::Xml => xml::render(records),
        }
    }
}

/// Formats written when nothing else is requested
pub fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json, OutputFormat::Txt]
}

/// Result of writing one format
#[derive(Debug)]
pub struct WriteOutcome {
    pub format: OutputFormat,
    pub result: Result<PathBuf, WriteError>,
}

/// Saves scraped records under `<root>/<slug>/<slug>.<ext>`
#[derive(Debug, Clone)]
pub struct ResultWriter {
    root: PathBuf,
    formats: Vec<OutputFormat>,
}

impl ResultWriter {
    pub fn new(root: impl Into<PathBuf>, formats: Vec<OutputFormat>) -> Self {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        Self {
            root: root.into(),
            formats: unique,
        }
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// Directory holding all files for `slug`
    pub fn output_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    /// Path of the `format` file for `slug`
    pub fn output_path(&self, slug: &str, format: OutputFormat) -> PathBuf {
        self.output_dir(slug)
            .join(format!("{}.{}", slug, format.extension()))
    }

    /// Write every configured format.
    ///
    /// A failure in one format is recorded in its outcome and does not stop
    /// the others.
    pub fn write_all(&self, slug: &str, records: &[PageRecord]) -> Vec<WriteOutcome> {
        self.formats
            .iter()
            .map(|&format| WriteOutcome {
                format,
                result: self.write_one(slug, format, records),
            })
            .collect()
    }

    fn write_one(
        &self,
        slug: &str,
        format: OutputFormat,
        records: &[PageRecord],
    ) -> Result<PathBuf, WriteError> {
        let bytes = format.render(records)?;
        let path = self.output_path(slug, format);
        write_atomic(&path, &bytes)?;
        Ok(path)
    }
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
///
/// Readers see either the previous file or the complete new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let io_error = |source: std::io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(e));
    }
    Ok(())
}
