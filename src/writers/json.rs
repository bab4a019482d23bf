use crate::error::WriteError;
use crate::results::PageRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Encode records as a JSON array indented by four spaces
pub fn render(records: &[PageRecord]) -> Result<Vec<u8>, WriteError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    Ok(out)
}

/// Load records back from a JSON output file
pub fn read_json(path: &Path) -> Result<Vec<PageRecord>, WriteError> {
    let contents = fs::read_to_string(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
