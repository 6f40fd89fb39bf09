//! Corpus file reading

use anyhow::{Context, Result};
use codepack_engine::{read_records, RawRecord};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Reads JSON-lines corpus files
pub struct FileReader;

impl FileReader {
    /// Read every record of a JSON-lines file
    pub fn read_records(path: &Path, skip_invalid: bool) -> Result<Vec<RawRecord>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let records = read_records(BufReader::new(file), skip_invalid)
            .with_context(|| format!("Failed to parse records in {}", path.display()))?;

        Ok(records)
    }

    /// Get file size in bytes
    pub fn file_size(path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        Ok(metadata.len())
    }
}
