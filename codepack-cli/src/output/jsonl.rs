//! JSON-lines output formatter

use super::OutputFormatter;
use anyhow::Result;
use codepack_engine::Instance;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// JSON-lines formatter - one object per instance
pub struct JsonlFormatter<W: Write> {
    writer: W,
}

/// Data structure for JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Source document id
    pub id: String,
    /// Space-joined description tokens
    pub doc: String,
    /// Space-joined body tokens
    pub code: String,
    /// Framed length including markers
    pub num_tokens: usize,
    /// Masked positions in the framed sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_lm_positions: Option<Vec<usize>>,
    /// Original tokens at the masked positions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_lm_labels: Option<Vec<String>>,
    /// Length bin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_id: Option<usize>,
}

impl InstanceRecord {
    /// Flatten an instance into its output record
    pub fn new(instance: &Instance, bin_id: Option<usize>) -> Self {
        let masked = instance.as_masked();
        Self {
            id: instance.id().to_string(),
            doc: instance.description_text(),
            code: instance.body_text(),
            num_tokens: instance.num_tokens(),
            masked_lm_positions: masked.map(|m| m.masked_positions.clone()),
            masked_lm_labels: masked.map(|m| m.masked_labels.clone()),
            bin_id,
        }
    }
}

impl<W: Write> JsonlFormatter<W> {
    /// Create a new JSON-lines formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonlFormatter<W> {
    fn write_instance(&mut self, instance: &Instance, bin_id: Option<usize>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &InstanceRecord::new(instance, bin_id))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
