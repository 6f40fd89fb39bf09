//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use codepack_engine::Instance;
use std::io::Write;

/// Text formatter - `id [CLS] doc [SEP] code [SEP] - num_tokens` per line
///
/// Masked instances append ` - positions - labels`, each list space-joined.
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn write_instance(&mut self, instance: &Instance, _bin_id: Option<usize>) -> Result<()> {
        write!(
            self.writer,
            "{} [CLS] {} [SEP] {} [SEP] - {}",
            instance.id(),
            instance.description_text(),
            instance.body_text(),
            instance.num_tokens()
        )?;
        if let Some(masked) = instance.as_masked() {
            let positions: Vec<String> = masked
                .masked_positions
                .iter()
                .map(ToString::to_string)
                .collect();
            write!(
                self.writer,
                " - {} - {}",
                positions.join(" "),
                masked.masked_labels.join(" ")
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
