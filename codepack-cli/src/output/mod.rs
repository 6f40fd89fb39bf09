//! Output formatting module

use anyhow::Result;
use codepack_engine::Instance;
use std::io::Write;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output a single instance, tagged with its length bin if binning
    fn write_instance(&mut self, instance: &Instance, bin_id: Option<usize>) -> Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> Result<()>;
}

pub mod binned;
pub mod jsonl;
pub mod text;

pub use binned::{BinnedWriter, Binning};
pub use jsonl::JsonlFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per instance
    Jsonl,
    /// `id [CLS] doc [SEP] code [SEP] - num_tokens` lines, plus
    /// ` - positions - labels` for masked instances
    Text,
}

impl OutputFormat {
    /// Parse a format name from a configuration file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jsonl" | "json" => Some(OutputFormat::Jsonl),
            "text" | "txt" => Some(OutputFormat::Text),
            _ => None,
        }
    }

    /// File extension for bin files
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Text => "txt",
        }
    }

    /// Create a formatter writing to `writer`
    pub fn formatter<W: Write + Send + Sync + 'static>(&self, writer: W) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Jsonl => Box::new(JsonlFormatter::new(writer)),
            OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        }
    }
}
