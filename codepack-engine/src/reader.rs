//! Corpus reader collaborator
//!
//! Raw records arrive as JSON lines carrying an id, a description and a
//! function body. They are split into sentences on a separator character,
//! tokenized, and turned into [`CodePair`]s for the packer.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::tokenizer::Tokenizer;
use codepack_core::{CodePair, Document, Sentence};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One raw corpus record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Record identifier, e.g. `python_17`
    pub id: String,
    /// Natural-language description, possibly empty
    #[serde(default, alias = "docstring")]
    pub description: String,
    /// Function body
    #[serde(alias = "code", alias = "function")]
    pub body: String,
}

impl RawRecord {
    /// Create a record
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            body: body.into(),
        }
    }
}

/// Parse JSON-lines records
///
/// Blank lines are ignored. A malformed line fails with its 1-based line
/// number unless `skip_invalid` is set, in which case it is logged and
/// dropped.
pub fn read_records<R: BufRead>(reader: R, skip_invalid: bool) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) if skip_invalid => {
                warn!("Dropping record at line {}: {}", index + 1, e);
            }
            Err(e) => {
                return Err(EngineError::ParseError {
                    line: index + 1,
                    reason: e.to_string(),
                })
            }
        }
    }
    Ok(records)
}

/// Split raw text on `separator`, trimming pieces and dropping empty ones
pub fn split_segments(text: &str, separator: char) -> impl Iterator<Item = &str> {
    text.split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// Turns raw records into tokenized [`CodePair`]s
pub struct CodePairBuilder<'t> {
    tokenizer: &'t dyn Tokenizer,
    max_segment_tokens: usize,
    separator: char,
}

impl<'t> CodePairBuilder<'t> {
    /// Create a builder
    pub fn new(tokenizer: &'t dyn Tokenizer, max_segment_tokens: usize, separator: char) -> Self {
        Self {
            tokenizer,
            max_segment_tokens,
            separator,
        }
    }

    /// Create a builder using the segment settings of `config`
    pub fn from_config(tokenizer: &'t dyn Tokenizer, config: &EngineConfig) -> Self {
        Self::new(
            tokenizer,
            config.max_segment_tokens,
            config.segment_separator,
        )
    }

    /// Build one pair, or `None` when the body has no tokens
    pub fn build(&self, record: &RawRecord) -> Result<Option<CodePair>> {
        let body = self.document(&record.body)?;
        if body.is_empty() {
            return Ok(None);
        }
        let description = self.document(&record.description)?;
        Ok(Some(CodePair::new(record.id.clone(), body, description)))
    }

    /// Build every pair with a non-empty body
    pub fn build_all(&self, records: &[RawRecord]) -> Result<Vec<CodePair>> {
        let mut pairs = Vec::with_capacity(records.len());
        for record in records {
            if let Some(pair) = self.build(record)? {
                pairs.push(pair);
            }
        }

        let dropped = records.len() - pairs.len();
        if dropped > 0 {
            debug!("{} records had no body tokens", dropped);
        }
        Ok(pairs)
    }

    fn document(&self, text: &str) -> Result<Document> {
        let sentences = split_segments(text, self.separator)
            .map(|segment| {
                self.tokenizer
                    .tokenize(segment, self.max_segment_tokens)
                    .map(Sentence::new)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Document::new(sentences))
    }
}
