//! Tokenizer collaborator
//!
//! The packer only needs token strings that follow the `##` continuation
//! convention, plus the full vocabulary for random substitution during
//! masking. [`PretrainedTokenizer`] wraps a Hugging Face `tokenizer.json`;
//! [`WordPieceTokenizer`] reads a plain vocabulary file with one token per
//! line. [`load_tokenizer`] picks one by file extension.

use crate::error::{EngineError, Result};
use codepack_core::token::CONTINUATION_PREFIX;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Token emitted for words that cannot be split into known pieces
pub const UNK: &str = "[UNK]";

/// Words longer than this many characters become [`UNK`]
pub const MAX_INPUT_CHARS_PER_WORD: usize = 100;

/// Splits text into vocabulary tokens
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`, keeping at most `max_length` tokens
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Vec<String>>;

    /// Every token of the vocabulary, in id order
    fn vocabulary(&self) -> Vec<String>;
}

/// Load a tokenizer from `path`
///
/// A `.json` file is read as a serialized Hugging Face tokenizer, whose own
/// normalizer decides casing. Anything else is read as a plain vocabulary
/// for [`WordPieceTokenizer`], lowercased when `lowercase` is set.
pub fn load_tokenizer<P: AsRef<Path>>(path: P, lowercase: bool) -> Result<Box<dyn Tokenizer>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        debug!("Loading serialized tokenizer from {}", path.display());
        Ok(Box::new(PretrainedTokenizer::from_file(path)?))
    } else {
        debug!("Loading vocabulary file {}", path.display());
        Ok(Box::new(WordPieceTokenizer::from_file(path, lowercase)?))
    }
}

/// Tokenizer backed by a serialized Hugging Face `tokenizer.json`
pub struct PretrainedTokenizer {
    inner: tokenizers::Tokenizer,
}

impl PretrainedTokenizer {
    /// Wrap an already built tokenizer
    pub fn new(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }

    /// Load a `tokenizer.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            EngineError::Tokenizer(format!("cannot load tokenizer from {}: {e}", path.display()))
        })?;
        Ok(Self::new(inner))
    }

    /// Number of distinct vocabulary tokens, added tokens included
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab(true).len()
    }
}

impl Tokenizer for PretrainedTokenizer {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Vec<String>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| EngineError::Tokenizer(format!("encoding failed: {e}")))?;

        Ok(encoding
            .get_tokens()
            .iter()
            .take(max_length)
            .cloned()
            .collect())
    }

    fn vocabulary(&self) -> Vec<String> {
        let mut entries: Vec<(String, u32)> = self.inner.get_vocab(true).into_iter().collect();
        entries.sort_unstable_by_key(|(_, id)| *id);
        entries.into_iter().map(|(token, _)| token).collect()
    }
}

/// Greedy longest-match-first WordPiece tokenizer over a plain vocabulary
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    tokens: Vec<String>,
    lookup: HashSet<String>,
    lowercase: bool,
    words: Regex,
}

impl WordPieceTokenizer {
    /// Build a tokenizer from tokens in id order
    pub fn new<I, S>(tokens: I, lowercase: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(EngineError::Tokenizer("vocabulary is empty".to_string()));
        }

        // Punctuation and symbols stand alone; everything else splits on whitespace.
        let words = Regex::new(r"\w+|[^\w\s]")
            .map_err(|e| EngineError::Tokenizer(format!("invalid word pattern: {e}")))?;

        Ok(Self {
            lookup: tokens.iter().cloned().collect(),
            tokens,
            lowercase,
            words,
        })
    }

    /// Load a vocabulary file with one token per line
    pub fn from_file<P: AsRef<Path>>(path: P, lowercase: bool) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::Tokenizer(format!("failed to read {}: {e}", path.display()))
        })?;

        let tokens = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty());
        Self::new(tokens, lowercase)
    }

    /// Number of vocabulary tokens
    pub fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    /// Whether `token` is part of the vocabulary
    pub fn contains(&self, token: &str) -> bool {
        self.lookup.contains(token)
    }

    fn split_word(&self, word: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_INPUT_CHARS_PER_WORD {
            out.push(UNK.to_string());
            return;
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;
            while start < end {
                let piece: String = chars[start..end].iter().collect();
                let candidate = if start == 0 {
                    piece
                } else {
                    format!("{CONTINUATION_PREFIX}{piece}")
                };
                if self.lookup.contains(&candidate) {
                    matched = Some(candidate);
                    break;
                }
                end -= 1;
            }

            match matched {
                Some(piece) => {
                    pieces.push(piece);
                    start = end;
                }
                None => {
                    // One unknown piece makes the whole word unknown.
                    out.push(UNK.to_string());
                    return;
                }
            }
        }
        out.extend(pieces);
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Vec<String>> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut out = Vec::new();
        for word in self.words.find_iter(&text) {
            if out.len() >= max_length {
                break;
            }
            self.split_word(word.as_str(), &mut out);
        }
        out.truncate(max_length);
        Ok(out)
    }

    fn vocabulary(&self) -> Vec<String> {
        self.tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tokenizer() -> WordPieceTokenizer {
        WordPieceTokenizer::new(
            [
                "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "def", "get", "##_", "##value",
                "##val", "##ue", "return", "self", "(", ")", ":", ".", "x",
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            WordPieceTokenizer::new(empty, true),
            Err(EngineError::Tokenizer(_))
        ));
    }

    #[test]
    fn test_longest_match_first() {
        let tokens = tokenizer().tokenize("get_value", 16).unwrap();
        assert_eq!(tokens, vec!["get", "##_", "##value"]);
    }

    #[test]
    fn test_punctuation_stands_alone() {
        let tokens = tokenizer().tokenize("def get(self):", 16).unwrap();
        assert_eq!(tokens, vec!["def", "get", "(", "self", ")", ":"]);
    }

    #[test]
    fn test_lowercasing() {
        let tokens = tokenizer().tokenize("RETURN Self.X", 16).unwrap();
        assert_eq!(tokens, vec!["return", "self", ".", "x"]);

        let cased = WordPieceTokenizer::new(["return", "[UNK]"], false).unwrap();
        assert_eq!(cased.tokenize("RETURN return", 16).unwrap(), vec!["[UNK]", "return"]);
    }

    #[test]
    fn test_unknown_word() {
        let tokens = tokenizer().tokenize("def zzz", 16).unwrap();
        assert_eq!(tokens, vec!["def", UNK]);
    }

    #[test]
    fn test_overlong_word_is_unknown() {
        let word = "x".repeat(MAX_INPUT_CHARS_PER_WORD + 1);
        assert_eq!(tokenizer().tokenize(&word, 16).unwrap(), vec![UNK]);
    }

    #[test]
    fn test_max_length_truncates() {
        let tokens = tokenizer().tokenize("get_value get_value", 4).unwrap();
        assert_eq!(tokens, vec!["get", "##_", "##value", "get"]);
        assert!(tokenizer().tokenize("def", 0).unwrap().is_empty());
    }

    #[test]
    fn test_from_file_keeps_line_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[UNK]\r\nhello\n\n##s").unwrap();

        let tokenizer = WordPieceTokenizer::from_file(file.path(), true).unwrap();
        assert_eq!(tokenizer.vocabulary(), vec!["[UNK]", "hello", "##s"]);
        assert_eq!(tokenizer.vocab_size(), 3);
        assert!(tokenizer.contains("##s"));
        assert_eq!(tokenizer.tokenize("Hellos", 8).unwrap(), vec!["hello", "##s"]);
    }

    #[test]
    fn test_missing_file() {
        let result = WordPieceTokenizer::from_file("/nonexistent/vocab.txt", true);
        assert!(matches!(result, Err(EngineError::Tokenizer(_))));
    }

    /// A BERT-style `tokenizer.json` over `vocab`, ids in slice order
    fn pretrained_file(vocab: &[&str]) -> tempfile::NamedTempFile {
        let ids: serde_json::Map<String, serde_json::Value> = vocab
            .iter()
            .enumerate()
            .map(|(id, token)| (token.to_string(), serde_json::json!(id)))
            .collect();
        let added: Vec<serde_json::Value> = vocab
            .iter()
            .enumerate()
            .filter(|(_, token)| token.starts_with('['))
            .map(|(id, token)| {
                serde_json::json!({
                    "id": id, "content": token, "single_word": false, "lstrip": false,
                    "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();
        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": { "type": "BertPreTokenizer" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordPiece",
                "unk_token": "[UNK]",
                "continuing_subword_prefix": "##",
                "max_input_chars_per_word": 100,
                "vocab": ids
            }
        });

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{json}").unwrap();
        file
    }

    const PRETRAINED_VOCAB: &[&str] = &[
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "return", "self", ".", "value", "##s", "(",
        ")", "_", "get",
    ];

    #[test]
    fn test_pretrained_tokenizes_with_continuations() {
        let file = pretrained_file(PRETRAINED_VOCAB);
        let tokenizer = PretrainedTokenizer::from_file(file.path()).unwrap();

        let tokens = tokenizer.tokenize("Return self.Values", 16).unwrap();
        assert_eq!(tokens, vec!["return", "self", ".", "value", "##s"]);
        assert_eq!(tokenizer.tokenize("get_value()", 3).unwrap(), vec!["get", "_", "value"]);
    }

    #[test]
    fn test_pretrained_vocabulary_in_id_order() {
        let file = pretrained_file(PRETRAINED_VOCAB);
        let tokenizer = PretrainedTokenizer::from_file(file.path()).unwrap();

        assert_eq!(tokenizer.vocabulary(), PRETRAINED_VOCAB);
        assert_eq!(tokenizer.vocab_size(), PRETRAINED_VOCAB.len());
    }

    #[test]
    fn test_pretrained_rejects_malformed_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"model\": 3}}").unwrap();
        assert!(matches!(
            PretrainedTokenizer::from_file(file.path()),
            Err(EngineError::Tokenizer(_))
        ));
    }

    #[test]
    fn test_load_tokenizer_by_extension() {
        let json = pretrained_file(PRETRAINED_VOCAB);
        let pretrained = load_tokenizer(json.path(), false).unwrap();
        assert_eq!(pretrained.vocabulary(), PRETRAINED_VOCAB);
        // The serialized normalizer lowercases regardless of the flag.
        assert_eq!(pretrained.tokenize("RETURN", 4).unwrap(), vec!["return"]);

        let mut plain = NamedTempFile::new().unwrap();
        writeln!(plain, "[UNK]\nreturn").unwrap();
        let wordpiece = load_tokenizer(plain.path(), false).unwrap();
        assert_eq!(wordpiece.vocabulary(), vec!["[UNK]", "return"]);
        assert_eq!(wordpiece.tokenize("RETURN", 4).unwrap(), vec!["[UNK]"]);
    }
}
