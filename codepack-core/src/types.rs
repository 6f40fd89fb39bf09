//! Immutable token containers and packer outputs

use crate::token::{frame, special_token_count, Token};
use std::ops::Index;

/// An immutable, non-mutated run of tokens (one source line)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Create a sentence from its tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The tokens of this sentence
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token count
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sentence has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<Token>> FromIterator<S> for Sentence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// An ordered sequence of non-empty sentences
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    sentences: Vec<Sentence>,
}

impl Document {
    /// Create a document, discarding sentences with zero tokens
    pub fn new(sentences: impl IntoIterator<Item = Sentence>) -> Self {
        Self {
            sentences: sentences.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// A document with no sentences
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from per-sentence token lists
    pub fn from_token_lists<L, S>(lists: impl IntoIterator<Item = L>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<Token>,
    {
        Self::new(lists.into_iter().map(|tokens| tokens.into_iter().collect()))
    }

    /// All sentences in order
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Sentence count
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether the document has no sentences
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total tokens across all sentences
    pub fn num_tokens(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

impl Index<usize> for Document {
    type Output = Sentence;

    fn index(&self, index: usize) -> &Sentence {
        &self.sentences[index]
    }
}

/// A function body paired with its (possibly empty) description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePair {
    id: String,
    body: Document,
    description: Document,
}

impl CodePair {
    /// Create a code pair
    pub fn new(id: impl Into<String>, body: Document, description: Document) -> Self {
        Self {
            id: id.into(),
            body,
            description,
        }
    }

    /// Document identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Body sentences (source lines)
    pub fn body(&self) -> &Document {
        &self.body
    }

    /// Description sentences
    pub fn description(&self) -> &Document {
        &self.description
    }

    /// Whether a description is present
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}

/// One emitted window: a description paired with part of a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingInstance {
    /// Identifier of the source document
    pub id: String,
    /// Description tokens shared by every window of the document
    pub description: Vec<Token>,
    /// Body tokens of this window
    pub body: Vec<Token>,
    /// Description + body + framing markers
    pub num_tokens: usize,
}

impl TrainingInstance {
    /// Space-joined description tokens
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }

    /// Space-joined body tokens
    pub fn body_text(&self) -> String {
        self.body.join(" ")
    }

    /// Number of framing markers this instance is counted with
    pub fn special_tokens(&self) -> usize {
        special_token_count(!self.description.is_empty())
    }

    /// The framed sequence `[CLS] description [SEP]? body [SEP]`
    pub fn framed(&self) -> Vec<Token> {
        frame(&self.description, &self.body)
    }
}

/// A training instance with masked-LM substitutions applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedInstance {
    /// Identifier of the source document
    pub id: String,
    /// Description tokens after substitution
    pub description: Vec<Token>,
    /// Body tokens after substitution
    pub body: Vec<Token>,
    /// Positions in the framed sequence selected for prediction, ascending
    pub masked_positions: Vec<usize>,
    /// Original token at each masked position
    pub masked_labels: Vec<Token>,
    /// Description + body + framing markers
    pub num_tokens: usize,
}

impl MaskedInstance {
    /// Space-joined description tokens
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }

    /// Space-joined body tokens
    pub fn body_text(&self) -> String {
        self.body.join(" ")
    }

    /// The framed sequence `[CLS] description [SEP]? body [SEP]`
    pub fn framed(&self) -> Vec<Token> {
        frame(&self.description, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_drops_empty_sentences() {
        let document = Document::from_token_lists(vec![
            vec!["a", "b"],
            vec![],
            vec!["c"],
        ]);
        assert_eq!(document.len(), 2);
        assert_eq!(document.num_tokens(), 3);
        assert_eq!(document[1].tokens(), &["c".to_string()]);
    }

    #[test]
    fn test_code_pair_description_presence() {
        let body = Document::from_token_lists(vec![vec!["x"]]);
        let with = CodePair::new(
            "a",
            body.clone(),
            Document::from_token_lists(vec![vec!["doc"]]),
        );
        let without = CodePair::new("b", body, Document::empty());

        assert!(with.has_description());
        assert!(!without.has_description());
    }

    #[test]
    fn test_training_instance_text_and_framing() {
        let instance = TrainingInstance {
            id: "java_3".to_string(),
            description: vec!["adds".to_string(), "numbers".to_string()],
            body: vec!["return".to_string(), "a".to_string()],
            num_tokens: 7,
        };

        assert_eq!(instance.description_text(), "adds numbers");
        assert_eq!(instance.body_text(), "return a");
        assert_eq!(instance.special_tokens(), 3);
        assert_eq!(instance.framed().len(), instance.num_tokens);
    }
}
