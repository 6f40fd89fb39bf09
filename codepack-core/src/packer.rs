//! Sliding-window document packer
//!
//! A [`CodePair`] is turned into zero or more [`TrainingInstance`]s. One
//! description selection is shared by every window of the document; the body
//! is windowed sentence by sentence with a one-sentence overlap whenever a
//! window overflows, so no sentence is skipped at a flush boundary.

use crate::config::{PackerConfig, TrimPolicy};
use crate::error::{CoreError, Result};
use crate::token::{special_token_count, Token};
use crate::truncate::{trim_one_sequence, trim_one_sequence_deterministic};
use crate::types::{CodePair, Document, Sentence, TrainingInstance};
use rand::Rng;

/// Windows after the first are dropped when their body is shorter than this
pub const MIN_FOLLOWUP_BODY_TOKENS: usize = 16;

/// Per-document token budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBudget {
    /// Framing markers: 3 with a description, 2 without
    pub special_tokens: usize,
    /// Tokens left for description + body in one window
    pub max_body_tokens: usize,
    /// Upper bound for the packed description
    pub max_description_tokens: usize,
}

impl WindowBudget {
    /// Compute the budget of `pair` under `config`
    pub fn for_pair(config: &PackerConfig, pair: &CodePair) -> Self {
        let special_tokens = special_token_count(pair.has_description());
        Self {
            special_tokens,
            max_body_tokens: config.target_seq_length.saturating_sub(special_tokens),
            max_description_tokens: config.max_description_tokens(),
        }
    }
}

/// Packs documents into length-bounded training instances
#[derive(Debug, Clone)]
pub struct DocumentPacker {
    config: PackerConfig,
}

impl DocumentPacker {
    /// Create a packer, rejecting invalid configurations
    pub fn new(config: PackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The packer configuration
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Pack one document into training instances
    ///
    /// A document without body sentences yields no instances. Every other
    /// document yields at least one. Fails only when the selected
    /// description leaves no room for a single body token.
    pub fn pack<R: Rng + ?Sized>(
        &self,
        pair: &CodePair,
        rng: &mut R,
    ) -> Result<Vec<TrainingInstance>> {
        let budget = WindowBudget::for_pair(&self.config, pair);
        let description = self.select_description(pair.description(), &budget, rng);
        self.window_body(pair, description, &budget, rng)
    }

    /// Pick the description tokens shared by every window of a document
    ///
    /// The short-sequence draw is always taken so the generator advances the
    /// same way whether or not a description exists.
    fn select_description<R: Rng + ?Sized>(
        &self,
        description: &Document,
        budget: &WindowBudget,
        rng: &mut R,
    ) -> Vec<Token> {
        let short = rng.gen_bool(self.config.short_seq_prob);
        if description.is_empty() {
            return Vec::new();
        }

        if short {
            return description[0].tokens().to_vec();
        }

        let limit = budget.max_description_tokens;
        let sentences = description.sentences();
        let mut end = sentences.len();
        let mut length = 0;
        for (i, sentence) in sentences.iter().enumerate() {
            length += sentence.len();
            if length > limit {
                // The overflowing sentence is dropped unless it is the only one.
                end = i.max(1);
                break;
            }
        }

        let mut tokens = flatten(&sentences[..end]);
        self.trim(&mut tokens, limit, rng);
        tokens
    }

    /// Window the body sentences around a fixed description
    fn window_body<R: Rng + ?Sized>(
        &self,
        pair: &CodePair,
        description: Vec<Token>,
        budget: &WindowBudget,
        rng: &mut R,
    ) -> Result<Vec<TrainingInstance>> {
        let sentences = pair.body().sentences();
        let mut instances = Vec::new();
        if sentences.is_empty() {
            return Ok(instances);
        }

        let description_len = description.len();
        let body_budget = budget
            .max_body_tokens
            .checked_sub(description_len)
            .filter(|&remaining| remaining > 0)
            .ok_or_else(|| CoreError::BodyBudgetExhausted {
                id: pair.id().to_string(),
                description_tokens: description_len,
                max_body_tokens: budget.max_body_tokens,
            })?;

        let last = sentences.len() - 1;
        let mut start = 0;
        let mut current_length = description_len;

        for (i, sentence) in sentences.iter().enumerate() {
            current_length += sentence.len();
            if i != last && current_length <= budget.max_body_tokens {
                continue;
            }

            let window = &sentences[start..=i];
            let overflowed = window.len() > 1 && current_length > budget.max_body_tokens;

            let mut body = flatten(window);
            self.trim(&mut body, body_budget, rng);
            debug_assert!(!body.is_empty());

            if instances.is_empty() || body.len() >= MIN_FOLLOWUP_BODY_TOKENS {
                instances.push(TrainingInstance {
                    id: pair.id().to_string(),
                    num_tokens: description_len + body.len() + budget.special_tokens,
                    description: description.clone(),
                    body,
                });
            }

            // The overflowing sentence seeds the next window.
            if overflowed {
                start = i;
                current_length = description_len + sentence.len();
            } else {
                start = i + 1;
                current_length = description_len;
            }
        }

        Ok(instances)
    }

    fn trim<R: Rng + ?Sized>(&self, tokens: &mut Vec<Token>, max_len: usize, rng: &mut R) {
        match self.config.trim_policy {
            TrimPolicy::Random => trim_one_sequence(tokens, max_len, rng),
            TrimPolicy::Deterministic => trim_one_sequence_deterministic(tokens, max_len),
        }
    }
}

fn flatten(sentences: &[Sentence]) -> Vec<Token> {
    sentences
        .iter()
        .flat_map(|s| s.tokens().iter().cloned())
        .collect()
}
