//! Masked-LM instance construction
//!
//! The description is framed as sequence A and the body as sequence B:
//! `[CLS] description [SEP] body [SEP]`, or `[CLS] body [SEP]` without a
//! description. Positions are selected in random order; each selected token
//! is replaced by `[MASK]` 80% of the time, kept 10% of the time and swapped
//! for a random vocabulary token 10% of the time.

use crate::config::MaskingConfig;
use crate::error::{CoreError, Result};
use crate::token::{frame, Token, MASK};
use crate::types::{MaskedInstance, TrainingInstance};
use rand::seq::SliceRandom;
use rand::Rng;

/// A non-empty pool of tokens used for random substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<Token>,
}

impl Vocabulary {
    /// Create a vocabulary, rejecting an empty token list
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(CoreError::EmptyVocabulary);
        }
        Ok(Self { tokens })
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the vocabulary has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens in vocabulary order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Draw one token uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &Token {
        &self.tokens[rng.gen_range(0..self.tokens.len())]
    }
}

/// Masked description/body token pair with its prediction targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedTokens {
    /// Description tokens after substitution
    pub description: Vec<Token>,
    /// Body tokens after substitution
    pub body: Vec<Token>,
    /// Selected positions in the framed sequence, ascending
    pub masked_positions: Vec<usize>,
    /// Original token at each selected position
    pub masked_labels: Vec<Token>,
}

/// Builds masked-LM instances against a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct Masker<'v> {
    config: MaskingConfig,
    vocabulary: &'v Vocabulary,
}

impl<'v> Masker<'v> {
    /// Create a masker, rejecting an out-of-range mask ratio
    pub fn new(config: MaskingConfig, vocabulary: &'v Vocabulary) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, vocabulary })
    }

    /// Number of positions to predict for a framed sequence of `framed_len`
    ///
    /// Rounds half to even and never returns less than one.
    pub fn num_to_predict(&self, framed_len: usize) -> usize {
        let scaled = (framed_len as f64 * self.config.mask_ratio).round_ties_even();
        (scaled as usize).max(1)
    }

    /// Mask a packed training instance
    pub fn mask_instance<R: Rng + ?Sized>(
        &self,
        instance: &TrainingInstance,
        rng: &mut R,
    ) -> MaskedInstance {
        let masked = self.mask(&instance.description, &instance.body, rng);
        MaskedInstance {
            id: instance.id.clone(),
            description: masked.description,
            body: masked.body,
            masked_positions: masked.masked_positions,
            masked_labels: masked.masked_labels,
            num_tokens: instance.num_tokens,
        }
    }

    /// Select and substitute positions of a description/body pair
    ///
    /// Framing markers are never selected. When no other position exists
    /// the result carries no masked positions.
    pub fn mask<R: Rng + ?Sized>(
        &self,
        description: &[Token],
        body: &[Token],
        rng: &mut R,
    ) -> MaskedTokens {
        let tokens = frame(description, body);
        let body_offset = if description.is_empty() {
            1
        } else {
            description.len() + 2
        };

        let mut candidates: Vec<usize> = (1..=description.len())
            .chain(body_offset..body_offset + body.len())
            .collect();
        candidates.shuffle(rng);

        let num_to_predict = self.num_to_predict(tokens.len());
        let mut output = tokens.clone();
        let mut labels: Vec<(usize, Token)> = Vec::with_capacity(num_to_predict);

        for index in candidates {
            if labels.len() >= num_to_predict {
                break;
            }

            output[index] = if rng.gen_bool(0.8) {
                MASK.to_string()
            } else if rng.gen_bool(0.5) {
                tokens[index].clone()
            } else {
                self.vocabulary.sample(rng).clone()
            };
            labels.push((index, tokens[index].clone()));
        }

        labels.sort_unstable_by_key(|(index, _)| *index);
        let (masked_positions, masked_labels) = labels.into_iter().unzip();

        let body_range = body_offset..body_offset + body.len();
        MaskedTokens {
            description: output[1..1 + description.len()].to_vec(),
            body: output[body_range].to_vec(),
            masked_positions,
            masked_labels,
        }
    }
}
