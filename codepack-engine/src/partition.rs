//! Per-partition packing
//!
//! A partition is a contiguous slice of documents packed with its own
//! generator, seeded from the base seed plus the partition index. This keeps
//! every partition reproducible regardless of which worker runs it.

use codepack_core::masking::Masker;
use codepack_core::{CodePair, DocumentPacker, MaskedInstance, TrainingInstance};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A packed instance, masked or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    /// Instance produced with masking disabled
    Plain(TrainingInstance),
    /// Instance produced with masking enabled
    Masked(MaskedInstance),
}

impl Instance {
    /// Identifier of the source document
    pub fn id(&self) -> &str {
        match self {
            Instance::Plain(instance) => &instance.id,
            Instance::Masked(instance) => &instance.id,
        }
    }

    /// Framed length including markers
    pub fn num_tokens(&self) -> usize {
        match self {
            Instance::Plain(instance) => instance.num_tokens,
            Instance::Masked(instance) => instance.num_tokens,
        }
    }

    /// Space-joined description tokens
    pub fn description_text(&self) -> String {
        match self {
            Instance::Plain(instance) => instance.description_text(),
            Instance::Masked(instance) => instance.description_text(),
        }
    }

    /// Space-joined body tokens
    pub fn body_text(&self) -> String {
        match self {
            Instance::Plain(instance) => instance.body_text(),
            Instance::Masked(instance) => instance.body_text(),
        }
    }

    /// The masked variant, if any
    pub fn as_masked(&self) -> Option<&MaskedInstance> {
        match self {
            Instance::Masked(instance) => Some(instance),
            Instance::Plain(_) => None,
        }
    }
}

/// Generator for partition `index`
pub fn partition_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index as u64))
}

/// A contiguous run of documents packed together
#[derive(Debug, Clone, Copy)]
pub struct PartitionJob<'a> {
    /// Position of the partition in the corpus
    pub index: usize,
    /// Documents of the partition
    pub pairs: &'a [CodePair],
}

/// Split `pairs` into jobs of at most `partition_size` documents
pub fn partition(pairs: &[CodePair], partition_size: usize) -> Vec<PartitionJob<'_>> {
    pairs
        .chunks(partition_size.max(1))
        .enumerate()
        .map(|(index, pairs)| PartitionJob { index, pairs })
        .collect()
}

/// Result of packing one partition
#[derive(Debug, Clone, Default)]
pub struct PartitionOutput {
    /// Position of the partition in the corpus
    pub index: usize,
    /// Shuffled instances of the partition
    pub instances: Vec<Instance>,
    /// Packing attempts skipped because the description left no body room
    pub skipped_documents: usize,
}

/// Packs whole partitions: repetition, packing, masking and shuffling
#[derive(Debug, Clone)]
pub struct PartitionPacker<'v> {
    packer: DocumentPacker,
    masker: Option<Masker<'v>>,
    duplicate_factor: usize,
    seed: u64,
}

impl<'v> PartitionPacker<'v> {
    /// Create a partition packer
    pub fn new(
        packer: DocumentPacker,
        masker: Option<Masker<'v>>,
        duplicate_factor: usize,
        seed: u64,
    ) -> Self {
        Self {
            packer,
            masker,
            duplicate_factor,
            seed,
        }
    }

    /// Pack one partition
    ///
    /// Every repetition walks the documents in order; the concatenated
    /// instances are shuffled once with the partition's generator.
    pub fn pack(&self, job: &PartitionJob<'_>) -> PartitionOutput {
        let mut rng = partition_rng(self.seed, job.index);
        let mut instances = Vec::new();
        let mut skipped_documents = 0;

        for _ in 0..self.duplicate_factor {
            for pair in job.pairs {
                match self.packer.pack(pair, &mut rng) {
                    Ok(packed) => {
                        trace!("Document {} produced {} instances", pair.id(), packed.len());
                        instances.extend(packed.into_iter().map(|instance| match &self.masker {
                            Some(masker) => {
                                Instance::Masked(masker.mask_instance(&instance, &mut rng))
                            }
                            None => Instance::Plain(instance),
                        }));
                    }
                    Err(e) => {
                        warn!("Skipping document: {}", e);
                        skipped_documents += 1;
                    }
                }
            }
        }

        instances.shuffle(&mut rng);
        debug!(
            "Partition {} packed {} documents into {} instances",
            job.index,
            job.pairs.len(),
            instances.len()
        );

        PartitionOutput {
            index: job.index,
            instances,
            skipped_documents,
        }
    }
}
