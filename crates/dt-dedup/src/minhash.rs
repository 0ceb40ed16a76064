//! Word-token MinHash signatures for fast Jaccard estimation.

use rayon::prelude::*;
use std::collections::HashSet;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// Lowercase word tokens of a normalized text, as a hashed set.
///
/// Tokens are maximal alphanumeric runs; order and multiplicity are
/// deliberately discarded.
pub fn token_hashes(text: &str) -> HashSet<u64> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| xxh3_64(token.as_bytes()))
        .collect()
}

/// Fixed-width MinHash summary of a token set.
///
/// The fraction of matching components between two signatures
/// estimates the Jaccard similarity of their source token sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHashSignature {
    values: Vec<u64>,
}

impl MinHashSignature {
    /// Simulate `num_perm` independent permutations via seeded
    /// re-hashing and keep each minimum. An empty token set yields an
    /// all-max signature, so empty texts match each other exactly.
    pub fn compute(tokens: &HashSet<u64>, num_perm: usize) -> Self {
        let values = (0..num_perm as u64)
            .map(|seed| {
                tokens
                    .iter()
                    .map(|&token| xxh3_64_with_seed(&token.to_le_bytes(), seed))
                    .min()
                    .unwrap_or(u64::MAX)
            })
            .collect();
        Self { values }
    }

    /// Tokenize, then compute.
    pub fn of_text(text: &str, num_perm: usize) -> Self {
        Self::compute(&token_hashes(text), num_perm)
    }

    pub fn num_perm(&self) -> usize {
        self.values.len()
    }

    /// One band's worth of components.
    pub fn band(&self, start: usize, end: usize) -> &[u64] {
        &self.values[start..end]
    }

    /// Fraction of matching components.
    pub fn estimate_similarity(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.values.len(), other.values.len());
        if self.values.is_empty() {
            return 0.0;
        }
        let matching = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();
        matching as f64 / self.values.len() as f64
    }
}

/// Batch signature computation. Each record is independent, so the
/// work shards freely across workers.
pub fn signatures<S: AsRef<str> + Sync>(texts: &[S], num_perm: usize) -> Vec<MinHashSignature> {
    texts
        .par_iter()
        .map(|text| MinHashSignature::of_text(text.as_ref(), num_perm))
        .collect()
}
