//! Banded locality-sensitive index over MinHash signatures.

use crate::minhash::MinHashSignature;
use dt_core::{DtError, Result};
use std::collections::HashMap;

/// Band/row split of a signature.
///
/// Two signatures become candidates only when they agree on every
/// component of at least one band, so the split fixes the probability
/// that a pair at a given Jaccard similarity is surfaced at all:
/// `P(candidate) = 1 - (1 - s^rows)^bands`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshParams {
    pub bands: usize,
    pub rows: usize,
}

impl LshParams {
    /// The split minimizing the combined false-positive/false-negative
    /// mass around `threshold`, searched over every split that fits in
    /// `num_perm` components with equal error weights.
    pub fn optimal(threshold: f64, num_perm: usize) -> Result<Self> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(DtError::InvalidThreshold(threshold));
        }
        if num_perm == 0 {
            return Err(DtError::InvalidSignatureWidth(num_perm));
        }

        let mut best_error = f64::MAX;
        let mut best = Self { bands: 1, rows: num_perm };
        for bands in 1..=num_perm {
            let max_rows = num_perm / bands;
            for rows in 1..=max_rows {
                let false_positive =
                    integrate(|s| candidate_probability(s, bands, rows), 0.0, threshold);
                let false_negative =
                    integrate(|s| 1.0 - candidate_probability(s, bands, rows), threshold, 1.0);
                let error = 0.5 * false_positive + 0.5 * false_negative;
                if error < best_error {
                    best_error = error;
                    best = Self { bands, rows };
                }
            }
        }
        Ok(best)
    }

    /// Components actually consulted; at most the signature width.
    pub fn span(&self) -> usize {
        self.bands * self.rows
    }
}

/// Probability that two signatures at Jaccard similarity `s` agree on
/// at least one full band.
fn candidate_probability(s: f64, bands: usize, rows: usize) -> f64 {
    1.0 - (1.0 - s.powi(rows as i32)).powi(bands as i32)
}

fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    const STEP: f64 = 0.001;
    let mut area = 0.0;
    let mut x = a;
    while x < b {
        area += f(x + STEP * 0.5) * STEP;
        x += STEP;
    }
    area
}

/// Buckets signature ids by exact band content.
///
/// Insertion is single-writer by construction (`&mut self`); queries
/// are read-only and may be shared.
#[derive(Debug)]
pub struct LshIndex {
    params: LshParams,
    bands: Vec<HashMap<Vec<u64>, Vec<usize>>>,
}

impl LshIndex {
    /// Index tuned for the given threshold and signature width.
    pub fn new(threshold: f64, num_perm: usize) -> Result<Self> {
        Ok(Self::with_params(LshParams::optimal(threshold, num_perm)?))
    }

    pub fn with_params(params: LshParams) -> Self {
        Self {
            params,
            bands: vec![HashMap::new(); params.bands],
        }
    }

    pub fn params(&self) -> LshParams {
        self.params
    }

    /// Insert a signature under `id`.
    pub fn insert(&mut self, id: usize, signature: &MinHashSignature) {
        debug_assert!(signature.num_perm() >= self.params.span());
        for (band_idx, bucket) in self.bands.iter_mut().enumerate() {
            let start = band_idx * self.params.rows;
            let key = signature.band(start, start + self.params.rows).to_vec();
            bucket.entry(key).or_default().push(id);
        }
    }

    /// Every inserted id sharing at least one identical band with the
    /// query signature, ascending and deduplicated.
    pub fn query(&self, signature: &MinHashSignature) -> Vec<usize> {
        debug_assert!(signature.num_perm() >= self.params.span());
        let mut hits: Vec<usize> = Vec::new();
        for (band_idx, bucket) in self.bands.iter().enumerate() {
            let start = band_idx * self.params.rows;
            let key = signature.band(start, start + self.params.rows);
            if let Some(ids) = bucket.get(key) {
                hits.extend_from_slice(ids);
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}
