//! Exact-duplicate detection over content fingerprints.

use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

/// Stable fingerprint of normalized content.
///
/// Equal normalized content always fingerprints equal; a hash
/// collision between distinct texts is treated as a duplicate.
pub fn fingerprint(normalized: &str) -> u64 {
    xxh3_64(normalized.as_bytes())
}

/// First-seen-wins fingerprint set for one run.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    seen: HashSet<u64>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this fingerprint was recorded before.
    pub fn seen(&self, fp: u64) -> bool {
        self.seen.contains(&fp)
    }

    /// Record a fingerprint as observed.
    pub fn record(&mut self, fp: u64) {
        self.seen.insert(fp);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Outcome of the exact pass, positions in stable input order.
#[derive(Debug)]
pub struct ExactOutcome {
    pub kept: Vec<usize>,
    pub removed: Vec<usize>,
}

/// Drop every record whose normalized content fingerprints identically
/// to an earlier one.
pub fn dedupe_exact<S: AsRef<str>>(normalized: &[S]) -> ExactOutcome {
    let mut index = FingerprintIndex::new();
    let mut kept = Vec::with_capacity(normalized.len());
    let mut removed = Vec::new();
    for (idx, text) in normalized.iter().enumerate() {
        let fp = fingerprint(text.as_ref());
        if index.seen(fp) {
            removed.push(idx);
        } else {
            index.record(fp);
            kept.push(idx);
        }
    }
    ExactOutcome { kept, removed }
}
