use crate::config::PairingMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate counts for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Pairs entering the dedup stages.
    pub total_initial: usize,
    pub exact_removed: usize,
    pub near_removed: usize,
    pub total_removed: usize,
    pub final_size: usize,
    pub similarity_threshold: f64,
}

/// One cluster of near-duplicates, collapsed onto its earliest member.
///
/// Removed members are each similar to the kept record; they are not
/// guaranteed to be mutually similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub kept_index: usize,
    pub removed_indices: Vec<usize>,
    /// Capped excerpt of the kept record, for audit.
    pub text_preview: String,
}

/// Pairing outcome detail for operator review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingReport {
    pub mode: PairingMode,
    pub pair_count: usize,
    /// Indices that found no counterpart, per side.
    pub unmatched_primary: Vec<usize>,
    pub unmatched_secondary: Vec<usize>,
    /// Indices skipped in key mode for an absent or garbled key.
    pub skipped_primary: Vec<usize>,
    pub skipped_secondary: Vec<usize>,
}

/// Machine-readable report emitted next to the paired corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: ReportSummary,
    /// Positions in the paired sequence dropped by the exact pass.
    pub exact_duplicate_indices: Vec<usize>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub pairing: PairingReport,
    pub generated_at: DateTime<Utc>,
}

impl RunReport {
    /// Counts reconcile: everything initial is either kept or removed.
    pub fn is_consistent(&self) -> bool {
        let s = &self.summary;
        s.total_initial == s.final_size + s.exact_removed + s.near_removed
            && s.total_removed == s.exact_removed + s.near_removed
            && s.exact_removed == self.exact_duplicate_indices.len()
            && s.near_removed
                == self
                    .duplicate_groups
                    .iter()
                    .map(|g| g.removed_indices.len())
                    .sum::<usize>()
    }
}
