//! Near-duplicate resolution over the exact-pass survivors.

use crate::lsh::LshIndex;
use crate::minhash::signatures;
use dt_core::{DuplicateGroup, Result};
use tracing::{debug, info};

/// Result of the near pass. Indices are in the caller's frame.
#[derive(Debug)]
pub struct NearOutcome {
    pub kept: Vec<usize>,
    pub groups: Vec<DuplicateGroup>,
    pub removed: usize,
}

/// Collapse near-duplicates onto their earliest member.
///
/// `docs` pairs each survivor's original index with its normalized
/// text, in ascending index order. Every signature is inserted first;
/// the walk then removes, for each still-kept record, all later
/// candidates whose estimated similarity reaches `threshold`. The
/// earliest index in a cluster is always the one kept; later members
/// are each similar to it but not necessarily to one another.
pub fn detect(
    docs: &[(usize, &str)],
    threshold: f64,
    num_perm: usize,
    preview_len: usize,
) -> Result<NearOutcome> {
    let texts: Vec<&str> = docs.iter().map(|&(_, text)| text).collect();
    let sigs = signatures(&texts, num_perm);

    let mut index = LshIndex::new(threshold, num_perm)?;
    for (pos, sig) in sigs.iter().enumerate() {
        index.insert(pos, sig);
    }
    debug!(
        bands = index.params().bands,
        rows = index.params().rows,
        records = docs.len(),
        "lsh index built"
    );

    let mut removed_at = vec![false; docs.len()];
    let mut kept = Vec::new();
    let mut groups = Vec::new();
    let mut removed = 0usize;

    for (pos, &(original, text)) in docs.iter().enumerate() {
        if removed_at[pos] {
            continue;
        }
        let mut members = Vec::new();
        for candidate in index.query(&sigs[pos]) {
            if candidate <= pos || removed_at[candidate] {
                continue;
            }
            if sigs[pos].estimate_similarity(&sigs[candidate]) < threshold {
                continue;
            }
            removed_at[candidate] = true;
            removed += 1;
            members.push(docs[candidate].0);
        }
        if !members.is_empty() {
            groups.push(DuplicateGroup {
                kept_index: original,
                removed_indices: members,
                text_preview: preview(text, preview_len),
            });
        }
        kept.push(original);
    }

    info!(kept = kept.len(), removed, groups = groups.len(), "near-duplicate pass complete");
    Ok(NearOutcome { kept, groups, removed })
}

/// First `max_chars` characters, respecting char boundaries.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
