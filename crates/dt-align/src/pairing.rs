//! Cross-source pairing: positional or key-based.

use dt_core::{ChapterRecord, PairedRecord, PairingMode};
use ordered_float::NotNan;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Pairing result plus the leftovers each side could not match.
///
/// All index lists refer to positions in the input sequences.
#[derive(Debug, Default)]
pub struct PairOutcome {
    pub pairs: Vec<PairedRecord>,
    pub unmatched_primary: Vec<usize>,
    pub unmatched_secondary: Vec<usize>,
    /// Key mode only: records with an absent or garbled key.
    pub skipped_primary: Vec<usize>,
    pub skipped_secondary: Vec<usize>,
}

/// Match two ordered record sequences under the given mode.
///
/// An empty side is not an error: zero pairs, the other side fully
/// unmatched.
pub fn pair(
    primary: Vec<ChapterRecord>,
    secondary: Vec<ChapterRecord>,
    mode: PairingMode,
) -> PairOutcome {
    match mode {
        PairingMode::Order => pair_by_order(primary, secondary),
        PairingMode::Key => pair_by_key(primary, secondary),
    }
}

/// i-th with i-th; the longer side's tail is unmatched.
fn pair_by_order(primary: Vec<ChapterRecord>, secondary: Vec<ChapterRecord>) -> PairOutcome {
    let matched = primary.len().min(secondary.len());
    let unmatched_primary = (matched..primary.len()).collect();
    let unmatched_secondary = (matched..secondary.len()).collect();
    let pairs = primary
        .into_iter()
        .zip(secondary)
        .map(|(p, s)| PairedRecord::new(p, s))
        .collect();
    PairOutcome {
        pairs,
        unmatched_primary,
        unmatched_secondary,
        ..PairOutcome::default()
    }
}

/// Pair the sorted intersection of both sides' keys, ascending.
fn pair_by_key(primary: Vec<ChapterRecord>, secondary: Vec<ChapterRecord>) -> PairOutcome {
    let (map_p, skipped_primary) = key_map(&primary, "primary");
    let (map_s, skipped_secondary) = key_map(&secondary, "secondary");

    let mut shared: Vec<NotNan<f64>> =
        map_p.keys().filter(|k| map_s.contains_key(*k)).copied().collect();
    shared.sort_unstable();

    let pairs: Vec<PairedRecord> = shared
        .iter()
        .map(|k| PairedRecord::new(primary[map_p[k]].clone(), secondary[map_s[k]].clone()))
        .collect();

    let unmatched_primary = leftover_indices(primary.len(), &shared, &map_p, &skipped_primary);
    let unmatched_secondary = leftover_indices(secondary.len(), &shared, &map_s, &skipped_secondary);

    PairOutcome {
        pairs,
        unmatched_primary,
        unmatched_secondary,
        skipped_primary,
        skipped_secondary,
    }
}

/// Numeric view of a record's sequence key, when it has a usable one.
pub fn parse_key(record: &ChapterRecord) -> Option<NotNan<f64>> {
    let raw = record.sequence_key.as_deref()?.trim();
    let value: f64 = raw.parse().ok()?;
    NotNan::new(value).ok()
}

/// key → index, last-write-wins on duplicates.
fn key_map(
    records: &[ChapterRecord],
    side: &str,
) -> (HashMap<NotNan<f64>, usize>, Vec<usize>) {
    let mut map = HashMap::new();
    let mut skipped = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match parse_key(record) {
            Some(key) => {
                if let Some(prev) = map.insert(key, idx) {
                    warn!(side, key = %key, prev, idx, "duplicate sequence key, keeping the later record");
                }
            }
            None => {
                warn!(side, idx, key = ?record.sequence_key, "unusable sequence key, record skipped");
                skipped.push(idx);
            }
        }
    }
    (map, skipped)
}

fn leftover_indices(
    len: usize,
    shared: &[NotNan<f64>],
    map: &HashMap<NotNan<f64>, usize>,
    skipped: &[usize],
) -> Vec<usize> {
    let paired: HashSet<usize> = shared.iter().map(|k| map[k]).collect();
    let skipped: HashSet<usize> = skipped.iter().copied().collect();
    (0..len)
        .filter(|i| !paired.contains(i) && !skipped.contains(i))
        .collect()
}
