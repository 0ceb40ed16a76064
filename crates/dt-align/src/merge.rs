//! Operator-selected grouping of several records into one unit.

use crate::normalize::normalize;
use dt_core::ChapterRecord;

/// Collapse an ordered selection into one synthetic record.
///
/// Contents are normalized and joined with a blank line; the sequence
/// key becomes a range label spanning the first and last member. The
/// result is a display/export convenience and never re-enters dedup.
pub fn merge_records(records: &[ChapterRecord]) -> Option<ChapterRecord> {
    let (first, rest) = records.split_first()?;
    if rest.is_empty() {
        return Some(first.clone());
    }

    let mut merged = first.clone();
    merged.content = records
        .iter()
        .map(|r| normalize(&r.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let first_key = first.sequence_key.as_deref().unwrap_or("?");
    let last_key = rest
        .last()
        .and_then(|r| r.sequence_key.as_deref())
        .unwrap_or("?");
    merged.sequence_key = Some(format!("{first_key} - {last_key}"));

    Some(merged)
}
