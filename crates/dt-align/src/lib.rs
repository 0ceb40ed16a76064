//! Alignment: canonical text form, cross-source pairing, manual merge.

pub mod merge;
pub mod normalize;
pub mod pairing;

pub use merge::merge_records;
pub use normalize::{normalize, normalize_glyphs};
pub use pairing::{pair, parse_key, PairOutcome};
