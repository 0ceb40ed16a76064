//! Two-stage deduplication: exact fingerprints, then MinHash/LSH.
//!
//! The exact pass is cheap and removes most redundancy; the near pass
//! runs on its survivors and finds approximate duplicates without full
//! pairwise comparison, via banded locality-sensitive hashing.

pub mod detector;
pub mod fingerprint;
pub mod lsh;
pub mod minhash;

pub use detector::{detect, NearOutcome};
pub use fingerprint::{dedupe_exact, fingerprint, ExactOutcome, FingerprintIndex};
pub use lsh::{LshIndex, LshParams};
pub use minhash::{signatures, token_hashes, MinHashSignature};
