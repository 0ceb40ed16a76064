use crate::error::{DtError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How records from the two sides are matched into pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingMode {
    /// i-th record of one side with the i-th record of the other.
    Order,
    /// Match on the numeric sequence key shared by both sides.
    Key,
}

/// Tuning surface for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pairing: PairingMode,
    /// Estimated-Jaccard cutoff for near-duplicate removal.
    pub similarity_threshold: f64,
    /// MinHash signature width (components per signature).
    pub num_perm: usize,
    /// Character cap on duplicate-group text previews.
    pub preview_len: usize,
    /// How long the barrier waits for straggling collectors before the
    /// run fails as incomplete.
    pub collect_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pairing: PairingMode::Order,
            similarity_threshold: 0.70,
            num_perm: 128,
            preview_len: 100,
            collect_timeout: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Reject out-of-range knobs before any record is processed.
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold < 1.0) {
            return Err(DtError::InvalidThreshold(self.similarity_threshold));
        }
        if self.num_perm == 0 {
            return Err(DtError::InvalidSignatureWidth(self.num_perm));
        }
        Ok(())
    }
}
