//! Artifact output. All-or-nothing per run.

use crate::pipeline::RunOutput;
use dt_core::{DtError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Where a run's artifacts landed.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub corpus: PathBuf,
    pub report: PathBuf,
}

/// Write the paired corpus and the duplicate report under `dir`.
///
/// Both artifacts are fully serialized and staged into temp files in
/// the target directory before either final name appears, so a failed
/// run never leaves a partially written file behind.
pub fn write_artifacts(dir: &Path, output: &RunOutput) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir)?;

    let corpus_json = serde_json::to_vec_pretty(&output.pairs)?;
    let report_json = serde_json::to_vec_pretty(&output.report)?;

    let corpus_tmp = NamedTempFile::new_in(dir)?;
    fs::write(corpus_tmp.path(), &corpus_json)?;
    let report_tmp = NamedTempFile::new_in(dir)?;
    fs::write(report_tmp.path(), &report_json)?;

    let corpus = dir.join("paired_corpus.json");
    let report = dir.join("duplicate_report.json");
    corpus_tmp.persist(&corpus).map_err(|e| DtError::Io(e.error))?;
    report_tmp.persist(&report).map_err(|e| DtError::Io(e.error))?;

    info!(corpus = %corpus.display(), report = %report.display(), "artifacts written");
    Ok(ArtifactPaths { corpus, report })
}
