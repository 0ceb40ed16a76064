//! One-shot pipeline: barrier, pairing, two dedup passes, report.

use chrono::Utc;
use std::collections::HashSet;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use dt_align::normalize;
use dt_align::pairing::{self, PairOutcome};
use dt_collect::{ChapterSource, CollectionRegistry, SourceBuffer};
use dt_core::{
    ChapterRecord, DtError, EngineConfig, Language, PairedRecord, PairingReport, ReportSummary,
    Result, RunReport,
};
use dt_dedup::{dedupe_exact, detect};

/// Finished run: the deduplicated corpus plus its audit report.
#[derive(Debug)]
pub struct RunOutput {
    pub run_id: String,
    pub pairs: Vec<PairedRecord>,
    pub report: RunReport,
}

/// The pairing/dedup engine. Configured once; each `run` starts from
/// empty indexes and recomputes everything.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Rejects a bad configuration before any record is processed.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline over the given sources.
    ///
    /// Either returns the complete output triad or fails with a single
    /// structural error; per-record issues are recovered and counted in
    /// the report.
    pub async fn run(&self, sources: Vec<Box<dyn ChapterSource>>) -> Result<RunOutput> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, sources = sources.len(), "run starting");

        let buffers = self.collect(sources).await?;
        let (primary, secondary) = split_by_language(buffers);
        info!(primary = primary.len(), secondary = secondary.len(), "collection complete");

        let outcome = pairing::pair(primary, secondary, self.config.pairing);
        if !outcome.unmatched_primary.is_empty() {
            warn!(indices = ?outcome.unmatched_primary, "unpaired primary records");
        }
        if !outcome.unmatched_secondary.is_empty() {
            warn!(indices = ?outcome.unmatched_secondary, "unpaired secondary records");
        }

        let (pairs, report) = self.dedup(outcome)?;
        info!(
            run_id = %run_id,
            pairs = report.summary.total_initial,
            exact_removed = report.summary.exact_removed,
            near_removed = report.summary.near_removed,
            final_size = report.summary.final_size,
            "run complete"
        );
        Ok(RunOutput { run_id, pairs, report })
    }

    /// Spawn one task per source and block on the barrier.
    async fn collect(&self, sources: Vec<Box<dyn ChapterSource>>) -> Result<Vec<SourceBuffer>> {
        let registry = CollectionRegistry::new(sources.len());
        let mut tasks: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(sources.len());

        for source in sources {
            let handle = registry.handle(source.source_id(), source.language()).await;
            tasks.push(tokio::spawn(async move {
                let source_id = source.source_id().to_string();
                match source.collect(handle.clone()).await {
                    Ok(()) => {
                        handle.signal_done().await;
                        Ok(())
                    }
                    Err(err) => {
                        // No completion signal: the barrier times the run out.
                        warn!(source = %source_id, error = %err, "collector failed");
                        Err(err)
                    }
                }
            }));
        }

        match registry.await_all(self.config.collect_timeout).await {
            Ok(buffers) => Ok(buffers),
            Err(barrier_err) => {
                // Prefer the concrete collector failure when one already
                // surfaced; otherwise report the incomplete collection.
                for task in tasks {
                    if task.is_finished() {
                        if let Ok(Err(err)) = task.await {
                            return Err(DtError::Collector(err.to_string()));
                        }
                    } else {
                        task.abort();
                    }
                }
                Err(barrier_err)
            }
        }
    }

    /// Exact pass, then near pass, over the pairs' primary-side text.
    fn dedup(&self, outcome: PairOutcome) -> Result<(Vec<PairedRecord>, RunReport)> {
        let PairOutcome {
            pairs,
            unmatched_primary,
            unmatched_secondary,
            skipped_primary,
            skipped_secondary,
        } = outcome;
        let total_initial = pairs.len();

        let normalized: Vec<String> =
            pairs.iter().map(|p| normalize(p.dedup_text())).collect();

        let exact = dedupe_exact(&normalized);
        info!(removed = exact.removed.len(), "exact pass complete");

        let survivors: Vec<(usize, &str)> = exact
            .kept
            .iter()
            .map(|&i| (i, normalized[i].as_str()))
            .collect();
        let near = detect(
            &survivors,
            self.config.similarity_threshold,
            self.config.num_perm,
            self.config.preview_len,
        )?;

        let kept: HashSet<usize> = near.kept.iter().copied().collect();
        let final_pairs: Vec<PairedRecord> = pairs
            .into_iter()
            .enumerate()
            .filter(|(i, _)| kept.contains(i))
            .map(|(_, p)| p)
            .collect();

        let report = RunReport {
            summary: ReportSummary {
                total_initial,
                exact_removed: exact.removed.len(),
                near_removed: near.removed,
                total_removed: exact.removed.len() + near.removed,
                final_size: final_pairs.len(),
                similarity_threshold: self.config.similarity_threshold,
            },
            exact_duplicate_indices: exact.removed,
            duplicate_groups: near.groups,
            pairing: PairingReport {
                mode: self.config.pairing,
                pair_count: total_initial,
                unmatched_primary,
                unmatched_secondary,
                skipped_primary,
                skipped_secondary,
            },
            generated_at: Utc::now(),
        };
        Ok((final_pairs, report))
    }
}

/// Concatenate the per-source buffers into one sequence per side,
/// preserving registration order across sources and arrival order
/// within each.
fn split_by_language(buffers: Vec<SourceBuffer>) -> (Vec<ChapterRecord>, Vec<ChapterRecord>) {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for buffer in buffers {
        match buffer.language {
            Language::Primary => primary.extend(buffer.records),
            Language::Secondary => secondary.extend(buffer.records),
        }
    }
    (primary, secondary)
}
