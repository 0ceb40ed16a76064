use crate::registry::CollectorHandle;
use async_trait::async_trait;
use dt_core::{ChapterRecord, Language, Result};

/// Capability interface for one chapter source.
///
/// One implementation per site, selected by configuration. The engine
/// only ever sees the records a source appends; how they were fetched
/// and extracted is the implementation's business.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    /// Stable identifier labeling this source's buffer.
    fn source_id(&self) -> &str;

    /// Which side of the pair this source feeds.
    fn language(&self) -> Language;

    /// Produce records into the sink, in scrape order.
    async fn collect(&self, sink: CollectorHandle) -> Result<()>;
}

/// Replays pre-extracted records from memory.
///
/// Stands in for the real extraction adapters in tests and batch
/// re-runs over already-fetched data.
pub struct StaticSource {
    source_id: String,
    language: Language,
    records: Vec<ChapterRecord>,
}

impl StaticSource {
    pub fn new(
        source_id: impl Into<String>,
        language: Language,
        records: Vec<ChapterRecord>,
    ) -> Self {
        Self { source_id: source_id.into(), language, records }
    }
}

#[async_trait]
impl ChapterSource for StaticSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn language(&self) -> Language {
        self.language
    }

    async fn collect(&self, sink: CollectorHandle) -> Result<()> {
        for record in &self.records {
            sink.append(record.clone()).await;
        }
        Ok(())
    }
}
