use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the bilingual pair a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Primary,
    Secondary,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Primary => write!(f, "primary"),
            Language::Secondary => write!(f, "secondary"),
        }
    }
}

/// One scraped chapter, as handed over by an extraction adapter.
///
/// Immutable once it leaves its collector; normalization always works
/// on a derived copy of `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Identifies the originating collector.
    pub source_id: String,
    pub language: Language,
    /// Comparable key for key-mode pairing (typically the chapter
    /// number); absent when the site does not expose one.
    #[serde(default)]
    pub sequence_key: Option<String>,
    pub content: String,
    /// Position within the originating collector's buffer, stamped at
    /// append time.
    #[serde(default)]
    pub arrival_order: usize,
    // Pass-through metadata. The engine never inspects these.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ChapterRecord {
    pub fn new(
        source_id: impl Into<String>,
        language: Language,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            language,
            sequence_key: None,
            content: content.into(),
            arrival_order: 0,
            title: None,
            url: None,
            timestamp: None,
        }
    }

    pub fn with_sequence_key(mut self, key: impl Into<String>) -> Self {
        self.sequence_key = Some(key.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// One primary-side record matched with one secondary-side record.
///
/// A record appears in at most one pair per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairedRecord {
    pub primary: ChapterRecord,
    pub secondary: ChapterRecord,
}

impl PairedRecord {
    pub fn new(primary: ChapterRecord, secondary: ChapterRecord) -> Self {
        Self { primary, secondary }
    }

    /// The text the dedup stages fingerprint and compare.
    pub fn dedup_text(&self) -> &str {
        &self.primary.content
    }
}
