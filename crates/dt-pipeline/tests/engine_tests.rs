use async_trait::async_trait;
use dt_collect::{ChapterSource, CollectorHandle, StaticSource};
use dt_core::{ChapterRecord, DtError, EngineConfig, Language, PairingMode};
use dt_pipeline::{write_artifacts, Engine};
use std::time::Duration;

const BASE_VOCAB: &str = "the regressor opened his eyes on the first day of the tutorial \
and counted every death he remembered from the previous loop before choosing a weapon";

fn variant(extra: &str) -> String {
    format!("{BASE_VOCAB} {extra}")
}

fn primary(content: &str) -> ChapterRecord {
    ChapterRecord::new("booktoki", Language::Primary, content)
}

fn secondary(content: &str) -> ChapterRecord {
    ChapterRecord::new("novelfire", Language::Secondary, content)
}

fn sources_from(
    primary_records: Vec<ChapterRecord>,
    secondary_records: Vec<ChapterRecord>,
) -> Vec<Box<dyn ChapterSource>> {
    vec![
        Box::new(StaticSource::new("booktoki", Language::Primary, primary_records)),
        Box::new(StaticSource::new("novelfire", Language::Secondary, secondary_records)),
    ]
}

fn quick_config(pairing: PairingMode) -> EngineConfig {
    EngineConfig {
        pairing,
        collect_timeout: Duration::from_secs(5),
        ..EngineConfig::default()
    }
}

struct StallingSource;

#[async_trait]
impl ChapterSource for StallingSource {
    fn source_id(&self) -> &str {
        "stalled"
    }

    fn language(&self) -> Language {
        Language::Secondary
    }

    async fn collect(&self, _sink: CollectorHandle) -> dt_core::Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

struct FailingSource;

#[async_trait]
impl ChapterSource for FailingSource {
    fn source_id(&self) -> &str {
        "broken"
    }

    fn language(&self) -> Language {
        Language::Secondary
    }

    async fn collect(&self, _sink: CollectorHandle) -> dt_core::Result<()> {
        Err(DtError::Collector("extraction returned no content".into()))
    }
}

// ========== Order mode end to end ==========

#[tokio::test]
async fn test_order_mode_run_with_exact_duplicates() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine
        .run(sources_from(
            vec![
                primary("Hello  world"),
                primary("Hello world"),
                primary("a completely different third chapter"),
                primary("extra chapter with no counterpart"),
            ],
            vec![
                secondary("hola mundo"),
                secondary("hola mundo otra vez"),
                secondary("otro capitulo distinto"),
            ],
        ))
        .await
        .unwrap();

    // Three pairs; the fourth primary record has no counterpart.
    assert_eq!(output.report.pairing.pair_count, 3);
    assert_eq!(output.report.pairing.unmatched_primary, vec![3]);
    assert!(output.report.pairing.unmatched_secondary.is_empty());

    // A whitespace-only difference is an exact duplicate.
    assert_eq!(output.report.summary.exact_removed, 1);
    assert_eq!(output.report.exact_duplicate_indices, vec![1]);
    assert_eq!(output.report.summary.near_removed, 0);
    assert_eq!(output.pairs.len(), 2);
    assert!(output.report.is_consistent());

    // The surviving pair keeps its raw content and its partner.
    assert_eq!(output.pairs[0].primary.content, "Hello  world");
    assert_eq!(output.pairs[0].secondary.content, "hola mundo");
}

#[tokio::test]
async fn test_pass_through_metadata_untouched() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine
        .run(sources_from(
            vec![primary("chapter text").with_title("1장").with_url("https://ko/1")],
            vec![secondary("translated text").with_title("Chapter 1")],
        ))
        .await
        .unwrap();

    let pair = &output.pairs[0];
    assert_eq!(pair.primary.title.as_deref(), Some("1장"));
    assert_eq!(pair.primary.url.as_deref(), Some("https://ko/1"));
    assert_eq!(pair.secondary.title.as_deref(), Some("Chapter 1"));
    assert_eq!(pair.primary.arrival_order, 0);
}

// ========== Key mode end to end ==========

#[tokio::test]
async fn test_key_mode_run_pairs_intersection() {
    let engine = Engine::new(quick_config(PairingMode::Key)).unwrap();
    let output = engine
        .run(sources_from(
            vec![
                primary("ko one").with_sequence_key("1"),
                primary("ko two").with_sequence_key("2"),
                primary("ko four").with_sequence_key("4"),
            ],
            vec![
                secondary("en one").with_sequence_key("1"),
                secondary("en three").with_sequence_key("3"),
                secondary("en four").with_sequence_key("4"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(output.pairs.len(), 2);
    assert_eq!(output.pairs[0].primary.content, "ko one");
    assert_eq!(output.pairs[1].primary.content, "ko four");
    assert_eq!(output.report.pairing.unmatched_primary, vec![1]);
    assert_eq!(output.report.pairing.unmatched_secondary, vec![1]);
}

#[tokio::test]
async fn test_key_mode_skips_unusable_keys() {
    let engine = Engine::new(quick_config(PairingMode::Key)).unwrap();
    let output = engine
        .run(sources_from(
            vec![
                primary("good").with_sequence_key("1"),
                primary("no key at all"),
            ],
            vec![secondary("good en").with_sequence_key("1")],
        ))
        .await
        .unwrap();

    assert_eq!(output.pairs.len(), 1);
    assert_eq!(output.report.pairing.skipped_primary, vec![1]);
}

// ========== Near duplicates end to end ==========

#[tokio::test]
async fn test_near_duplicates_collapse_to_one_group() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine
        .run(sources_from(
            vec![
                primary(&variant("sword")),
                primary(&variant("spear")),
                primary(&variant("shield")),
                primary("an entirely unrelated epilogue about farming"),
            ],
            vec![
                secondary("en 1"),
                secondary("en 2"),
                secondary("en 3"),
                secondary("en 4"),
            ],
        ))
        .await
        .unwrap();

    // All three near-identical chapters collapse onto the smallest index.
    assert_eq!(output.report.summary.near_removed, 2);
    assert_eq!(output.report.duplicate_groups.len(), 1);
    let group = &output.report.duplicate_groups[0];
    assert_eq!(group.kept_index, 0);
    assert_eq!(group.removed_indices, vec![1, 2]);
    assert!(group.text_preview.chars().count() <= 100);

    assert_eq!(output.pairs.len(), 2);
    assert_eq!(output.pairs[1].primary.content, "an entirely unrelated epilogue about farming");
    assert!(output.report.is_consistent());
}

// ========== Structural failures ==========

#[tokio::test(start_paused = true)]
async fn test_stalled_collector_fails_run() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let sources: Vec<Box<dyn ChapterSource>> = vec![
        Box::new(StaticSource::new("booktoki", Language::Primary, vec![primary("ko")])),
        Box::new(StallingSource),
    ];
    let err = engine.run(sources).await.unwrap_err();
    match err {
        DtError::IncompleteCollection { done, expected } => {
            assert_eq!(done, 1);
            assert_eq!(expected, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_collector_surfaces_its_error() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let sources: Vec<Box<dyn ChapterSource>> = vec![
        Box::new(StaticSource::new("booktoki", Language::Primary, vec![primary("ko")])),
        Box::new(FailingSource),
    ];
    let err = engine.run(sources).await.unwrap_err();
    match err {
        DtError::Collector(message) => assert!(message.contains("no content")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_invalid_config_rejected_up_front() {
    let config = EngineConfig {
        similarity_threshold: 1.0,
        ..EngineConfig::default()
    };
    assert!(matches!(Engine::new(config), Err(DtError::InvalidThreshold(_))));
}

#[tokio::test]
async fn test_no_sources_yields_empty_run() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine.run(Vec::new()).await.unwrap();
    assert!(output.pairs.is_empty());
    assert_eq!(output.report.summary.total_initial, 0);
    assert!(output.report.is_consistent());
}

#[tokio::test]
async fn test_empty_contents_are_stable_duplicates() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine
        .run(sources_from(
            vec![primary(""), primary("   \n  "), primary("real content here")],
            vec![secondary("a"), secondary("b"), secondary("c")],
        ))
        .await
        .unwrap();

    // Both normalize to the empty string; the second pair is an exact dup.
    assert_eq!(output.report.summary.exact_removed, 1);
    assert_eq!(output.report.exact_duplicate_indices, vec![1]);
    assert_eq!(output.pairs.len(), 2);
}

// ========== Artifacts ==========

#[tokio::test]
async fn test_artifacts_written_and_parseable() {
    let engine = Engine::new(quick_config(PairingMode::Order)).unwrap();
    let output = engine
        .run(sources_from(
            vec![primary("ko one"), primary("ko two")],
            vec![secondary("en one"), secondary("en two")],
        ))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path(), &output).unwrap();

    let corpus: Vec<dt_core::PairedRecord> =
        serde_json::from_str(&std::fs::read_to_string(&paths.corpus).unwrap()).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0].primary.content, "ko one");

    let report: dt_core::RunReport =
        serde_json::from_str(&std::fs::read_to_string(&paths.report).unwrap()).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.summary.final_size, 2);

    // No stray temp files left in the output directory.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 2);
}
