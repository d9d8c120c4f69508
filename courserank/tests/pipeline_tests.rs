//! End-to-end tests for the matching pipeline
//!
//! External services are replaced by deterministic stubs: a keyword
//! detector, a dictionary translator that counts its calls, and a
//! bag-of-words encoder over a small fixed vocabulary.

use async_trait::async_trait;
use courserank::ml::{self, EmbeddingBatch, MLError};
use courserank::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const VOCABULARY: &[&str] = &["yoga", "töpfern", "spanisch", "meditation"];

struct KeywordDetector;

impl LanguageDetector for KeywordDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        if ["pottery", "evening", "class"].iter().any(|w| lowered.contains(w)) {
            Some("en".to_string())
        } else if lowered.contains("???") {
            None
        } else {
            Some("de".to_string())
        }
    }
}

#[derive(Default)]
struct DictionaryTranslator {
    calls: AtomicUsize,
}

impl DictionaryTranslator {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for DictionaryTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> ml::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(target, "de");
        if text.contains("broken") {
            return Err(MLError::translation("service unavailable"));
        }
        match (source, text) {
            ("en", "pottery") => Ok("Töpfern".to_string()),
            _ => Ok(text.to_string()),
        }
    }
}

/// Accepts only the source languages a typical translation service supports.
struct StrictTranslator;

#[async_trait]
impl Translator for StrictTranslator {
    async fn translate(&self, text: &str, source: &str, _target: &str) -> ml::Result<String> {
        if ["en", "fr", "es", "it"].contains(&source) {
            Ok(text.to_string())
        } else {
            Err(MLError::translation(format!("{source} is not supported")))
        }
    }
}

struct BagOfWordsEncoder;

fn bag_of_words(text: &str) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let words: BTreeSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    VOCABULARY
        .iter()
        .map(|term| if words.contains(term) { 1.0 } else { 0.0 })
        .chain(std::iter::once(0.1))
        .collect()
}

#[async_trait]
impl Encoder for BagOfWordsEncoder {
    async fn encode(&self, texts: &[String]) -> ml::Result<EmbeddingBatch> {
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }
}

/// Puts the query and every row on orthogonal axes.
struct OrthogonalEncoder;

#[async_trait]
impl Encoder for OrthogonalEncoder {
    async fn encode(&self, texts: &[String]) -> ml::Result<EmbeddingBatch> {
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, _)| if i == 0 { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
            .collect())
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    guid: &str,
    name: &str,
    translated: Option<&str>,
    price: f64,
    enrollment: (u32, u32, u32),
    women: u32,
    groups: &[&str],
    sponsored: bool,
) -> CourseRecord {
    CourseRecord {
        guid: guid.to_string(),
        course_name_german: name.to_string(),
        course_name_translated: translated.map(String::from),
        price_amount: price,
        current_participants: enrollment.0,
        minimum_participants: enrollment.1,
        maximum_participants: enrollment.2,
        women_participants: women,
        target_groups: groups.iter().map(|g| g.to_string()).collect(),
        sponsored,
        ..Default::default()
    }
}

fn catalog() -> Catalog {
    Catalog::from_records(vec![
        record(
            "a",
            "Hatha Yoga für Anfänger",
            Some("Hatha yoga for beginners"),
            100.0,
            (4, 6, 12),
            3,
            &["Frauen"],
            false,
        ),
        record(
            "b",
            "Töpfern am Abend",
            Some("Evening pottery"),
            90.0,
            (2, 4, 8),
            1,
            &[],
            false,
        ),
        record(
            "c",
            "Yoga und Meditation",
            Some("Yoga and meditation"),
            120.0,
            (10, 5, 12),
            9,
            &["Ältere"],
            true,
        ),
        record("d", "Spanisch A1", Some("Spanish A1"), 60.0, (6, 6, 10), 3, &[], false),
        record("e", "Yoga im Park", None, 200.0, (0, 3, 15), 0, &[], false),
    ])
    .expect("catalog fixture is valid")
}

fn config() -> CourseRankConfig {
    ConfigBuilder::testing()
        .build()
        .expect("testing config is valid")
}

fn builder(config: CourseRankConfig) -> CourseMatcherBuilder {
    CourseMatcher::builder(config)
        .with_catalog(catalog())
        .with_language_detector(Arc::new(KeywordDetector))
}

fn request(query: &str) -> MatchRequest {
    MatchRequest::new(query)
        .with_gender("female")
        .with_target_groups(Vec::<String>::new())
}

fn guids(courses: &[RankedCourse]) -> BTreeSet<String> {
    courses.iter().map(|c| c.course.guid.clone()).collect()
}

fn assert_permutation(ranks: impl Iterator<Item = usize>, n: usize) {
    let mut ranks: Vec<usize> = ranks.collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=n).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_match_and_rank_end_to_end() {
    let matcher = builder(config()).build().unwrap();

    let courses = matcher.match_and_rank(&request("Yoga")).await.unwrap();

    assert_eq!(
        guids(&courses),
        ["a", "c", "e"].iter().map(|g| g.to_string()).collect()
    );
    assert_permutation(courses.iter().map(|c| c.consensus_rank), 3);
    assert_permutation(courses.iter().map(|c| c.user_rank), 3);
    assert_permutation(courses.iter().map(|c| c.platform_rank), 3);
    for (i, course) in courses.iter().enumerate() {
        assert_eq!(course.consensus_rank, i + 1);
        assert!((0.0..=1.0).contains(&course.semantic_score));
        assert!(course.price_penalty.is_none());
    }
}

#[tokio::test]
async fn test_report_describes_the_run() {
    let matcher = builder(config()).build().unwrap();
    assert_eq!(matcher.semantic_mode().to_string(), "fuzzy-proxy");

    let report = matcher.run(&request("  Yoga ")).await.unwrap();

    assert_eq!(report.query, "Yoga");
    assert_eq!(report.matched_text, "Yoga");
    assert_eq!(report.language, "de");
    assert!(!report.translated);
    assert_eq!(report.semantic_mode, "fuzzy-proxy");
    assert_eq!(report.strategy, AggregationStrategy::Exact);
    assert!(report.consensus_cost >= 0.0);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let matcher = builder(config()).build().unwrap();
    for query in ["", "   ", "\n\t"] {
        let err = matcher.match_and_rank(&request(query)).await.unwrap_err();
        assert!(matches!(err, CourseRankError::InvalidQuery(_)));
    }
}

#[tokio::test]
async fn test_missing_preferences_fail_before_translation() {
    let translator = Arc::new(DictionaryTranslator::default());
    let matcher = builder(config())
        .with_translator(translator.clone())
        .build()
        .unwrap();

    let no_gender = MatchRequest::new("pottery").with_target_groups(["Children"]);
    let err = matcher.match_and_rank(&no_gender).await.unwrap_err();
    assert!(matches!(err, CourseRankError::MissingPreferences(_)));

    let blank_gender = MatchRequest::new("pottery")
        .with_gender("  ")
        .with_target_groups(["Children"]);
    let err = matcher.match_and_rank(&blank_gender).await.unwrap_err();
    assert!(matches!(err, CourseRankError::MissingPreferences(_)));

    let no_groups = MatchRequest::new("pottery").with_gender("male");
    let err = matcher.match_and_rank(&no_groups).await.unwrap_err();
    assert!(matches!(err, CourseRankError::MissingPreferences(_)));

    assert_eq!(translator.calls(), 0);
}

#[tokio::test]
async fn test_foreign_query_is_translated() {
    let translator = Arc::new(DictionaryTranslator::default());
    let matcher = builder(config())
        .with_translator(translator.clone())
        .build()
        .unwrap();

    let report = matcher.run(&request("pottery")).await.unwrap();

    assert_eq!(translator.calls(), 1);
    assert!(report.translated);
    assert_eq!(report.language, "en");
    assert_eq!(report.matched_text, "Töpfern");
    assert_eq!(report.courses.len(), 1);
    assert_eq!(report.courses[0].course.guid, "b");
    assert_eq!(report.consensus_cost, 0.0);
}

#[tokio::test]
async fn test_translation_failure_surfaces() {
    let translator = Arc::new(DictionaryTranslator::default());
    let matcher = builder(config())
        .with_translator(translator.clone())
        .build()
        .unwrap();

    let err = matcher
        .match_and_rank(&request("broken pottery"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CourseRankError::TranslationFailed { ref source_language, ref target_language, .. }
            if source_language == "en" && target_language == "de"
    ));
    assert_eq!(translator.calls(), 1);
}

#[tokio::test]
async fn test_undetected_language_is_matched_as_is() {
    let translator = Arc::new(DictionaryTranslator::default());
    let matcher = builder(config())
        .with_translator(translator.clone())
        .build()
        .unwrap();

    let report = matcher.run(&request("yoga ???")).await.unwrap();
    assert_eq!(report.language, "de");
    assert_eq!(translator.calls(), 0);
}

#[tokio::test]
async fn test_no_lexical_matches() {
    let matcher = builder(config()).build().unwrap();
    let err = matcher
        .match_and_rank(&request("Quantenchromodynamik"))
        .await
        .unwrap_err();
    assert!(matches!(err, CourseRankError::NoMatches { .. }));
}

#[tokio::test]
async fn test_budget_window_and_penalty() {
    let matcher = builder(config()).build().unwrap();

    let courses = matcher
        .match_and_rank(&request("Yoga").with_budget(100.0))
        .await
        .unwrap();

    assert_eq!(
        guids(&courses),
        ["a", "c"].iter().map(|g| g.to_string()).collect()
    );
    for course in &courses {
        let penalty = course.price_penalty.unwrap();
        assert!((0.0..=1.0).contains(&penalty));
        match course.course.guid.as_str() {
            "a" => assert_eq!(penalty, 0.0),
            "c" => assert!((penalty - 20.0 / 30.0).abs() < 1e-9),
            other => panic!("unexpected course {}", other),
        }
    }
}

#[tokio::test]
async fn test_budget_without_matches() {
    let matcher = builder(config()).build().unwrap();
    let err = matcher
        .match_and_rank(&request("Yoga").with_budget(1000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CourseRankError::NoPriceMatches { budget } if budget == 1000.0));
}

#[tokio::test]
async fn test_non_positive_budget_disables_the_filter() {
    let matcher = builder(config()).build().unwrap();
    for budget in [0.0, -50.0] {
        let courses = matcher
            .match_and_rank(&request("Yoga").with_budget(budget))
            .await
            .unwrap();
        assert_eq!(courses.len(), 3);
    }
}

#[tokio::test]
async fn test_top_n_limits_the_result() {
    let config = ConfigBuilder::testing().with_top_n(2).build().unwrap();
    let matcher = builder(config).build().unwrap();

    let courses = matcher.match_and_rank(&request("Yoga")).await.unwrap();
    assert_eq!(courses.len(), 2);
    assert_permutation(courses.iter().map(|c| c.user_rank), 2);
}

#[tokio::test]
async fn test_encoder_mode_scores_by_similarity() {
    let matcher = builder(config())
        .with_encoder(Arc::new(BagOfWordsEncoder))
        .build()
        .unwrap();
    assert_eq!(matcher.semantic_mode().to_string(), "encoder");

    let report = matcher.run(&request("Yoga")).await.unwrap();
    assert_eq!(report.semantic_mode, "encoder");

    for course in &report.courses {
        match course.course.guid.as_str() {
            "a" | "e" => assert!((course.semantic_score - 1.0).abs() < 1e-6),
            "c" => assert!(course.semantic_score > 0.45 && course.semantic_score < 0.9),
            other => panic!("unexpected course {}", other),
        }
    }
}

#[tokio::test]
async fn test_semantically_distant_query() {
    let matcher = builder(config())
        .with_encoder(Arc::new(OrthogonalEncoder))
        .build()
        .unwrap();

    let err = matcher.match_and_rank(&request("Yoga")).await.unwrap_err();
    assert!(matches!(err, CourseRankError::SemanticTooDistant { .. }));
}

#[tokio::test]
async fn test_exact_consensus_never_costs_more_than_greedy() {
    let exact = ConfigBuilder::testing()
        .with_aggregation_strategy(AggregationStrategy::Exact)
        .build()
        .unwrap();
    let greedy = ConfigBuilder::testing()
        .with_aggregation_strategy(AggregationStrategy::Greedy)
        .build()
        .unwrap();

    let exact = builder(exact).build().unwrap().run(&request("Yoga")).await.unwrap();
    let greedy = builder(greedy).build().unwrap().run(&request("Yoga")).await.unwrap();

    assert_eq!(exact.strategy, AggregationStrategy::Exact);
    assert_eq!(greedy.strategy, AggregationStrategy::Greedy);
    assert!(exact.consensus_cost <= greedy.consensus_cost + 1e-9);
    assert_eq!(guids(&exact.courses), guids(&greedy.courses));
}

#[tokio::test]
async fn test_auto_strategy_falls_back_above_limit() {
    let config = ConfigBuilder::testing().with_exact_limit(2).build().unwrap();
    let report = builder(config)
        .build()
        .unwrap()
        .run(&request("Yoga"))
        .await
        .unwrap();
    assert_eq!(report.strategy, AggregationStrategy::Greedy);
}

#[tokio::test]
async fn test_catalog_replacement_is_seen_by_later_requests() {
    let handle = CatalogHandle::new(catalog());
    let matcher = CourseMatcher::builder(config())
        .with_catalog_handle(handle.clone())
        .with_language_detector(Arc::new(KeywordDetector))
        .build()
        .unwrap();

    assert_eq!(matcher.match_and_rank(&request("Yoga")).await.unwrap().len(), 3);

    let smaller = Catalog::from_records(vec![record(
        "z",
        "Yoga am Morgen",
        None,
        50.0,
        (1, 4, 10),
        1,
        &[],
        false,
    )])
    .unwrap();
    let previous = handle.replace(smaller);
    assert_eq!(previous.len(), 5);

    let courses = matcher.match_and_rank(&request("Yoga")).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].course.guid, "z");
    assert_eq!(matcher.catalog().snapshot().len(), 1);
}

#[tokio::test]
async fn test_init_loads_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("courses.json");
    std::fs::write(
        &path,
        r#"{"courses": [
            {"guid": "y1", "name": "Yoga für Anfänger", "price_amount": 80},
            {"guid": "y2", "course_name_german": "Yoga am Abend", "preis_betrag": 95,
             "aktuelle_teilnehmerzahl": 3, "maximale_teilnehmerzahl": 10},
            {"guid": "s1", "name": "Spanisch A2", "price_amount": 70}
        ]}"#,
    )
    .unwrap();

    let config = ConfigBuilder::testing()
        .with_catalog_path(&path)
        .with_log_level(LogLevel::Error)
        .build()
        .unwrap();
    let matcher = courserank::init(config).await.unwrap();

    let courses = matcher
        .match_and_rank(&MatchRequest::new("Yoga").with_gender("male").with_target_groups(["Children"]))
        .await
        .unwrap();
    assert_eq!(
        guids(&courses),
        ["y1", "y2"].iter().map(|g| g.to_string()).collect()
    );

    // A broken file leaves the current snapshot in place
    std::fs::write(&path, "[{").unwrap();
    assert!(matcher.catalog().reload_from(&path).is_err());
    assert_eq!(matcher.catalog().snapshot().len(), 3);
}

#[tokio::test]
async fn test_build_without_catalog_fails() {
    let err = CourseMatcher::builder(config()).build().unwrap_err();
    assert!(matches!(err, CourseRankError::Configuration(_)));
}

#[tokio::test]
async fn test_default_detector_handles_short_primary_language_queries() {
    let matcher = CourseMatcher::builder(config())
        .with_catalog(catalog())
        .with_translator(Arc::new(StrictTranslator))
        .build()
        .unwrap();

    for (query, expected) in [
        ("Yoga", "a"),
        ("Hatha Yoga", "a"),
        ("Spanisch Kurs", "d"),
        ("Töpfern", "b"),
    ] {
        let courses = matcher
            .match_and_rank(&request(query))
            .await
            .unwrap_or_else(|e| panic!("{query:?} failed: {e}"));
        assert!(
            courses.iter().any(|c| c.course.guid == expected),
            "{query:?} did not match {expected}"
        );
    }
}

#[tokio::test]
async fn test_unknown_detection_language_fails_build() {
    let config = ConfigBuilder::testing()
        .with_detection_languages(["en", "klingon"])
        .build()
        .unwrap();
    let err = CourseMatcher::builder(config)
        .with_catalog(catalog())
        .build()
        .unwrap_err();
    assert!(matches!(err, CourseRankError::Configuration(_)));
}
