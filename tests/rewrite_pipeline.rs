//! End-to-end tests for the rewrite pipeline.
//!
//! Each test builds its own lexicon, catalog and telemetry store inside a
//! temporary directory, so tests can run concurrently.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test rewrite_pipeline
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map};
use tempfile::TempDir;

use ontology_rewrite::config::AppConfig;
use ontology_rewrite::core::performance::{PerformanceMonitor, LEXICON_LOAD, QUERY_REWRITE, TOTAL};
use ontology_rewrite::core::rewrite::{Disambiguator, QueryRewriter, RewriteOptions, TermSource};
use ontology_rewrite::core::telemetry::{hash_user_id, TelemetryLogger};

const LEXICON: &str = r#"
products:
  - canonical: ServiceFabric
    synonyms: [SF, Service Fabric]
    related_terms: [fabric connectivity, cloud on-ramp, private connectivity, SDN]
  - canonical: Colocation
    synonyms: [colo]
    related_terms: [rack space]
facilities:
  - canonical: DFW10
    synonyms: []
  - canonical: JFK10
    synonyms: [New York JFK10]
"#;

const CATALOG: &str = r#"{
  "entities": {
    "ServiceFabric": {"synonyms": ["SF", "Service Fabric"], "related_terms": ["fabric connectivity"]},
    "Colocation": {"synonyms": ["colo"], "related_terms": ["rack space"]}
  }
}"#;

struct Fixture {
    _dir: TempDir,
    lexicon: PathBuf,
    catalog: PathBuf,
    telemetry: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let lexicon = dir.path().join("lexicon.yaml");
        let catalog = dir.path().join("ontology.json");
        fs::write(&lexicon, LEXICON).unwrap();
        fs::write(&catalog, CATALOG).unwrap();
        let telemetry = dir.path().join("outputs").join("telemetry_logs.jsonl");
        Self {
            _dir: dir,
            lexicon,
            catalog,
            telemetry,
        }
    }

    fn rewriter(&self) -> QueryRewriter {
        QueryRewriter::new(
            Disambiguator::from_path(&self.catalog),
            Arc::new(PerformanceMonitor::new()),
            Arc::new(TelemetryLogger::new(&self.telemetry)),
        )
    }

    fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.rewrite.lexicon_path = self.lexicon.clone();
        config.rewrite.ontology_path = self.catalog.clone();
        config.telemetry.storage_path = self.telemetry.clone();
        config
    }
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

#[test]
fn test_synonym_and_facility_expansion() {
    let fx = Fixture::new();
    let result = fx
        .rewriter()
        .rewrite("Is SF available at DFW10?", &fx.lexicon, &RewriteOptions::default());

    let terms: Vec<(&str, f64, TermSource)> = result
        .expanded_terms
        .iter()
        .map(|t| (t.term.as_str(), t.weight, t.source))
        .collect();
    assert_eq!(
        terms,
        vec![
            ("ServiceFabric", 1.0, TermSource::MatchedSynonym),
            ("Service Fabric", 0.8, TermSource::Synonym),
            ("DFW10", 1.0, TermSource::Original),
        ]
    );
    assert_eq!(result.matched_entities, vec!["ServiceFabric", "DFW10"]);
    assert_eq!(
        result.disambiguation_context.get("servicefabric").map(String::as_str),
        Some("ServiceFabric")
    );
    assert!(result.performance.is_none());
    assert!(result.query_id.is_none());
}

#[test]
fn test_canonical_hit_takes_three_related_terms() {
    let fx = Fixture::new();
    let result = fx
        .rewriter()
        .rewrite("ServiceFabric pricing", &fx.lexicon, &RewriteOptions::default());

    let related: Vec<&str> = result
        .expanded_terms
        .iter()
        .filter(|t| t.source == TermSource::Related)
        .map(|t| t.term.as_str())
        .collect();
    assert_eq!(related, vec!["fabric connectivity", "cloud on-ramp", "private connectivity"]);
    assert_eq!(result.expanded_terms[0].source, TermSource::Original);
    assert_eq!(result.matched_entities, vec!["ServiceFabric"]);
}

#[test]
fn test_missing_lexicon_passes_query_through() {
    let fx = Fixture::new();
    let missing = fx.lexicon.with_file_name("nope.yaml");
    let options = RewriteOptions::default().with_telemetry(true);
    let result = fx.rewriter().rewrite("Is SF available at DFW10?", &missing, &options);

    assert_eq!(result.original_query, "Is SF available at DFW10?");
    assert!(result.expanded_terms.is_empty());
    assert!(result.matched_entities.is_empty());
    assert!(result.disambiguation_context.is_empty());
    assert!(result.query_id.is_none());
    // Nothing is logged for a pass-through result
    assert!(!fx.telemetry.exists());
}

#[test]
fn test_malformed_lexicon_passes_query_through() {
    let fx = Fixture::new();
    fs::write(&fx.lexicon, "products: [unterminated").unwrap();
    let result = fx
        .rewriter()
        .rewrite("SF at DFW10", &fx.lexicon, &RewriteOptions::default());
    assert!(result.expanded_terms.is_empty());
    assert!(result.matched_entities.is_empty());
}

#[test]
fn test_missing_catalog_still_expands() {
    let fx = Fixture::new();
    let rewriter = QueryRewriter::new(
        Disambiguator::from_path(&fx.catalog.with_file_name("absent.json")),
        Arc::new(PerformanceMonitor::new()),
        Arc::new(TelemetryLogger::new(&fx.telemetry)),
    );
    assert!(rewriter.disambiguator().is_degraded());

    let result = rewriter.rewrite("colo in JFK10", &fx.lexicon, &RewriteOptions::default());
    assert!(result.disambiguation_context.is_empty());
    assert_eq!(result.matched_entities, vec!["Colocation", "JFK10"]);
}

#[test]
fn test_disambiguation_disabled() {
    let fx = Fixture::new();
    let options = RewriteOptions::default().with_disambiguation(false);
    let result = fx.rewriter().rewrite("SF at DFW10", &fx.lexicon, &options);
    assert!(result.disambiguation_context.is_empty());
    assert!(!result.expanded_terms.is_empty());
}

#[test]
fn test_telemetry_record_for_user() {
    let fx = Fixture::new();
    let rewriter = fx.rewriter();
    let mut metadata = Map::new();
    metadata.insert("channel".to_string(), json!("web"));
    let options = RewriteOptions::default()
        .with_telemetry(true)
        .with_user_id("u1")
        .with_metadata(metadata);

    let result = rewriter.rewrite("Is SF available at DFW10?", &fx.lexicon, &options);
    let query_id = result.query_id.clone().expect("query id assigned");
    assert!(query_id.starts_with("query_"));

    let records = rewriter.telemetry().read_logs(Some(1)).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.query_id, query_id);
    assert_eq!(record.user_id_hash, hash_user_id("u1"));
    assert_ne!(record.user_id_hash, "u1");
    assert_eq!(record.original_query, "Is SF available at DFW10?");
    assert_eq!(record.matched_entities, result.matched_entities);
    assert_eq!(record.expanded_terms, result.expanded_terms);
    assert!(record.query_rewrite_time_ms >= 0.0);
    assert!(record.retrieval_time_ms.is_none());
    assert!(record.first_answer_success.is_none());
    assert_eq!(record.metadata.get("channel"), Some(&json!("web")));

    let raw = fs::read_to_string(&fx.telemetry).unwrap();
    assert!(!raw.contains("\"u1\""));
}

#[test]
fn test_telemetry_is_append_only_and_ordered() {
    let fx = Fixture::new();
    let rewriter = fx.rewriter();
    let options = RewriteOptions::default().with_telemetry(true);
    let queries = ["SF at DFW10", "colo pricing", "nothing relevant", "JFK10 power"];

    for query in queries {
        rewriter.rewrite(query, &fx.lexicon, &options);
    }
    let first_pass = fs::read_to_string(&fx.telemetry).unwrap();
    rewriter.rewrite("one more", &fx.lexicon, &options);
    let second_pass = fs::read_to_string(&fx.telemetry).unwrap();

    assert!(second_pass.starts_with(&first_pass));
    assert_eq!(line_count(&fx.telemetry), queries.len() + 1);

    let records = rewriter.telemetry().read_logs(None).unwrap();
    let logged: Vec<&str> = records.iter().map(|r| r.original_query.as_str()).collect();
    assert_eq!(
        logged,
        vec!["SF at DFW10", "colo pricing", "nothing relevant", "JFK10 power", "one more"]
    );

    let last_two = rewriter.telemetry().read_logs(Some(2)).unwrap();
    assert_eq!(last_two[0].original_query, "JFK10 power");
    assert_eq!(last_two[1].original_query, "one more");

    let stats = rewriter.telemetry_statistics().unwrap();
    assert_eq!(stats.total_queries, 5);
    assert_eq!(stats.unique_users, Some(1));
    assert_eq!(stats.queries_with_matches, Some(3));
    assert_eq!(stats.queries_without_matches, Some(2));
}

#[test]
fn test_performance_tracking_populates_buckets() {
    let fx = Fixture::new();
    let rewriter = fx.rewriter();
    let options = RewriteOptions::default().with_performance(true);

    for _ in 0..5 {
        let result = rewriter.rewrite("SF at DFW10", &fx.lexicon, &options);
        assert!(result.performance.is_some_and(|p| p.total_time_ms >= 0.0));
    }

    let monitor = rewriter.monitor();
    assert_eq!(monitor.sample_count(LEXICON_LOAD), 5);
    assert_eq!(monitor.sample_count(QUERY_REWRITE), 5);
    assert_eq!(monitor.sample_count(TOTAL), 5);

    let report = rewriter.performance_report();
    let stats = report[QUERY_REWRITE].as_ref().expect("samples recorded");
    assert_eq!(stats.count, 5);
    assert!(stats.min <= stats.median && stats.median <= stats.max);
    assert!(rewriter.monitor().format_report().contains("QUERY REWRITE:"));
}

#[test]
fn test_cached_lexicon_reloads_after_edit() {
    let fx = Fixture::new();
    let rewriter = fx.rewriter().with_lexicon_cache();
    let options = RewriteOptions::default();

    let before = rewriter.rewrite("DRIX peering", &fx.lexicon, &options);
    assert!(before.matched_entities.is_empty());

    fs::write(
        &fx.lexicon,
        "products:\n  - canonical: DRIX\n    synonyms: [internet exchange]\n    related_terms: [peering]\n",
    )
    .unwrap();

    let after = rewriter.rewrite("DRIX peering", &fx.lexicon, &options);
    assert_eq!(after.matched_entities, vec!["DRIX"]);
}

#[test]
fn test_from_config_uses_configured_paths() {
    let fx = Fixture::new();
    let config = fx.config();
    let rewriter = QueryRewriter::from_config(&config);
    let options = RewriteOptions::from(&config).with_telemetry(true);

    assert_eq!(rewriter.telemetry().storage_path(), fx.telemetry.as_path());
    assert_eq!(rewriter.disambiguator().catalog().len(), 2);

    let result = rewriter.rewrite("colo", &config.lexicon_path(), &options);
    assert_eq!(result.matched_entities, vec!["Colocation"]);
    assert_eq!(line_count(&fx.telemetry), 1);
}
