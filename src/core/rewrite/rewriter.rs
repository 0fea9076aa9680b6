//! Query Rewriter
//!
//! Orchestrates one rewrite call:
//! 1. Load the lexicon (fresh per call unless a [`LexiconCache`] is attached)
//! 2. Build the disambiguation context from the entity catalog
//! 3. Expand `products` (canonical or synonym hits) and `facilities`
//! 4. Cap the expansion list, then optionally time and log the call

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use super::cache::LexiconCache;
use super::disambiguation::Disambiguator;
use super::error::Loaded;
use super::lexicon::Lexicon;
use super::matching::phrase_matches;
use super::result::{ExpandedTerm, RewritePerformance, RewriteResult, TermSource};
use crate::config::AppConfig;
use crate::core::performance::{PerformanceMonitor, PerformanceReport, LEXICON_LOAD, QUERY_REWRITE, TOTAL};
use crate::core::telemetry::{new_query_id, TelemetryLogger, TelemetryResult, TelemetryStats};

/// Hard cap on expanded terms, applied in insertion order.
pub const MAX_EXPANDED_TERMS: usize = 8;
/// Related terms taken per matched canonical.
pub const MAX_RELATED_TERMS: usize = 3;

pub const CANONICAL_WEIGHT: f64 = 1.0;
pub const SYNONYM_WEIGHT: f64 = 0.8;
pub const RELATED_WEIGHT: f64 = 0.6;

/// Per-call switches.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOptions {
    pub use_disambiguation: bool,
    pub track_performance: bool,
    pub log_telemetry: bool,
    /// Hashed before it is written anywhere
    pub user_id: String,
    /// Extra context stored on the telemetry record
    pub metadata: Option<Map<String, Value>>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            use_disambiguation: true,
            track_performance: false,
            log_telemetry: false,
            user_id: "anonymous".to_string(),
            metadata: None,
        }
    }
}

impl RewriteOptions {
    pub fn with_disambiguation(mut self, enabled: bool) -> Self {
        self.use_disambiguation = enabled;
        self
    }

    pub fn with_performance(mut self, enabled: bool) -> Self {
        self.track_performance = enabled;
        self
    }

    pub fn with_telemetry(mut self, enabled: bool) -> Self {
        self.log_telemetry = enabled;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<&AppConfig> for RewriteOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            use_disambiguation: config.rewrite.use_disambiguation,
            track_performance: false,
            log_telemetry: config.telemetry.enabled,
            user_id: config.rewrite.default_user_id.clone(),
            metadata: None,
        }
    }
}

/// Expanded terms and matched canonicals for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub expanded_terms: Vec<ExpandedTerm>,
    pub matched_entities: Vec<String>,
}

/// Expand `query` against an already-loaded lexicon.
///
/// Terms are kept in the order they are found, duplicates included, and the
/// list is cut at [`MAX_EXPANDED_TERMS`] regardless of weight.
pub fn expand(lexicon: &Lexicon, query: &str) -> Expansion {
    let query_lower = query.to_lowercase();
    let mut terms: Vec<ExpandedTerm> = Vec::new();
    let mut matched: Vec<String> = Vec::new();

    for entry in &lexicon.products {
        if entry.canonical.is_empty() {
            continue;
        }

        if phrase_matches(&entry.canonical.to_lowercase(), &query_lower) {
            terms.push(ExpandedTerm::new(&entry.canonical, CANONICAL_WEIGHT, TermSource::Original));
            matched.push(entry.canonical.clone());
            terms.extend(
                entry
                    .synonyms
                    .iter()
                    .map(|syn| ExpandedTerm::new(syn, SYNONYM_WEIGHT, TermSource::Synonym)),
            );
            terms.extend(
                entry
                    .related_terms
                    .iter()
                    .take(MAX_RELATED_TERMS)
                    .map(|rel| ExpandedTerm::new(rel, RELATED_WEIGHT, TermSource::Related)),
            );
        }

        if matched.contains(&entry.canonical) {
            continue;
        }

        // First synonym hit wins.
        let trigger = entry
            .synonyms
            .iter()
            .find(|syn| !syn.is_empty() && phrase_matches(&syn.to_lowercase(), &query_lower));

        if let Some(trigger) = trigger {
            terms.push(ExpandedTerm::new(
                &entry.canonical,
                CANONICAL_WEIGHT,
                TermSource::MatchedSynonym,
            ));
            matched.push(entry.canonical.clone());
            terms.extend(
                entry
                    .synonyms
                    .iter()
                    .filter(|syn| *syn != trigger)
                    .map(|syn| ExpandedTerm::new(syn, SYNONYM_WEIGHT, TermSource::Synonym)),
            );
        }
    }

    for entry in &lexicon.facilities {
        if entry.canonical.is_empty() || !query_lower.contains(&entry.canonical.to_lowercase()) {
            continue;
        }
        terms.push(ExpandedTerm::new(&entry.canonical, CANONICAL_WEIGHT, TermSource::Original));
        matched.push(entry.canonical.clone());
        terms.extend(
            entry
                .synonyms
                .iter()
                .map(|syn| ExpandedTerm::new(syn, SYNONYM_WEIGHT, TermSource::Synonym)),
        );
    }

    terms.truncate(MAX_EXPANDED_TERMS);

    Expansion {
        expanded_terms: terms,
        matched_entities: matched,
    }
}

/// Rewrite entry point with its collaborators injected.
#[derive(Debug)]
pub struct QueryRewriter {
    disambiguator: Disambiguator,
    monitor: Arc<PerformanceMonitor>,
    telemetry: Arc<TelemetryLogger>,
    cache: Option<LexiconCache>,
}

impl QueryRewriter {
    pub fn new(
        disambiguator: Disambiguator,
        monitor: Arc<PerformanceMonitor>,
        telemetry: Arc<TelemetryLogger>,
    ) -> Self {
        Self {
            disambiguator,
            monitor,
            telemetry,
            cache: None,
        }
    }

    /// Build every collaborator from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let rewriter = Self::new(
            Disambiguator::from_path(&config.ontology_path()),
            Arc::new(PerformanceMonitor::new()),
            Arc::new(TelemetryLogger::new(config.telemetry.storage_path.clone())),
        );
        if config.rewrite.cache_lexicon {
            rewriter.with_lexicon_cache()
        } else {
            rewriter
        }
    }

    /// Reuse lexicon loads until the file's metadata changes.
    pub fn with_lexicon_cache(mut self) -> Self {
        self.cache = Some(LexiconCache::new());
        self
    }

    pub fn disambiguator(&self) -> &Disambiguator {
        &self.disambiguator
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    pub fn telemetry(&self) -> &Arc<TelemetryLogger> {
        &self.telemetry
    }

    fn load_lexicon(&self, path: &Path) -> Loaded<Arc<Lexicon>> {
        match &self.cache {
            Some(cache) => cache.get(path),
            None => {
                let loaded = Lexicon::load(path);
                Loaded {
                    value: Arc::new(loaded.value),
                    status: loaded.status,
                }
            }
        }
    }

    /// Rewrite one query. Never fails: an unavailable lexicon yields a
    /// pass-through result, and telemetry write errors are only logged.
    pub fn rewrite(&self, query: &str, lexicon_path: &Path, options: &RewriteOptions) -> RewriteResult {
        let start = Instant::now();

        let loaded = if options.track_performance {
            self.monitor.measure(LEXICON_LOAD, || self.load_lexicon(lexicon_path)).0
        } else {
            self.load_lexicon(lexicon_path)
        };

        let lexicon = loaded.value;
        if lexicon.is_empty() {
            log::debug!("Lexicon at {} is empty, passing query through", lexicon_path.display());
            return RewriteResult::empty(query);
        }

        let disambiguation_context = if options.use_disambiguation {
            self.disambiguator.disambiguation_context(query)
        } else {
            Default::default()
        };

        let expansion = expand(&lexicon, query);
        let total_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut result = RewriteResult {
            original_query: query.to_string(),
            expanded_terms: expansion.expanded_terms,
            matched_entities: expansion.matched_entities,
            disambiguation_context,
            performance: None,
            query_id: None,
        };

        if options.track_performance {
            self.monitor.record(QUERY_REWRITE, total_time_ms);
            result.performance = Some(RewritePerformance {
                total_time_ms: (total_time_ms * 100.0).round() / 100.0,
            });
        }

        if options.log_telemetry {
            let query_id = new_query_id();
            match self.telemetry.log_query(
                &query_id,
                &options.user_id,
                query,
                &result,
                total_time_ms,
                options.metadata.clone(),
            ) {
                Ok(_) => result.query_id = Some(query_id),
                Err(e) => log::error!("Failed to log telemetry for {query_id}: {e}"),
            }
        }

        if options.track_performance {
            self.monitor.record(TOTAL, start.elapsed().as_secs_f64() * 1000.0);
        }

        log::debug!(
            "Rewrote {:?}: {} terms, {} matched",
            query,
            result.expanded_terms.len(),
            result.matched_entities.len()
        );
        result
    }

    pub fn performance_report(&self) -> PerformanceReport {
        self.monitor.report()
    }

    pub fn telemetry_statistics(&self) -> TelemetryResult<TelemetryStats> {
        self.telemetry.statistics()
    }
}
