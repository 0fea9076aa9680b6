//! Telemetry record schema.
//!
//! Downstream retrieval/generation stages may append sibling fields to stored
//! records; those are carried through `extra` untouched when read back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::rewrite::disambiguation::DisambiguationContext;
use crate::core::rewrite::result::{ExpandedTerm, RewriteResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub query_id: String,
    /// First 16 hex chars of SHA-256 over the raw user id
    pub user_id_hash: String,
    pub timestamp: DateTime<Utc>,

    pub original_query: String,
    #[serde(default)]
    pub expanded_terms: Vec<ExpandedTerm>,
    #[serde(default)]
    pub matched_entities: Vec<String>,
    #[serde(default)]
    pub disambiguation_context: DisambiguationContext,

    #[serde(default)]
    pub query_rewrite_time_ms: f64,

    // Filled later by the retrieval pipeline
    pub retrieval_time_ms: Option<f64>,
    pub generation_time_ms: Option<f64>,
    pub total_pipeline_time_ms: Option<f64>,
    #[serde(default)]
    pub retrieval_results: Vec<Value>,
    #[serde(default)]
    pub rerank_results: Vec<Value>,

    // Filled later by labelling / feedback
    pub first_answer_success: Option<bool>,
    pub user_feedback: Option<Value>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TelemetryRecord {
    /// Build a fresh record for a rewrite outcome. Downstream fields start
    /// out null or empty.
    pub fn from_rewrite(
        query_id: &str,
        user_id_hash: String,
        original_query: &str,
        result: &RewriteResult,
        query_rewrite_time_ms: f64,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            query_id: query_id.to_string(),
            user_id_hash,
            timestamp: Utc::now(),
            original_query: original_query.to_string(),
            expanded_terms: result.expanded_terms.clone(),
            matched_entities: result.matched_entities.clone(),
            disambiguation_context: result.disambiguation_context.clone(),
            query_rewrite_time_ms,
            retrieval_time_ms: None,
            generation_time_ms: None,
            total_pipeline_time_ms: None,
            retrieval_results: Vec::new(),
            rerank_results: Vec::new(),
            first_answer_success: None,
            user_feedback: None,
            metadata: metadata.unwrap_or_default(),
            extra: Map::new(),
        }
    }

    pub fn has_matches(&self) -> bool {
        !self.matched_entities.is_empty()
    }
}
