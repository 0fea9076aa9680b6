//! Rewrite output models.
//!
//! This is the JSON contract consumed by the downstream retrieval stage.

use serde::{Deserialize, Serialize};

use super::disambiguation::DisambiguationContext;

/// Where an expanded term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    /// Canonical name found directly in the query
    Original,
    /// Declared synonym of a matched canonical
    Synonym,
    /// Related term of a matched canonical
    Related,
    /// Canonical name reached through one of its synonyms
    MatchedSynonym,
}

impl std::fmt::Display for TermSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Synonym => write!(f, "synonym"),
            Self::Related => write!(f, "related"),
            Self::MatchedSynonym => write!(f, "matched_synonym"),
        }
    }
}

/// One weighted expansion term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTerm {
    pub term: String,
    /// In (0, 1]
    pub weight: f64,
    pub source: TermSource,
}

impl ExpandedTerm {
    pub fn new(term: impl Into<String>, weight: f64, source: TermSource) -> Self {
        Self {
            term: term.into(),
            weight,
            source,
        }
    }
}

/// Timing attached when performance tracking is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewritePerformance {
    /// Wall-clock time of the whole call, rounded to 2 decimals
    pub total_time_ms: f64,
}

/// Result of rewriting one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub original_query: String,
    /// Insertion order, capped at [`MAX_EXPANDED_TERMS`](super::rewriter::MAX_EXPANDED_TERMS)
    pub expanded_terms: Vec<ExpandedTerm>,
    /// Canonical names only; may repeat across lexicon sections
    pub matched_entities: Vec<String>,
    pub disambiguation_context: DisambiguationContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<RewritePerformance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

impl RewriteResult {
    /// Pass-through result with nothing expanded or matched.
    pub fn empty(query: &str) -> Self {
        Self {
            original_query: query.to_string(),
            expanded_terms: Vec::new(),
            matched_entities: Vec::new(),
            disambiguation_context: DisambiguationContext::new(),
            performance: None,
            query_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_json_shape() {
        let json = serde_json::to_value(RewriteResult::empty("hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "original_query": "hello",
                "expanded_terms": [],
                "matched_entities": [],
                "disambiguation_context": {}
            })
        );
    }

    #[test]
    fn test_term_source_names() {
        for (source, name) in [
            (TermSource::Original, "original"),
            (TermSource::Synonym, "synonym"),
            (TermSource::Related, "related"),
            (TermSource::MatchedSynonym, "matched_synonym"),
        ] {
            assert_eq!(serde_json::to_value(source).unwrap(), name);
            assert_eq!(source.to_string(), name);
        }
    }
}
