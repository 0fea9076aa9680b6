//! Entity Disambiguation
//!
//! Resolves which catalog entity a possibly ambiguous term refers to, using
//! substring containment over the catalog's synonym graph and the rest of
//! the query as context. Heuristic only: the first candidate whose phrasings
//! show up in the query wins, otherwise the first candidate at all.

use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use super::catalog::EntityCatalog;
use super::error::LoadStatus;

/// Words dropped by [`normalize`].
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "tell", "me", "about",
];

static PUNCTUATION: OnceLock<Regex> = OnceLock::new();

fn punctuation() -> &'static Regex {
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("static pattern"))
}

/// Lowercase, strip punctuation, collapse whitespace and drop stop words.
pub fn normalize(query: &str) -> String {
    let lower = query.to_lowercase();
    let stripped = punctuation().replace_all(&lower, "");

    stripped
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased ambiguous term -> resolved entity name, in catalog order.
pub type DisambiguationContext = IndexMap<String, String>;

/// Catalog-backed disambiguator. The catalog is loaded once per instance.
#[derive(Debug, Clone, Default)]
pub struct Disambiguator {
    catalog: EntityCatalog,
    status: Option<LoadStatus>,
}

impl Disambiguator {
    pub fn new(catalog: EntityCatalog) -> Self {
        Self {
            catalog,
            status: None,
        }
    }

    /// Load the catalog from disk; a missing or malformed file leaves the
    /// disambiguator empty, so every lookup becomes a no-op.
    pub fn from_path(path: &Path) -> Self {
        let loaded = EntityCatalog::load(path);
        Self {
            catalog: loaded.value,
            status: Some(loaded.status),
        }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// True if the catalog came from a missing or malformed file.
    pub fn is_degraded(&self) -> bool {
        self.status.as_ref().is_some_and(LoadStatus::is_degraded)
    }

    /// Resolve `term` to a catalog entity using `query` as context.
    ///
    /// Returns `term` unchanged when no entity mentions it.
    pub fn resolve_term(&self, term: &str, query: &str) -> String {
        let normalized = normalize(query);
        self.resolve_normalized(term, &normalized)
    }

    fn resolve_normalized(&self, term: &str, normalized_query: &str) -> String {
        let term_lower = term.to_lowercase();

        let candidates: Vec<&String> = self
            .catalog
            .iter()
            .filter(|(name, entry)| {
                entry
                    .phrasings()
                    .chain(std::iter::once(*name))
                    .any(|p| p.to_lowercase().contains(&term_lower))
            })
            .map(|(name, _)| name)
            .collect();

        let in_context = candidates.iter().find(|name| {
            self.catalog
                .keywords(name)
                .iter()
                .any(|kw| normalized_query.contains(kw.as_str()))
        });

        in_context
            .or_else(|| candidates.first())
            .map(|name| name.to_string())
            .unwrap_or_else(|| term.to_string())
    }

    /// Resolve every entity whose phrasings appear in the normalized query.
    ///
    /// Keys are lowercased entity names; when two names collide after
    /// lowercasing, the later catalog entry wins.
    pub fn disambiguation_context(&self, query: &str) -> DisambiguationContext {
        let normalized = normalize(query);
        let mut context = DisambiguationContext::new();

        for (name, entry) in self.catalog.iter() {
            let mentioned = entry
                .phrasings()
                .any(|p| normalized.contains(p.to_lowercase().as_str()));

            if mentioned {
                let resolved = self.resolve_normalized(name, &normalized);
                log::trace!("Disambiguated {name:?} -> {resolved:?}");
                context.insert(name.to_lowercase(), resolved);
            }
        }

        context
    }
}
