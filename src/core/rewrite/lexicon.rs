//! Lexicon Store
//!
//! Immutable mapping from domain concepts to canonical names, synonyms and
//! related terms. The file has two ordered sections:
//!
//! ```yaml
//! products:
//!   - canonical: ServiceFabric
//!     synonyms: [SF, Service Fabric]
//!     related_terms: [fabric connectivity]
//! facilities:
//!   - canonical: DFW10
//!     synonyms: [Dallas DFW10]
//! ```
//!
//! YAML is a superset of JSON, so a JSON lexicon loads through the same path.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{LoadResult, Loaded, RewriteError};

/// One lexicon concept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    #[serde(default)]
    pub canonical: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
}

impl LexiconEntry {
    pub fn new(canonical: &str, synonyms: &[&str], related_terms: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            related_terms: related_terms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The two lexicon sections, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub products: Vec<LexiconEntry>,
    #[serde(default)]
    pub facilities: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Strict load: missing and malformed files are errors.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RewriteError::LexiconNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_yaml_str(&content).map_err(|e| match e {
            RewriteError::LexiconParse { reason, .. } => RewriteError::LexiconParse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a lexicon document. An empty document yields an empty lexicon.
    pub fn from_yaml_str(content: &str) -> LoadResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // A document that is only `null` / `~` is treated like an empty one.
        let parsed: Option<Self> =
            serde_yaml::from_str(content).map_err(|e| RewriteError::LexiconParse {
                path: String::new(),
                reason: e.to_string(),
            })?;

        Ok(parsed.unwrap_or_default())
    }

    /// Soft load: a missing or malformed file degrades to an empty lexicon.
    pub fn load(path: &Path) -> Loaded<Self> {
        let loaded = Loaded::from_result(Self::from_path(path), "Lexicon");
        if !loaded.status.is_degraded() {
            log::debug!(
                "Loaded lexicon from {} ({} products, {} facilities)",
                path.display(),
                loaded.value.products.len(),
                loaded.value.facilities.len()
            );
        }
        loaded
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.facilities.is_empty()
    }

    /// True if `name` is the canonical name of any entry in either section.
    pub fn contains_canonical(&self, name: &str) -> bool {
        self.products
            .iter()
            .chain(self.facilities.iter())
            .any(|entry| entry.canonical == name)
    }
}
