//! Entity Catalog
//!
//! Read-only entity map used purely for disambiguation. Entities keep the
//! order they have in the file, which makes the disambiguator's tie-breaks
//! reproducible.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{LoadResult, Loaded, RewriteError};

/// Alternate phrasings of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityEntry {
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
}

impl EntityEntry {
    pub fn new(synonyms: &[&str], related_terms: &[&str]) -> Self {
        Self {
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            related_terms: related_terms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Synonyms followed by related terms, as written.
    pub fn phrasings(&self) -> impl Iterator<Item = &String> {
        self.synonyms.iter().chain(self.related_terms.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCatalog {
    #[serde(default)]
    pub entities: IndexMap<String, EntityEntry>,
}

impl EntityCatalog {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, EntityEntry)>,
    {
        Self {
            entities: entries.into_iter().collect(),
        }
    }

    /// Strict load: missing and malformed files are errors.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RewriteError::CatalogNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| RewriteError::CatalogParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Soft load: a missing or malformed file degrades to an empty catalog.
    pub fn load(path: &Path) -> Loaded<Self> {
        log::info!("Loading entity catalog from {}", path.display());
        Loaded::from_result(Self::from_path(path), "Entity catalog")
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EntityEntry> {
        self.entities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityEntry)> {
        self.entities.iter()
    }

    /// Lowercased synonyms and related terms of an entity; empty if unknown.
    pub fn keywords(&self, name: &str) -> Vec<String> {
        self.entities
            .get(name)
            .map(|entry| entry.phrasings().map(|p| p.to_lowercase()).collect())
            .unwrap_or_default()
    }
}
