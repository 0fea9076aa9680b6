//! Rewrite Error Types

use thiserror::Error;

/// Errors that can occur while loading rewrite resources
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Lexicon not found: {path}")]
    LexiconNotFound { path: String },

    #[error("Entity catalog not found: {path}")]
    CatalogNotFound { path: String },

    #[error("Lexicon parse failed at {path}: {reason}")]
    LexiconParse { path: String, reason: String },

    #[error("Entity catalog parse failed at {path}: {reason}")]
    CatalogParse { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for resource loading
pub type LoadResult<T> = Result<T, RewriteError>;

/// Outcome of a soft load: the value is always usable, the status says
/// whether it came from a healthy source or is a degraded empty stand-in.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub status: LoadStatus,
}

/// Health of a soft-loaded resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Ready,
    Missing { path: String },
    Malformed { path: String, reason: String },
}

impl LoadStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, LoadStatus::Ready)
    }
}

impl<T: Default> Loaded<T> {
    pub fn ready(value: T) -> Self {
        Self {
            value,
            status: LoadStatus::Ready,
        }
    }

    /// Turn a strict load result into a soft one, logging the degradation.
    pub fn from_result(result: LoadResult<T>, kind: &str) -> Self {
        match result {
            Ok(value) => Self::ready(value),
            Err(RewriteError::LexiconNotFound { path })
            | Err(RewriteError::CatalogNotFound { path }) => {
                log::warn!("{kind} not found at {path}, continuing without it");
                Self {
                    value: T::default(),
                    status: LoadStatus::Missing { path },
                }
            }
            Err(RewriteError::LexiconParse { path, reason })
            | Err(RewriteError::CatalogParse { path, reason }) => {
                log::warn!("{kind} at {path} is malformed, continuing without it: {reason}");
                Self {
                    value: T::default(),
                    status: LoadStatus::Malformed { path, reason },
                }
            }
            Err(RewriteError::Io(e)) => {
                log::warn!("{kind} unreadable, continuing without it: {e}");
                Self {
                    value: T::default(),
                    status: LoadStatus::Malformed {
                        path: String::new(),
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_degrades_to_default() {
        let loaded: Loaded<Vec<String>> = Loaded::from_result(
            Err(RewriteError::LexiconNotFound {
                path: "nope.yaml".to_string(),
            }),
            "Lexicon",
        );
        assert!(loaded.value.is_empty());
        assert_eq!(
            loaded.status,
            LoadStatus::Missing {
                path: "nope.yaml".to_string()
            }
        );
        assert!(loaded.status.is_degraded());
    }

    #[test]
    fn test_parse_error_is_malformed() {
        let loaded: Loaded<Vec<String>> = Loaded::from_result(
            Err(RewriteError::LexiconParse {
                path: "lexicon.yaml".into(),
                reason: "bad".into(),
            }),
            "Lexicon",
        );
        match loaded.status {
            LoadStatus::Malformed { path, reason } => {
                assert_eq!(path, "lexicon.yaml");
                assert_eq!(reason, "bad");
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }
}
