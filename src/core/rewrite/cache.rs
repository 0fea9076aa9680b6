//! Lexicon Cache
//!
//! Optional replacement for the fresh per-call lexicon load. An entry stays
//! valid while the file's modification time and length are unchanged; any
//! change (or the file disappearing) forces a reload on the next lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::error::{LoadStatus, Loaded};
use super::lexicon::Lexicon;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CachedLexicon {
    fingerprint: Fingerprint,
    lexicon: Arc<Lexicon>,
}

/// Path-keyed lexicon cache invalidated by file metadata.
#[derive(Debug, Default)]
pub struct LexiconCache {
    entries: Mutex<HashMap<PathBuf, CachedLexicon>>,
}

impl LexiconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached lexicon for `path`, reloading it if the file changed.
    ///
    /// Degraded loads (missing or malformed file) are never cached.
    pub fn get(&self, path: &Path) -> Loaded<Arc<Lexicon>> {
        let Some(fingerprint) = Fingerprint::of(path) else {
            self.invalidate(path);
            return wrap(Lexicon::load(path));
        };

        if let Ok(entries) = self.entries.lock() {
            if let Some(cached) = entries.get(path) {
                if cached.fingerprint == fingerprint {
                    log::trace!("Lexicon cache hit for {}", path.display());
                    return Loaded {
                        value: Arc::clone(&cached.lexicon),
                        status: LoadStatus::Ready,
                    };
                }
            }
        }

        log::debug!("Lexicon cache miss for {}", path.display());
        let loaded = wrap(Lexicon::load(path));
        if !loaded.status.is_degraded() {
            if let Ok(mut entries) = self.entries.lock() {
                entries.insert(
                    path.to_path_buf(),
                    CachedLexicon {
                        fingerprint,
                        lexicon: Arc::clone(&loaded.value),
                    },
                );
            }
        }
        loaded
    }

    /// Drop the cached entry for `path`, if any.
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(path);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn wrap(loaded: Loaded<Lexicon>) -> Loaded<Arc<Lexicon>> {
    Loaded {
        value: Arc::new(loaded.value),
        status: loaded.status,
    }
}
