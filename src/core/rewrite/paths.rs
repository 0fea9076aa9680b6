//! Resource Path Resolution
//!
//! Default locations for the lexicon, the entity catalog and the telemetry
//! store, plus a resolver that tries the working directory first and the
//! crate's own `data/` directory second.

use std::path::{Path, PathBuf};

/// Lexicon filename (products + facilities sections)
pub const LEXICON_FILENAME: &str = "lexicon_v01_final.yaml";

/// Entity catalog filename (used only for disambiguation)
pub const ONTOLOGY_FILENAME: &str = "ontology_runtime.json";

/// Telemetry store filename (one JSON record per line)
pub const TELEMETRY_FILENAME: &str = "telemetry_logs.jsonl";

/// Default lexicon path, relative to the working directory.
pub fn default_lexicon_path() -> PathBuf {
    PathBuf::from("data").join(LEXICON_FILENAME)
}

/// Default entity catalog path, relative to the working directory.
pub fn default_ontology_path() -> PathBuf {
    PathBuf::from("data").join(ONTOLOGY_FILENAME)
}

/// Default telemetry store path, relative to the working directory.
pub fn default_telemetry_path() -> PathBuf {
    PathBuf::from("outputs").join(TELEMETRY_FILENAME)
}

/// Resolve a data file for reading.
///
/// Checks locations in order:
/// 1. The path as given (absolute, or relative to the working directory)
/// 2. `$CARGO_MANIFEST_DIR/data/<filename>` for development runs
///
/// Falls back to the path as given so that callers report a meaningful
/// "not found" location.
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }

    if let (Ok(manifest_dir), Some(filename)) = (std::env::var("CARGO_MANIFEST_DIR"), path.file_name()) {
        let dev_path = PathBuf::from(manifest_dir).join("data").join(filename);
        if dev_path.exists() {
            return dev_path;
        }
    }

    path.to_path_buf()
}
