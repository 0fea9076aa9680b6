//! Append-only JSONL telemetry store.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::error::{TelemetryError, TelemetryResult};
use super::record::TelemetryRecord;
use crate::core::rewrite::result::RewriteResult;

/// Hex characters kept from the user id digest.
pub const USER_HASH_LEN: usize = 16;

/// One-way user id digest: SHA-256, hex, truncated to 16 chars.
pub fn hash_user_id(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    hex::encode(&digest[..USER_HASH_LEN / 2])
}

/// `query_<YYYYMMDD_HHMMSS>_<8 hex>` with a UTC timestamp and random suffix.
pub fn new_query_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "query_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

/// Aggregates over the whole store. Only `total_queries` is present for an
/// empty store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub total_queries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_users: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rewrite_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries_with_matches: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries_without_matches: Option<usize>,
}

impl TelemetryStats {
    fn from_records(records: &[TelemetryRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total = records.len();
        let unique_users: HashSet<&str> =
            records.iter().map(|r| r.user_id_hash.as_str()).collect();
        let with_matches = records.iter().filter(|r| r.has_matches()).count();
        let rewrite_sum: f64 = records.iter().map(|r| r.query_rewrite_time_ms).sum();

        Self {
            total_queries: total,
            unique_users: Some(unique_users.len()),
            avg_rewrite_time_ms: Some(rewrite_sum / total as f64),
            queries_with_matches: Some(with_matches),
            queries_without_matches: Some(total - with_matches),
        }
    }
}

/// Writes one record per line and never touches earlier lines.
///
/// Appends within a process are serialized by a mutex; each record is a
/// single `write_all` on an `O_APPEND` handle, so concurrent processes do
/// not interleave partial lines. Readers take no lock and may miss an
/// in-flight append.
#[derive(Debug)]
pub struct TelemetryLogger {
    storage_path: PathBuf,
    write_lock: Mutex<()>,
}

impl TelemetryLogger {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn ensure_storage_exists(&self) -> TelemetryResult<()> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                log::info!("Created telemetry directory {}", parent.display());
            }
        }
        Ok(())
    }

    /// Build and append the record for one rewritten query.
    pub fn log_query(
        &self,
        query_id: &str,
        user_id: &str,
        original_query: &str,
        result: &RewriteResult,
        rewrite_time_ms: f64,
        metadata: Option<Map<String, Value>>,
    ) -> TelemetryResult<TelemetryRecord> {
        let record = TelemetryRecord::from_rewrite(
            query_id,
            hash_user_id(user_id),
            original_query,
            result,
            rewrite_time_ms,
            metadata,
        );
        self.append(&record)?;
        Ok(record)
    }

    /// Append an already-built record as one newline-terminated line.
    pub fn append(&self, record: &TelemetryRecord) -> TelemetryResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TelemetryError::LockPoisoned)?;

        self.ensure_storage_exists()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.storage_path)?;
        file.write_all(line.as_bytes())?;

        log::debug!(
            "Logged telemetry for {} ({} matched entities)",
            record.query_id,
            record.matched_entities.len()
        );
        Ok(())
    }

    /// Read back every record in file order. With `limit`, only the most
    /// recent `limit` records are returned; `Some(0)` behaves like `None`.
    ///
    /// A missing store reads as empty. Blank lines are ignored and lines that
    /// fail to parse, including lines that are not UTF-8, are skipped with a
    /// warning.
    pub fn read_logs(&self, limit: Option<usize>) -> TelemetryResult<Vec<TelemetryRecord>> {
        let file = match fs::File::open(&self.storage_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let raw = line?;
            let line = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            // Invalid UTF-8 surfaces here as a parse error, not an IO error.
            match serde_json::from_slice::<TelemetryRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!(
                    "Skipping malformed telemetry line {} in {}: {e}",
                    index + 1,
                    self.storage_path.display()
                ),
            }
        }

        if let Some(limit) = limit.filter(|&n| n > 0) {
            let skip = records.len().saturating_sub(limit);
            records.drain(..skip);
        }

        Ok(records)
    }

    pub fn statistics(&self) -> TelemetryResult<TelemetryStats> {
        let records = self.read_logs(None)?;
        Ok(TelemetryStats::from_records(&records))
    }
}
