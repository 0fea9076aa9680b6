//! Query Telemetry
//!
//! One append-only, privacy-scrubbed record per rewritten query, stored as
//! newline-delimited JSON for offline batch analysis. User identifiers are
//! replaced by a truncated SHA-256 digest before anything touches disk.

pub mod error;
pub mod logger;
pub mod record;

pub use error::{TelemetryError, TelemetryResult};
pub use logger::{hash_user_id, new_query_id, TelemetryLogger, TelemetryStats};
pub use record::TelemetryRecord;
