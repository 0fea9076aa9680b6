/// Ontology Rewrite - query expansion and entity disambiguation
///
/// Expands natural-language search queries with weighted synonyms and
/// related terms from a domain lexicon, resolves ambiguous references
/// against an entity catalog, and records per-query timing and telemetry
/// for offline analysis.

pub mod config;
pub mod core;

pub use crate::core::performance::{LatencyStats, PerformanceMonitor, PerformanceReport};
pub use crate::core::rewrite::{QueryRewriter, RewriteOptions, RewriteResult};
pub use crate::core::telemetry::{TelemetryLogger, TelemetryStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
