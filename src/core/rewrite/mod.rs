//! Query Rewrite Module
//!
//! Lexicon-driven query expansion plus entity disambiguation, producing the
//! weighted term list the retrieval stage consumes.
//!
//! ## Architecture
//!
//! ```text
//! User Query: "Is SF available at DFW10?"
//!        │
//!        ├──────────────────────────────┐
//!        ▼                              ▼
//! ┌──────────────────────────┐  ┌───────────────────────────────┐
//! │  Disambiguator           │  │  Lexicon (fresh or cached)    │
//! │  normalize + catalog     │  │  products / facilities        │
//! │  "servicefabric" →       │  │                               │
//! │    "ServiceFabric"       │  │                               │
//! └──────────────┬───────────┘  └──────────────┬────────────────┘
//!                │                             ▼
//!                │              ┌───────────────────────────────┐
//!                │              │  Expansion                    │
//!                │              │  ServiceFabric 1.0 (matched)  │
//!                │              │  Service Fabric 0.8 (synonym) │
//!                │              │  DFW10 1.0 (original)  ...    │
//!                │              │  capped at 8, insertion order │
//!                │              └──────────────┬────────────────┘
//!                ▼                             ▼
//!        ┌───────────────────────────────────────────────┐
//!        │  RewriteResult  ── timed ──► PerformanceMonitor│
//!        │                 ── logged ─► TelemetryLogger   │
//!        └───────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod catalog;
pub mod disambiguation;
pub mod error;
pub mod lexicon;
pub mod matching;
pub mod paths;
pub mod result;
pub mod rewriter;

// Re-export primary types
pub use cache::LexiconCache;
pub use catalog::{EntityCatalog, EntityEntry};
pub use disambiguation::{normalize, DisambiguationContext, Disambiguator, STOP_WORDS};
pub use error::{LoadResult, LoadStatus, Loaded, RewriteError};
pub use lexicon::{Lexicon, LexiconEntry};
pub use result::{ExpandedTerm, RewritePerformance, RewriteResult, TermSource};
pub use rewriter::{expand, Expansion, QueryRewriter, RewriteOptions, MAX_EXPANDED_TERMS};
