pub mod logging;

// Performance measurement for the rewrite pipeline
pub mod performance;

// Lexicon expansion + entity disambiguation
pub mod rewrite;

// Append-only query telemetry
pub mod telemetry;
