use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use ontology_rewrite::config::AppConfig;
use ontology_rewrite::core::logging;
use ontology_rewrite::core::rewrite::{normalize, QueryRewriter, RewriteOptions};
use ontology_rewrite::core::telemetry::TelemetryLogger;

/// Expand search queries against a domain lexicon.
#[derive(Debug, Parser)]
#[command(name = "ontology-rewrite", version, about)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lexicon file, overriding the configured one
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Entity catalog file, overriding the configured one
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,

    /// Telemetry store, overriding the configured one
    #[arg(long, global = true)]
    telemetry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rewrite one query and print the result as JSON
    Rewrite {
        query: String,
        #[arg(long)]
        no_disambiguation: bool,
        /// Attach timing to the result
        #[arg(long)]
        track: bool,
        /// Append a telemetry record
        #[arg(long)]
        log: bool,
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the normalized form of a query
    Normalize { query: String },
    /// Print the disambiguation context of a query
    Disambiguate { query: String },
    /// Rewrite queries repeatedly and print the performance report
    Bench {
        #[arg(required = true)]
        queries: Vec<String>,
        #[arg(long, default_value_t = 100)]
        iterations: usize,
        /// Also append telemetry for every rewrite
        #[arg(long)]
        log: bool,
    },
    /// Print the most recent telemetry records
    Logs {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print aggregate telemetry statistics
    Stats,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Options shared by `rewrite` and `bench`. `--log` can only turn telemetry
/// on; a config with telemetry enabled always logs.
fn rewrite_options(config: &AppConfig, track: bool, log: bool) -> RewriteOptions {
    RewriteOptions::from(config)
        .with_performance(track)
        .with_telemetry(log || config.telemetry.enabled)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };
    if let Some(path) = cli.lexicon {
        config.rewrite.lexicon_path = path;
    }
    if let Some(path) = cli.ontology {
        config.rewrite.ontology_path = path;
    }
    if let Some(path) = cli.telemetry {
        config.telemetry.storage_path = path;
    }

    let _log_guard = match &config.logging.log_dir {
        Some(dir) => Some(logging::init(dir, &config.logging.level)),
        None => {
            logging::init_stderr_only(&config.logging.level);
            None
        }
    };
    tracing::debug!(command = ?cli.command, "ontology-rewrite v{} starting", ontology_rewrite::VERSION);

    let lexicon_path = config.lexicon_path();

    match cli.command {
        Command::Normalize { query } => {
            println!("{}", normalize(&query));
        }
        Command::Disambiguate { query } => {
            let rewriter = QueryRewriter::from_config(&config);
            print_json(&rewriter.disambiguator().disambiguation_context(&query))?;
        }
        Command::Rewrite {
            query,
            no_disambiguation,
            track,
            log,
            user,
        } => {
            let rewriter = QueryRewriter::from_config(&config);
            let mut options = rewrite_options(&config, track, log);
            if no_disambiguation {
                options = options.with_disambiguation(false);
            }
            if let Some(user) = user {
                options = options.with_user_id(user);
            }
            print_json(&rewriter.rewrite(&query, &lexicon_path, &options))?;
        }
        Command::Bench {
            queries,
            iterations,
            log,
        } => {
            let rewriter = QueryRewriter::from_config(&config);
            let options = rewrite_options(&config, true, log);
            for _ in 0..iterations {
                for query in &queries {
                    rewriter.rewrite(query, &lexicon_path, &options);
                }
            }
            print!("{}", rewriter.monitor().format_report());
        }
        Command::Logs { limit } => {
            let records = TelemetryLogger::new(config.telemetry.storage_path.clone())
                .read_logs(limit)
                .context("failed to read telemetry store")?;
            print_json(&records)?;
        }
        Command::Stats => {
            let stats = TelemetryLogger::new(config.telemetry.storage_path.clone())
                .statistics()
                .context("failed to read telemetry store")?;
            print_json(&stats)?;
        }
    }

    Ok(())
}
