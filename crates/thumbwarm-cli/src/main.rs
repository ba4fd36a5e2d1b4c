//! Thumbwarm CLI - warm a site's thumbnail cache for a saved record.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use thumbwarm_core::{OverallStatus, PlannedVariant, SaveEvent, SavedValues, WarmupResult};
use thumbwarm_engine::{
    EngineConfig, HttpBackend, HttpBackendConfig, StaticHost, WarmupEngine,
};

/// Thumbwarm CLI - thumbnail cache warm-up tool
#[derive(Parser)]
#[command(name = "thumbwarm")]
#[command(about = "Warm thumbnail caches for saved content records", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Warm every thumbnail a saved record asks for
    Warm {
        #[command(flatten)]
        record: RecordArgs,

        /// Site root serving the /thumbs route
        #[arg(short, long, default_value = "http://localhost")]
        base_url: String,

        /// Maximum concurrent thumbnail requests
        #[arg(short, long, default_value_t = EngineConfig::default().max_in_flight)]
        max_in_flight: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// File name of the site's "image not found" placeholder
        #[arg(long, default_value = "default.png")]
        placeholder_file: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the deduplicated variant plan without fetching anything
    Plan {
        #[command(flatten)]
        record: RecordArgs,
    },
}

#[derive(Args)]
struct RecordArgs {
    /// Site document with content types and thumbnail aliases
    #[arg(short, long)]
    site: PathBuf,

    /// Content type of the saved record
    #[arg(short, long)]
    content_type: String,

    /// Saved field values of the record (JSON object)
    #[arg(short, long)]
    record: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG still applies to targets outside this workspace.
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("thumbwarm_engine={level}").parse()?)
        .add_directive(format!("thumbwarm_cli={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Warm {
            record,
            base_url,
            max_in_flight,
            timeout_secs,
            placeholder_file,
            json,
        } => {
            let backend_config = HttpBackendConfig {
                base_url,
                timeout_secs,
                placeholder_file,
            };
            let engine_config = EngineConfig { max_in_flight };
            warm(record, &backend_config, &engine_config, json).await
        }
        Commands::Plan { record } => plan(record),
    }
}

async fn warm(
    args: RecordArgs,
    backend_config: &HttpBackendConfig,
    engine_config: &EngineConfig,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let host = Arc::new(StaticHost::from_path(&args.site)?);
    let event = load_event(&args.content_type, &args.record)?;
    let backend = Arc::new(HttpBackend::new(backend_config)?);
    let engine = WarmupEngine::new(host.clone(), host, backend, engine_config);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling warm-up");
            ctrl_c.cancel();
        }
    });

    let result = match engine.on_save(&event, cancel).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Warm-up aborted: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(ExitCode::from(exit_status(result.overall_status)))
}

fn plan(args: RecordArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let host = StaticHost::from_path(&args.site)?;
    let event = load_event(&args.content_type, &args.record)?;

    let planned = match thumbwarm_engine::plan(&host, &host, &event) {
        Ok(planned) => planned,
        Err(e) => {
            eprintln!("Planning aborted: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    println!("Plan for '{}' ({} entries):", event.content_type, planned.len());
    println!("{:<14}  {:<40}  {}", "KIND", "VARIANT", "FROM");
    println!("{}", "-".repeat(80));

    for entry in &planned {
        match entry {
            PlannedVariant::Request(request) => println!(
                "{:<14}  {:<40}  {}",
                "request",
                request.identity(),
                request.origin()
            ),
            PlannedVariant::Rejected(outcome) => println!(
                "{:<14}  {:<40}  {}",
                outcome.status,
                outcome.message.as_deref().unwrap_or(""),
                outcome.origin
            ),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_event(content_type: &str, record: &Path) -> Result<SaveEvent, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(record)?;
    let values: SavedValues = serde_json::from_str(&json)?;
    Ok(SaveEvent::new(content_type, values))
}

fn print_result(result: &WarmupResult) {
    println!("Run:        {}", result.run_id);
    println!("Type:       {}", result.content_type);
    println!("Status:     {}", result.overall_status);
    println!("Duration:   {} ms", result.duration_ms());

    if !result.outcomes.is_empty() {
        println!();
        println!("{:<14}  {:<40}  {}", "STATUS", "VARIANT", "MESSAGE");
        println!("{}", "-".repeat(80));
        for outcome in &result.outcomes {
            println!(
                "{:<14}  {:<40}  {}",
                outcome.status,
                outcome.describe(),
                outcome.message.as_deref().unwrap_or("")
            );
        }
    }

    println!();
    println!("{}", result.summary());
}

/// 0 when nothing failed, 1 when any variant failed.
fn exit_status(status: OverallStatus) -> u8 {
    u8::from(status.is_failure())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_status(OverallStatus::AllSucceeded), 0);
        assert_eq!(exit_status(OverallStatus::NothingToDo), 0);
        assert_eq!(exit_status(OverallStatus::PartialFailure), 1);
        assert_eq!(exit_status(OverallStatus::TotalFailure), 1);
    }

    #[test]
    fn test_parse_warm_args() {
        let cli = Cli::try_parse_from([
            "thumbwarm",
            "warm",
            "--site",
            "site.json",
            "--content-type",
            "pages",
            "--record",
            "record.json",
            "--max-in-flight",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Warm {
                record,
                max_in_flight,
                base_url,
                ..
            } => {
                assert_eq!(record.content_type, "pages");
                assert_eq!(max_in_flight, 4);
                assert_eq!(base_url, "http://localhost");
            }
            Commands::Plan { .. } => panic!("Expected warm command"),
        }
    }
}
