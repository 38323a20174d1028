//! Pairgrid - GitLab assignee co-occurrence matrices
//!
//! A CLI tool that walks the milestones of a GitLab project, collects
//! the people assigned together on each issue, and prints a symmetric
//! table of how often every two people shared an issue.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, API failure, write failure, etc.)

mod analysis;
mod cli;
mod config;
mod gitlab;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, OutputFormat};
use gitlab::GitlabClient;
use indicatif::{ProgressBar, ProgressStyle};
use models::{PairingReport, ReportMetadata};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Pairgrid v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .pairgrid.yaml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILES[0]);

    if path.exists() {
        eprintln!("⚠️  .pairgrid.yaml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_yaml();
    std::fs::write(path, &content).context("Failed to write .pairgrid.yaml")?;

    println!("✅ Created .pairgrid.yaml with default settings.");
    println!("   Fill in gitlab.project_id and gitlab.token (or set GITLAB_TOKEN).");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that stdout carries only the rendered table.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the fetch, aggregate, render workflow.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let client = GitlabClient::new(&config.gitlab).context("Failed to create GitLab client")?;
    info!(
        "Reading milestones of project {} from {}",
        config.gitlab.project_id, config.gitlab.root_uri
    );

    let spinner = (!args.quiet).then(make_spinner);
    let collected =
        analysis::collect_assignments(&client, &config.analysis.milestones, spinner.as_ref()).await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let batch = collected.context("Failed to fetch issues from GitLab")?;

    let normalize = config.analysis.normalize_order;
    let tally = analysis::build_tally(&batch, normalize);
    info!(
        "Aggregated {} pairs and {} groups into {} names",
        batch.pairs.len(),
        batch.groups.len(),
        tally.len()
    );
    if tally.is_empty() {
        warn!("No issues with two or more assignees were found");
    }

    let output = match config.report.format {
        OutputFormat::Table => report::render_markdown_table(tally.names(), &tally.rows()),
        OutputFormat::Json => {
            let report = PairingReport {
                metadata: ReportMetadata {
                    project: config.gitlab.project_id.to_string(),
                    root_uri: config.gitlab.root_uri.clone(),
                    generated_at: Utc::now(),
                    milestones: batch.milestones.clone(),
                    issues_scanned: batch.issues_seen,
                    pair_issues: batch.pairs.len(),
                    group_issues: batch.groups.len(),
                    normalized: normalize,
                },
                names: tally.names().to_vec(),
                matrix: tally.rows(),
            };
            report::generate_json_report(&report)?
        }
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;

            if !args.quiet {
                println!("\n📊 Pairing Summary:");
                println!("   Milestones: {}", batch.milestones.len());
                println!("   Issues scanned: {}", batch.issues_seen);
                println!(
                    "   Pair issues: {} | Group issues: {}",
                    batch.pairs.len(),
                    batch.groups.len()
                );
                println!();
                println!(
                    "{}",
                    report::generate_summary_text(&tally, config.report.top_pairs)
                );
                println!(
                    "\n✅ Done in {:.1}s. Output saved to: {}",
                    start_time.elapsed().as_secs_f64(),
                    path.display()
                );
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Spinner shown on stderr while milestones are fetched.
fn make_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching milestones");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default locations
    match Config::load_default(Path::new(".")) {
        Ok(Some(config)) => {
            info!("Loaded default config from the current directory");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
