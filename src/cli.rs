//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Pairgrid - who-works-with-whom matrices from GitLab milestones
///
/// Walks every milestone of a GitLab project, looks at which people were
/// assigned together on issues, and prints a symmetric co-occurrence table.
///
/// Examples:
///   pairgrid --project-id 1234
///   pairgrid --project-id group/app --milestone "Sprint 4,Sprint 5"
///   pairgrid --format json --output pairs.json
///   pairgrid --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file (YAML or TOML)
    ///
    /// If not specified, looks for .pairgrid.yaml, .pairgrid.yml or
    /// .pairgrid.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitLab API root URL (e.g. https://gitlab.com/api/v4/)
    #[arg(long, value_name = "URL", env = "GITLAB_URL")]
    pub root_uri: Option<String>,

    /// Project id or namespace/project path
    #[arg(short, long, value_name = "ID", env = "GITLAB_PROJECT")]
    pub project_id: Option<String>,

    /// Personal access token sent as PRIVATE-TOKEN
    #[arg(long, value_name = "TOKEN", env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Only process these milestones (comma-separated or repeated)
    #[arg(short, long, value_name = "TITLE", value_delimiter = ',')]
    pub milestone: Option<Vec<String>>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Treat [A, B] and [B, A] as the same assignment when counting
    #[arg(long)]
    pub normalize_order: bool,

    /// Number of top pairings to list in the summary
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Page size for GitLab list requests (1-100)
    #[arg(long, value_name = "N")]
    pub per_page: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .pairgrid.yaml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref root) = self.root_uri {
            if !root.starts_with("http://") && !root.starts_with("https://") {
                return Err("GitLab URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(per_page) = self.per_page {
            if !(1..=100).contains(&per_page) {
                return Err("--per-page must be between 1 and 100".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if let Some(ref milestones) = self.milestone {
            if milestones.iter().any(|m| m.trim().is_empty()) {
                return Err("Milestone titles cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
