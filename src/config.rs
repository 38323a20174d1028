//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pairgrid.yaml` (or `.yml` / `.toml`) files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File names searched in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [".pairgrid.yaml", ".pairgrid.yml", ".pairgrid.toml"];

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// GitLab connection settings.
    #[serde(default)]
    pub gitlab: GitlabConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Flat `rootURI` key from older config files.
    #[serde(default, rename = "rootURI", skip_serializing)]
    legacy_root_uri: Option<String>,

    /// Flat `projectID` key from older config files.
    #[serde(default, rename = "projectID", skip_serializing)]
    legacy_project_id: Option<ProjectId>,

    /// Flat `PAT` key from older config files.
    #[serde(default, rename = "PAT", skip_serializing)]
    legacy_token: Option<String>,
}

/// GitLab project identifier: numeric id or `namespace/project` path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Number(u64),
    Path(String),
}

impl Default for ProjectId {
    fn default() -> Self {
        ProjectId::Path(String::new())
    }
}

impl ProjectId {
    pub fn is_empty(&self) -> bool {
        matches!(self, ProjectId::Path(p) if p.trim().is_empty())
    }

    /// Form used in API paths; `/` in a project path is sent as `%2F`.
    pub fn encoded(&self) -> String {
        match self {
            ProjectId::Number(n) => n.to_string(),
            ProjectId::Path(p) => p.trim().replace('/', "%2F"),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Number(n) => write!(f, "{}", n),
            ProjectId::Path(p) => write!(f, "{}", p),
        }
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        match s.trim().parse::<u64>() {
            Ok(n) => ProjectId::Number(n),
            Err(_) => ProjectId::Path(s.trim().to_string()),
        }
    }
}

/// GitLab connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabConfig {
    /// API root, e.g. `https://gitlab.com/api/v4/`.
    #[serde(default = "default_root_uri")]
    pub root_uri: String,

    /// Project whose milestones are analyzed.
    #[serde(default)]
    pub project_id: ProjectId,

    /// Personal access token with `read_api` scope.
    #[serde(default)]
    pub token: String,

    /// Page size for list endpoints (GitLab caps this at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            root_uri: default_root_uri(),
            project_id: ProjectId::default(),
            token: String::new(),
            per_page: default_per_page(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_root_uri() -> String {
    "https://gitlab.com/api/v4/".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout() -> u64 {
    30
}

/// Analysis settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sort names inside each assignment before counting, so that
    /// `[Bob, Alice]` and `[Alice, Bob]` are the same pairing.
    #[serde(default)]
    pub normalize_order: bool,

    /// Only process these milestone titles (empty means all).
    #[serde(default)]
    pub milestones: Vec<String>,
}

/// Output format for the rendered matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Table,
    /// JSON document with names, matrix and metadata
    Json,
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// How many pairings the summary lists.
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_pairs: default_top_pairs(),
        }
    }
}

fn default_top_pairs() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// `.toml` files are parsed as TOML, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_yaml(&content)
        }
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty YAML document is null, not an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config.fold_legacy_keys())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config.fold_legacy_keys())
    }

    /// Move flat `rootURI` / `projectID` / `PAT` keys into the `gitlab` section.
    ///
    /// A value already set in the `gitlab` section wins over its flat key.
    fn fold_legacy_keys(mut self) -> Self {
        if let Some(root) = self.legacy_root_uri.take() {
            if self.gitlab.root_uri == default_root_uri() {
                self.gitlab.root_uri = root;
            } else if self.gitlab.root_uri != root {
                warn!("Ignoring rootURI; gitlab.root_uri is set");
            }
        }
        if let Some(project) = self.legacy_project_id.take() {
            if self.gitlab.project_id.is_empty() {
                self.gitlab.project_id = project;
            } else if self.gitlab.project_id != project {
                warn!("Ignoring projectID; gitlab.project_id is set");
            }
        }
        if let Some(token) = self.legacy_token.take() {
            if self.gitlab.token.trim().is_empty() {
                self.gitlab.token = token;
            } else if self.gitlab.token != token {
                warn!("Ignoring PAT; gitlab.token is set");
            }
        }
        self
    }

    /// Path of the first default config file present in `dir`, if any.
    pub fn find_default(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Try to load configuration from the default locations in `dir`.
    ///
    /// Returns `Ok(None)` if no file exists, `Err` if one exists but can't be parsed.
    pub fn load_default(dir: &Path) -> Result<Option<Self>> {
        match Self::find_default(dir) {
            Some(path) => Ok(Some(Self::load(&path)?)),
            None => Ok(None),
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref root) = args.root_uri {
            self.gitlab.root_uri = root.clone();
        }
        if let Some(ref project) = args.project_id {
            self.gitlab.project_id = ProjectId::from(project.as_str());
        }
        if let Some(ref token) = args.token {
            self.gitlab.token = token.clone();
        }
        if let Some(per_page) = args.per_page {
            self.gitlab.per_page = per_page;
        }
        if let Some(timeout) = args.timeout {
            self.gitlab.timeout_seconds = timeout;
        }

        if let Some(ref milestones) = args.milestone {
            self.analysis.milestones = milestones.clone();
        }
        if args.normalize_order {
            self.analysis.normalize_order = true;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(top) = args.top {
            self.report.top_pairs = top;
        }
    }

    /// Check that everything needed to reach GitLab is present.
    pub fn validate(&self) -> Result<()> {
        let gitlab = &self.gitlab;

        if !gitlab.root_uri.starts_with("http://") && !gitlab.root_uri.starts_with("https://") {
            bail!("GitLab root URI must start with 'http://' or 'https://'");
        }
        if gitlab.project_id.is_empty() {
            bail!("No GitLab project configured (set gitlab.project_id or --project-id)");
        }
        if gitlab.token.trim().is_empty() {
            bail!("No GitLab access token configured (set gitlab.token or GITLAB_TOKEN)");
        }
        if !(1..=100).contains(&gitlab.per_page) {
            bail!("per_page must be between 1 and 100");
        }
        if gitlab.timeout_seconds == 0 {
            bail!("Timeout must be at least 1 second");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_yaml() -> String {
        let config = Config::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| String::new())
    }
}
