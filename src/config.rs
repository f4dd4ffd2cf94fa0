//! Configuration for the audit policy.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (NARRATIVE_AUDIT_MODE, NARRATIVE_AUDIT_TOLERANCE,
//!    NARRATIVE_AUDIT_SCHEMA_VERSION)
//! 2. Config file (.narrative-audit/config.yaml)
//! 3. Defaults (strict mode, schema 2.0.0)
//!
//! Config file discovery:
//! - Searches current directory and parents for .narrative-audit/config.yaml
//! - Falls back to ~/.narrative-audit/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::domain::{AuditPolicy, ExtractionMode};
use crate::schema::SCHEMA_VERSION;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".narrative-audit";
const CONFIG_FILE: &str = "config.yaml";

pub const ENV_MODE: &str = "NARRATIVE_AUDIT_MODE";
pub const ENV_TOLERANCE: &str = "NARRATIVE_AUDIT_TOLERANCE";
pub const ENV_SCHEMA_VERSION: &str = "NARRATIVE_AUDIT_SCHEMA_VERSION";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// "strict" or "lenient"
    pub mode: Option<String>,
    /// Percentage tolerance as a fraction (0.0005 = 0.05 points)
    pub percent_tolerance: Option<f64>,
    pub number_relative_tolerance: Option<f64>,
    pub number_min_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    pub expected_version: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Policy every audit runs under
    pub policy: AuditPolicy,
    /// Schema version documents must declare
    pub expected_schema_version: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            policy: AuditPolicy::default(),
            expected_schema_version: SCHEMA_VERSION.to_string(),
            config_file: None,
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|path| path.exists())
}

/// Config file in the user's home directory, if present
fn home_config_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn check_tolerance(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a finite non-negative number, got {}", name, value);
    }
    Ok(value)
}

fn parse_mode(name: &str, value: &str) -> Result<ExtractionMode> {
    ExtractionMode::parse(value)
        .with_context(|| format!("{}: unknown audit mode '{}'", name, value))
}

/// Merge file settings and environment overrides over the defaults
fn resolve_config<F>(
    config_file: Option<PathBuf>,
    file: Option<ConfigFile>,
    env: F,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let audit = file.as_ref().map(|f| f.audit.clone()).unwrap_or_default();

    // Mode picks the baseline tolerances; explicit values override them
    let mode = if let Some(env_mode) = env(ENV_MODE) {
        parse_mode(ENV_MODE, &env_mode)?
    } else if let Some(ref file_mode) = audit.mode {
        parse_mode("audit.mode", file_mode)?
    } else {
        ExtractionMode::default()
    };
    let mut policy = AuditPolicy::for_mode(mode);

    if let Some(env_tol) = env(ENV_TOLERANCE) {
        let value: f64 = env_tol
            .trim()
            .parse()
            .with_context(|| format!("{}: invalid tolerance '{}'", ENV_TOLERANCE, env_tol))?;
        policy.percent_tolerance = check_tolerance(ENV_TOLERANCE, value)?;
    } else if let Some(value) = audit.percent_tolerance {
        policy.percent_tolerance = check_tolerance("audit.percent_tolerance", value)?;
    }

    if let Some(value) = audit.number_relative_tolerance {
        policy.number_relative_tolerance =
            check_tolerance("audit.number_relative_tolerance", value)?;
    }
    if let Some(value) = audit.number_min_tolerance {
        policy.number_min_tolerance = check_tolerance("audit.number_min_tolerance", value)?;
    }

    let expected_schema_version = env(ENV_SCHEMA_VERSION)
        .or_else(|| file.and_then(|f| f.schema.expected_version))
        .unwrap_or_else(|| SCHEMA_VERSION.to_string());

    Ok(ResolvedConfig {
        policy,
        expected_schema_version,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file(&cwd))
        .or_else(home_config_file);

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    let context = match config_file {
        Some(ref path) => format!("Invalid configuration in {}", path.display()),
        None => "Invalid configuration in environment".to_string(),
    };

    resolve_config(config_file, file, |key| std::env::var(key).ok()).context(context)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
