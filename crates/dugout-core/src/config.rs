// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("no config/dashboard.toml and no shipped default at {path}")]
    MissingDefaults { path: PathBuf },

    #[error("failed to install default config at {path}: {source}")]
    InstallError {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub team: TeamConfig,
    pub qualification: QualificationConfig,
    pub performance: PerformanceConfig,
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire dashboard.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DashboardFile {
    team: TeamConfig,
    qualification: QualificationConfig,
    performance: PerformanceConfig,
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// The franchise the dashboard is built around.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Accent color handed through to the presentation layer.
    #[serde(default)]
    pub color: Option<String>,
}

/// Minimum-opportunity thresholds for joining the league ranking pool.
/// Both thresholds are inclusive.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QualificationConfig {
    pub min_pa: u32,
    pub min_ip: f64,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            min_pa: 50,
            min_ip: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PerformanceConfig {
    /// OPS+ / FIP- value that represents league average.
    pub baseline: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { baseline: 100.0 }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dashboard.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config_in()`, which installs the shipped default first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let dashboard_path = config_dir.join(CONFIG_FILE);
    let dashboard_text = read_file(&dashboard_path)?;
    let file: DashboardFile =
        toml::from_str(&dashboard_text).map_err(|e| ConfigError::ParseError {
            path: dashboard_path.clone(),
            source: e,
        })?;

    let config = Config {
        team: file.team,
        qualification: file.qualification,
        performance: file.performance,
        db_path: file.database.path,
    };

    validate(&config)?;

    Ok(config)
}

/// Install `defaults/dashboard.toml` as `config/dashboard.toml` when the
/// franchise has no config yet. Returns the installed path, or `None` when a
/// config was already in place. An existing config is never touched.
pub fn install_default_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let default = base_dir.join("defaults").join(CONFIG_FILE);
    if !default.is_file() {
        return Err(ConfigError::MissingDefaults { path: default });
    }
    let content = std::fs::read(&default).map_err(|e| ConfigError::InstallError {
        path: default.clone(),
        source: e,
    })?;

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::InstallError {
        path: config_dir.clone(),
        source: e,
    })?;

    // create_new: a config written between the check above and here wins.
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(ConfigError::InstallError { path: target, source: e }),
    };
    std::io::Write::write_all(&mut dest, &content).map_err(|e| ConfigError::InstallError {
        path: target.clone(),
        source: e,
    })?;

    Ok(Some(target))
}

/// Loads config relative to `base_dir`, copying defaults first.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = install_default_config(base_dir)? {
        tracing::info!("initialized {} from defaults", path.display());
    }
    load_config_from(base_dir)
}

impl Config {
    /// Resolve the database path against `base_dir` unless it is absolute.
    pub fn db_path_in(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.db_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.team.id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "team.id".into(),
            message: "must not be empty".into(),
        });
    }

    if config.qualification.min_pa == 0 {
        return Err(ConfigError::ValidationError {
            field: "qualification.min_pa".into(),
            message: "must be > 0".into(),
        });
    }

    let min_ip = config.qualification.min_ip;
    if !min_ip.is_finite() || min_ip <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "qualification.min_ip".into(),
            message: format!("must be > 0, got {min_ip}"),
        });
    }

    let baseline = config.performance.baseline;
    if !baseline.is_finite() || baseline <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "performance.baseline".into(),
            message: format!("must be > 0, got {baseline}"),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
