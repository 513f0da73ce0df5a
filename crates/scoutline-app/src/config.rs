// Configuration loading and parsing (config/scoutline.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "scoutline.toml";

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

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// scoutline.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub directory: String,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    /// Reject snapshots carrying keys outside the tier's metric registry.
    #[serde(default)]
    pub strict_metric_keys: bool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Read, parse and validate `<base_dir>/config/scoutline.toml`. Nothing is
/// seeded here; see `load_config`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from the shipped `defaults/` templates.
///
/// Every default file without a counterpart in `config/` is copied over and
/// returned. Files already present are left as the operator edited them, and
/// `*.example` templates stay documentation only.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let seed_err = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(seed_err(format!(
                "no defaults/ or config/ directory under {}",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_err(format!("cannot create {}: {e}", config_dir.display())))?;

    let templates = std::fs::read_dir(&defaults_dir)
        .map_err(|e| seed_err(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut seeded = Vec::new();
    for template in templates {
        let template = template.map_err(|e| seed_err(format!("cannot list defaults: {e}")))?;
        let source = template.path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if Path::new(name).extension().is_some_and(|ext| ext == "example") {
            continue;
        }

        let target = config_dir.join(name);
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(seed_err(format!("cannot create {}: {e}", target.display()))),
        };
        let body = std::fs::read(&source)
            .map_err(|e| seed_err(format!("cannot read template {}: {e}", source.display())))?;
        std::io::Write::write_all(&mut dest, &body)
            .map_err(|e| seed_err(format!("cannot write {}: {e}", target.display())))?;
        seeded.push(target);
    }

    Ok(seeded)
}

/// Load `config/scoutline.toml` from the working directory, seeding it from
/// `defaults/` on first run.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
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
    let required: &[(&str, &str)] = &[
        ("database.path", config.database.path.as_str()),
        ("logging.directory", config.logging.directory.as_str()),
        ("logging.filter", config.logging.filter.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: field.to_string(),
                message: "must not be empty".into(),
            });
        }
    }
    Ok(())
}
