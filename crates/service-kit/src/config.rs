//! Layered configuration loading.
//!
//! Sources are applied lowest priority first: defaults from the target
//! type's `Deserialize` impl, then at most one config file, then the process
//! environment (which may itself have been seeded from `.env` files).

use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use crate::logging::{init_logging, LogFormat};

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// A config file was requested but does not exist.
    NotFound(PathBuf),
    /// Sources were read but could not be merged or deserialized.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config file not found: {}", path.display()),
            Self::Parse(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    DotEnv,
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "env" => Some(Self::DotEnv),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// `.env`, `.env.local`, `env` and friends carry no usable extension.
    fn is_dotenv_name(path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name == "env" || name.starts_with(".env"))
    }
}

/// Configuration builder.
///
/// ```ignore
/// use service_kit::ConfigBuilder;
///
/// let config: MyConfig = ConfigBuilder::new()
///     .with_dotenv()
///     .with_config_file_from_env("CONFIG_FILE")
///     .with_logging_from_env()
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    load_default_dotenv: bool,
    config_files: Vec<PathBuf>,
    #[cfg(feature = "tracing")]
    init_logging: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the process environment from `./.env` when it exists.
    pub fn with_dotenv(mut self) -> Self {
        self.load_default_dotenv = true;
        self
    }

    /// Add a config file.
    ///
    /// Dotenv files are loaded into the environment (any number of them).
    /// Of the `.toml` / `.yaml` / `.json` files, the last one added is used.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Like [`with_config_file`](Self::with_config_file) with the path taken
    /// from the environment variable `var`. Unset or empty means no file.
    pub fn with_config_file_from_env(self, var: &str) -> Self {
        match std::env::var(var) {
            Ok(path) if !path.trim().is_empty() => self.with_config_file(path.trim()),
            _ => self,
        }
    }

    /// Initialize logging from `LOG_FORMAT` / `RUST_LOG` before
    /// deserializing, so fallbacks taken while loading are logged.
    #[cfg(feature = "tracing")]
    pub fn with_logging_from_env(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Load and deserialize.
    ///
    /// Reads the live process environment, so tests that set variables
    /// must hold `tests::ENV_LOCK` while they build.
    pub fn build<C: DeserializeOwned>(self) -> Result<C, ConfigError> {
        if self.load_default_dotenv {
            let _ = dotenvy::dotenv();
        }

        let mut main_file: Option<&PathBuf> = None;
        for path in &self.config_files {
            match ConfigFormat::from_path(path) {
                Some(ConfigFormat::DotEnv) => load_dotenv(path),
                Some(_) => main_file = Some(path),
                None if ConfigFormat::is_dotenv_name(path) => load_dotenv(path),
                None => tracing::warn!(path = %path.display(), "ignoring config file with unknown format"),
            }
        }

        #[cfg(feature = "tracing")]
        if self.init_logging {
            init_logging(LogFormat::from_env(), "info");
        }

        match main_file {
            Some(path) => load_config_file(path),
            None => load_from_env(),
        }
    }
}

fn load_dotenv(path: &Path) {
    if path.exists() {
        if let Err(err) = dotenvy::from_path(path) {
            tracing::warn!(path = %path.display(), error = %err, "failed to load dotenv file");
        }
    }
}

/// Deserialize `C` from the process environment only.
pub fn load_from_env<C: DeserializeOwned>() -> Result<C, ConfigError> {
    let config = config::Config::builder().add_source(EnvSource).build()?;
    Ok(config.try_deserialize()?)
}

/// Deserialize `C` from `path`, with the environment layered on top.
pub fn load_config_file<C: DeserializeOwned>(path: &Path) -> Result<C, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(EnvSource)
        .build()?;
    Ok(config.try_deserialize()?)
}

/// Process environment with `ENVIRONMENT` / `APP_ENV` / `RUST_ENV` folded
/// into the `environment` key.
#[derive(Debug, Clone)]
struct EnvSource;

impl config::Source for EnvSource {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        use config::{Environment, Value, ValueKind};

        let mut map = Environment::default()
            .separator("__")
            .try_parsing(true)
            .collect()?;

        if !map.contains_key("environment") {
            if let Some(env) = crate::Environment::try_from_env() {
                map.insert(
                    "environment".to_string(),
                    Value::new(None, ValueKind::String(env.as_str().to_string())),
                );
            }
        }

        Ok(map)
    }
}
