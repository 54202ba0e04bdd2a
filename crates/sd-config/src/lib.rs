//! Configuration management for smalldoc.
//!
//! Parses `smalldoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.title`
//! - `drivers.search_paths`

mod expand;

use std::path::{Path, PathBuf};

use sd_markup::Markup;
use sd_output::{DEFAULT_TITLE, OutputFormat};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config. Search paths given on
/// the command line are searched before the configured ones.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override document title.
    pub title: Option<String>,
    /// Override default output format.
    pub format: Option<OutputFormat>,
    /// Extra search paths.
    pub search_paths: Vec<PathBuf>,
    /// Override docstring markup.
    pub markup: Option<Markup>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "smalldoc.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output configuration as parsed from TOML.
    output: OutputConfigRaw,
    /// Driver configuration (paths are relative strings from TOML).
    drivers: DriversConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved driver configuration (set after loading).
    #[serde(skip)]
    pub drivers_resolved: DriversConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct OutputConfigRaw {
    title: Option<String>,
    format: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Title of generated pages.
    pub title: String,
    /// Format of outputs whose destination does not imply one.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            format: OutputFormat::Json,
        }
    }
}

/// Raw driver configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct DriversConfigRaw {
    search_paths: Vec<String>,
    markup: Option<Markup>,
}

/// Resolved driver configuration with absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriversConfig {
    /// Directories searched for inputs not found as given.
    pub search_paths: Vec<PathBuf>,
    /// Markup of documentation text in reflected snapshots.
    pub markup: Markup,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.title`").
        field: String,
        /// Error message (e.g., "${`DOC_TITLE`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `smalldoc.toml` in the current directory and
    /// its parents, falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing,
    /// expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(title) = &settings.title {
            self.output_resolved.title.clone_from(title);
        }
        if let Some(format) = settings.format {
            self.output_resolved.format = format;
        }
        if !settings.search_paths.is_empty() {
            let configured = std::mem::take(&mut self.drivers_resolved.search_paths);
            self.drivers_resolved.search_paths = settings
                .search_paths
                .iter()
                .cloned()
                .chain(configured)
                .collect();
        }
        if let Some(markup) = settings.markup {
            self.drivers_resolved.markup = markup;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the title is blank or a search
    /// path is not a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_resolved.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.title cannot be empty".to_owned(),
            ));
        }
        for path in &self.drivers_resolved.search_paths {
            if !path.is_dir() {
                return Err(ConfigError::Validation(format!(
                    "drivers.search_paths entry is not a directory: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref title) = self.output.title {
            self.output.title = Some(expand::expand_env(title, "output.title")?);
        }
        self.drivers.search_paths =
            expand::expand_all(&self.drivers.search_paths, "drivers.search_paths")?;
        Ok(())
    }

    /// Resolve raw values: parse the format and make search paths absolute
    /// against the config directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let format = match self.output.format.as_deref() {
            Some(name) => name.parse().map_err(|e: sd_output::ParseFormatError| {
                ConfigError::Validation(format!("output.format: {e}"))
            })?,
            None => OutputFormat::Json,
        };
        self.output_resolved = OutputConfig {
            title: self
                .output
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            format,
        };
        self.drivers_resolved = DriversConfig {
            search_paths: self
                .drivers
                .search_paths
                .iter()
                .map(|p| config_dir.join(p))
                .collect(),
            markup: self.drivers.markup.unwrap_or_default(),
        };
        Ok(())
    }
}
