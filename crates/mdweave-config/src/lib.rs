//! Configuration management for mdweave.
//!
//! Parses `mdweave.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [include]
//! max_depth = 50
//!
//! [diagrams]
//! cache_dir = "build"
//! cache_enabled = true
//! mermaid_bin = "~/.npm/bin/mmdc"
//! plantuml_bin = "java -jar ${PLANTUML_JAR}"
//! mermaid_scale = 4
//! timeout_secs = 120
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.cache_dir`
//! - `diagrams.mermaid_bin`
//! - `diagrams.plantuml_bin`
//!
//! Renderer executables not set in the file fall back to the `MERMAID_BIN`
//! and `PLANTUML_BIN` environment variables, then to `mmdc` and `plantuml`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override include nesting bound.
    pub max_include_depth: Option<usize>,
    /// Override artifact cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdweave.toml";

const DEFAULT_MAX_DEPTH: usize = 50;
const DEFAULT_MERMAID_SCALE: u32 = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_MERMAID_SCALE: u32 = 16;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Include resolution configuration.
    pub include: IncludeConfig,
    /// Diagram rendering configuration (paths are relative strings from TOML).
    diagrams: DiagramsConfigRaw,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Include resolution configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IncludeConfig {
    /// Maximum include nesting before resolution fails as cyclic.
    pub max_depth: usize,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    cache_dir: Option<String>,
    cache_enabled: Option<bool>,
    mermaid_bin: Option<String>,
    plantuml_bin: Option<String>,
    mermaid_scale: Option<u32>,
    timeout_secs: Option<u64>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Root of the artifact store (`mermaid-images/`, `plantuml-images/`).
    pub cache_dir: PathBuf,
    /// Whether existing artifacts are reused.
    pub cache_enabled: bool,
    /// Mermaid CLI executable.
    pub mermaid_bin: String,
    /// `PlantUML` command line, split on whitespace when run.
    pub plantuml_bin: String,
    /// Mermaid `--scale` factor.
    pub mermaid_scale: u32,
    /// Per-invocation renderer timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl DiagramsConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            cache_dir: base.to_path_buf(),
            cache_enabled: true,
            mermaid_bin: "mmdc".to_owned(),
            plantuml_bin: "plantuml".to_owned(),
            mermaid_scale: DEFAULT_MERMAID_SCALE,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
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
        /// Config field path (e.g., "`diagrams.plantuml_bin`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_JAR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdweave.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated after the overrides.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, &process_env)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, &process_env)?
        } else {
            let cwd = std::env::current_dir().unwrap_or_default();
            let mut config = Self::default_with_base(&cwd);
            config.resolve(&cwd, &process_env)?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(depth) = settings.max_include_depth {
            self.include.max_depth = depth;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.diagrams_resolved.cache_dir.clone_from(cache_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.diagrams_resolved.cache_enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            include: IncludeConfig::default(),
            diagrams: DiagramsConfigRaw::default(),
            diagrams_resolved: DiagramsConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(
        path: &Path,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        config.resolve(config_dir, env)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.include.max_depth == 0 {
            return Err(ConfigError::Validation(
                "include.max_depth must be at least 1".to_owned(),
            ));
        }

        let diagrams = &self.diagrams_resolved;
        if !(1..=MAX_MERMAID_SCALE).contains(&diagrams.mermaid_scale) {
            return Err(ConfigError::Validation(format!(
                "diagrams.mermaid_scale must be between 1 and {MAX_MERMAID_SCALE}"
            )));
        }
        require_non_empty(&diagrams.mermaid_bin, "diagrams.mermaid_bin")?;
        require_non_empty(&diagrams.plantuml_bin, "diagrams.plantuml_bin")?;

        Ok(())
    }

    /// Expand environment variables and resolve relative paths against
    /// `config_dir`, filling [`Config::diagrams_resolved`].
    fn resolve(
        &mut self,
        config_dir: &Path,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let raw = &self.diagrams;
        let expand_field = |value: &Option<String>, field: &str| {
            value
                .as_deref()
                .map(|v| expand::expand_env_with(v, field, env))
                .transpose()
        };

        let cache_dir = expand_field(&raw.cache_dir, "diagrams.cache_dir")?
            .map_or_else(|| config_dir.to_path_buf(), |dir| config_dir.join(dir));
        let mermaid_bin = expand_field(&raw.mermaid_bin, "diagrams.mermaid_bin")?
            .or_else(|| env("MERMAID_BIN"))
            .unwrap_or_else(|| "mmdc".to_owned());
        let plantuml_bin = expand_field(&raw.plantuml_bin, "diagrams.plantuml_bin")?
            .or_else(|| env("PLANTUML_BIN"))
            .unwrap_or_else(|| "plantuml".to_owned());
        let timeout = match raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        self.diagrams_resolved = DiagramsConfig {
            cache_dir,
            cache_enabled: raw.cache_enabled.unwrap_or(true),
            mermaid_bin: expand::expand_tilde(&mermaid_bin),
            plantuml_bin: expand::expand_tilde(&plantuml_bin),
            mermaid_scale: raw.mermaid_scale.unwrap_or(DEFAULT_MERMAID_SCALE),
            timeout,
        };

        Ok(())
    }
}
