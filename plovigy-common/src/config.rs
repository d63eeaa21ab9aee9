//! Configuration loading and setting resolution
//!
//! Every setting is resolved once at startup, following this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the tool warns and runs on defaults.
//! A TOML file that was explicitly named (command line or `PLOVIGY_CONFIG`)
//! must exist and parse.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "PLOVIGY_CONFIG";

/// Environment variable overriding the operator identity
pub const ENV_CODER: &str = "PLOVIGY_CODER";

/// Environment variable overriding the position ledger path
pub const ENV_LEDGER: &str = "PLOVIGY_LEDGER";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_NAME: &str = "plovigy.toml";

/// TOML configuration file contents
///
/// Every field is optional; unset fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Default operator identity written into the `coder` field
    #[serde(default)]
    pub coder: Option<String>,

    /// Position ledger file
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,

    /// Number of story characters scanned by the autocoder
    #[serde(default)]
    pub autocode_window: Option<usize>,

    /// Story wrap width on screen
    #[serde(default)]
    pub wrap_width: Option<usize>,

    /// Story lines shown before the text is truncated
    #[serde(default)]
    pub max_story_lines: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled-in defaults, used when no other source sets a value
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub coder: String,
    pub ledger_path: PathBuf,
    pub autocode_window: usize,
    pub wrap_width: usize,
    pub max_story_lines: usize,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            coder: "Parus Analytics".to_string(),
            ledger_path: PathBuf::from("FJTY.plovigy.filerecs.txt"),
            autocode_window: 256,
            wrap_width: 128,
            max_story_lines: 33,
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub coder: Option<String>,
    pub ledger_path: Option<PathBuf>,
}

/// Fully resolved settings; immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub coder: String,
    pub ledger_path: PathBuf,
    pub autocode_window: usize,
    pub wrap_width: usize,
    pub max_story_lines: usize,
    pub logging: LoggingConfig,
    /// TOML file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from command line, environment, TOML file and defaults
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let config_file = locate_config_file(overrides.config_path.as_deref())?;
        let toml_config = match &config_file {
            Some(path) => load_toml_config(path)?,
            None => TomlConfig::default(),
        };

        let mut settings = Self::resolve(
            overrides,
            &toml_config,
            std::env::var(ENV_CODER).ok(),
            std::env::var(ENV_LEDGER).ok().map(PathBuf::from),
        )?;
        settings.config_file = config_file;
        Ok(settings)
    }

    /// Report where the settings came from
    ///
    /// `load` runs before the subscriber exists, so the caller logs this
    /// once logging is up.
    pub fn log_source(&self) {
        match &self.config_file {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => warn!("No configuration file found, using built-in defaults"),
        }
    }

    /// Apply the priority order to already-gathered sources
    pub fn resolve(
        overrides: &CliOverrides,
        toml_config: &TomlConfig,
        env_coder: Option<String>,
        env_ledger: Option<PathBuf>,
    ) -> Result<Self> {
        let defaults = CompiledDefaults::default();

        let coder = overrides
            .coder
            .clone()
            .or(env_coder)
            .or_else(|| toml_config.coder.clone())
            .unwrap_or(defaults.coder);
        if coder.trim().is_empty() {
            return Err(Error::InvalidInput("coder identity must not be empty".to_string()));
        }

        let ledger_path = overrides
            .ledger_path
            .clone()
            .or(env_ledger)
            .or_else(|| toml_config.ledger_path.clone())
            .unwrap_or(defaults.ledger_path);

        let autocode_window = toml_config
            .autocode_window
            .unwrap_or(defaults.autocode_window);
        let wrap_width = toml_config.wrap_width.unwrap_or(defaults.wrap_width);
        let max_story_lines = toml_config
            .max_story_lines
            .unwrap_or(defaults.max_story_lines);

        if wrap_width < 32 {
            return Err(Error::Config(format!(
                "wrap_width must be at least 32 characters, got {}",
                wrap_width
            )));
        }
        if max_story_lines == 0 {
            return Err(Error::Config("max_story_lines must be at least 1".to_string()));
        }

        debug!(
            coder = %coder,
            ledger = %ledger_path.display(),
            autocode_window,
            wrap_width,
            max_story_lines,
            "Resolved settings"
        );

        Ok(Self {
            coder,
            ledger_path,
            autocode_window,
            wrap_width,
            max_story_lines,
            logging: toml_config.logging.clone(),
            config_file: None,
        })
    }
}

/// Find the TOML config file to use
///
/// Explicit locations (command line, then `PLOVIGY_CONFIG`) must exist.
/// Implicit locations (`./plovigy.toml`, then the per-user config dir)
/// are used only when present.
pub fn locate_config_file(cli_arg: Option<&Path>) -> Result<Option<PathBuf>> {
    let explicit = cli_arg
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from));

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let local = PathBuf::from(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(user_config_file().filter(|path| path.is_file()))
}

/// Per-user config file location for the platform
///
/// `~/.config/plovigy/config.toml` on Linux, the equivalent application
/// config directory elsewhere.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("plovigy").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse TOML {}: {}", path.display(), e))
    })
}
