//! Configuration management for docfence.
//!
//! Parses `docfence.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Host settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `snippets.source_dir`
//! - `snippets.not_found_message`
//! - `directives.document_id_salt`
//! - `tabs.id_prefix`
//!
//! Expansion runs before validation, so an expanded `tabs.id_prefix` must
//! still be a valid id prefix.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Host settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the directory snippet paths are resolved against.
    pub source_dir: Option<PathBuf>,
    /// Override the dedent applied when a snippet query gives none.
    pub default_dedent: Option<i32>,
    /// Override the salt mixed into generated tab and image ids.
    pub document_id_salt: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docfence.toml";

/// Placeholder text rendered when a snippet cannot be resolved.
const DEFAULT_NOT_FOUND_MESSAGE: &str = "Code snippet not found";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snippet configuration (paths are relative strings from TOML).
    #[serde(default)]
    snippets: SnippetsConfigRaw,
    /// Directive rendering configuration.
    pub directives: DirectivesConfig,
    /// Tab group configuration.
    pub tabs: TabsConfig,

    /// Resolved snippet configuration (set after loading).
    #[serde(skip)]
    pub snippets_resolved: SnippetsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw snippet configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SnippetsConfigRaw {
    source_dir: Option<String>,
    default_dedent: Option<i32>,
    not_found_message: Option<String>,
}

/// Resolved snippet configuration with absolute paths.
#[derive(Debug)]
pub struct SnippetsConfig {
    /// Directory relative snippet paths are resolved against.
    pub source_dir: PathBuf,
    /// Dedent used when a query has none. `None` or negative means auto.
    pub default_dedent: Option<i32>,
    /// Text of the placeholder block for unresolved snippets.
    pub not_found_message: String,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            default_dedent: None,
            not_found_message: DEFAULT_NOT_FOUND_MESSAGE.to_owned(),
        }
    }
}

/// Directive rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DirectivesConfig {
    /// Salt mixed into the hash that derives tab group and image ids.
    pub document_id_salt: String,
    /// Largest accepted `max-width` for `:::video`, in pixels.
    pub max_video_width: u32,
}

impl Default for DirectivesConfig {
    fn default() -> Self {
        Self {
            document_id_salt: String::new(),
            max_video_width: 3840,
        }
    }
}

/// Tab group configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Prefix of generated tab group ids.
    pub id_prefix: String,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            id_prefix: "tabgroup_".to_owned(),
        }
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
    /// A `${VAR}` reference without fallback names an unset variable.
    #[error("Cannot expand ${{{var}}} in {key}: {source}")]
    EnvVar {
        /// Dotted config key, e.g. `tabs.id_prefix`.
        key: &'static str,
        var: String,
        source: std::env::VarError,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional host settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docfence.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.snippets_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(dedent) = settings.default_dedent {
            self.snippets_resolved.default_dedent = Some(dedent);
        }
        if let Some(salt) = &settings.document_id_salt {
            self.directives.document_id_salt.clone_from(salt);
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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            snippets: SnippetsConfigRaw::default(),
            directives: DirectivesConfig::default(),
            tabs: TabsConfig::default(),
            snippets_resolved: SnippetsConfig {
                source_dir: base.to_path_buf(),
                ..SnippetsConfig::default()
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
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
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(
            &self.snippets_resolved.not_found_message,
            "snippets.not_found_message",
        )?;
        require_non_empty(&self.tabs.id_prefix, "tabs.id_prefix")?;

        if !self
            .tabs
            .id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(
                "tabs.id_prefix may only contain ASCII letters, digits, '-' and '_'".to_owned(),
            ));
        }

        if self.directives.max_video_width == 0 {
            return Err(ConfigError::Validation(
                "directives.max_video_width must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let snippets = &mut self.snippets;
        let optional = [
            ("snippets.source_dir", snippets.source_dir.as_mut()),
            ("snippets.not_found_message", snippets.not_found_message.as_mut()),
        ];
        let fields = optional
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .chain([
                ("directives.document_id_salt", &mut self.directives.document_id_salt),
                ("tabs.id_prefix", &mut self.tabs.id_prefix),
            ]);
        expand::expand_fields(fields, |var: &str| std::env::var(var))
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.snippets_resolved = SnippetsConfig {
            source_dir: config_dir.join(self.snippets.source_dir.as_deref().unwrap_or(".")),
            default_dedent: self.snippets.default_dedent,
            not_found_message: self
                .snippets
                .not_found_message
                .clone()
                .unwrap_or_else(|| DEFAULT_NOT_FOUND_MESSAGE.to_owned()),
        };
    }
}
