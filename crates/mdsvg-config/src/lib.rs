//! Configuration management for mdsvg.
//!
//! Parses `mdsvg.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The directory
//! holding the config file becomes the site root: the anchor for
//! `/img/` URL resolution and for every relative path in the file, so
//! behavior never depends on the ambient working directory.
//!
//! Path values may reference environment variables with `${VAR}` syntax.
//! CLI settings can be applied during load via [`CliSettings`].

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use expand::expand_env;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the URL suffix that marks images for inlining.
    pub suffix: Option<String>,
    /// Override the static asset directory.
    pub static_dir: Option<PathBuf>,
    /// Override the content directories to scan.
    pub content_dirs: Option<Vec<PathBuf>>,
    /// Override the output directory.
    pub out_dir: Option<PathBuf>,
    /// Override the failure policy.
    pub on_error: Option<OnError>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsvg.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inline transform configuration (paths are relative strings from TOML).
    inline: InlineConfigRaw,
    /// Content layout configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,

    /// Resolved inline transform configuration (set after loading).
    #[serde(skip)]
    pub inline_resolved: InlineConfig,
    /// Resolved content layout configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Site root directory (set after loading).
    ///
    /// The directory containing the config file, or the working
    /// directory when no file was found.
    #[serde(skip)]
    pub site_root: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// What to do when an image fails to inline.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Report failures and exit non-zero after processing everything.
    #[default]
    Fail,
    /// Report failures but exit zero.
    Warn,
}

/// Raw inline configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InlineConfigRaw {
    suffix: Option<String>,
    static_dir: Option<String>,
    on_error: Option<OnError>,
}

/// Resolved inline transform configuration with absolute paths.
#[derive(Debug)]
pub struct InlineConfig {
    /// URL suffix that marks an image for inlining.
    pub suffix: String,
    /// Static asset directory that `/img/` URLs resolve into.
    pub static_dir: PathBuf,
    /// Failure policy for images that cannot be inlined.
    pub on_error: OnError,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            suffix: ".inline.svg".to_owned(),
            static_dir: PathBuf::from("static"),
            on_error: OnError::Fail,
        }
    }
}

/// Raw content configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    dirs: Option<Vec<String>>,
    out_dir: Option<String>,
}

/// Resolved content layout configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directories scanned for markdown documents.
    pub dirs: Vec<PathBuf>,
    /// Directory the rendered output tree is written to.
    pub out_dir: PathBuf,
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
    /// Environment variable expansion error.
    #[error("Configuration error in {field}: {message}")]
    EnvVar { field: String, message: String },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsvg.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the effective configuration fails validation.
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

        // Validate the effective configuration, CLI overrides included
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(suffix) = &settings.suffix {
            self.inline_resolved.suffix.clone_from(suffix);
        }
        if let Some(static_dir) = &settings.static_dir {
            self.inline_resolved.static_dir.clone_from(static_dir);
        }
        if let Some(content_dirs) = &settings.content_dirs {
            self.content_resolved.dirs.clone_from(content_dirs);
        }
        if let Some(out_dir) = &settings.out_dir {
            self.content_resolved.out_dir.clone_from(out_dir);
        }
        if let Some(on_error) = settings.on_error {
            self.inline_resolved.on_error = on_error;
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            inline: InlineConfigRaw::default(),
            content: ContentConfigRaw::default(),
            inline_resolved: InlineConfig {
                static_dir: base.join("static"),
                ..InlineConfig::default()
            },
            content_resolved: ContentConfig {
                dirs: vec![base.join("docs")],
                out_dir: base.join("build"),
            },
            site_root: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid
    /// values. Called automatically by [`Config::load`] after CLI settings
    /// are applied, so it covers the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.inline_resolved.suffix, "inline.suffix")?;

        if let Some(static_dir) = &self.inline.static_dir {
            require_non_empty(static_dir, "inline.static_dir")?;
        }
        // An empty resolved static_dir can only come from a CLI override;
        // file values go through a join and never resolve to empty
        if self.inline_resolved.static_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "inline.static_dir cannot be empty".to_owned(),
            ));
        }

        if self.content_resolved.dirs.is_empty() {
            return Err(ConfigError::Validation(
                "content.dirs cannot be empty".to_owned(),
            ));
        }
        if let Some(dirs) = &self.content.dirs {
            for dir in dirs {
                require_non_empty(dir, "content.dirs")?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    ///
    /// The config directory becomes the site root. Absolute paths in the
    /// config are honored as-is; `Path::join` drops the base for them.
    /// `${VAR}` references in path values are expanded first.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve =
            |path: Option<&str>, default: &str, field: &str| -> Result<PathBuf, ConfigError> {
                match path {
                    Some(value) => Ok(config_dir.join(expand_env(value, field)?)),
                    None => Ok(config_dir.join(default)),
                }
            };

        self.inline_resolved = InlineConfig {
            suffix: self
                .inline
                .suffix
                .clone()
                .unwrap_or_else(|| ".inline.svg".to_owned()),
            static_dir: resolve(
                self.inline.static_dir.as_deref(),
                "static",
                "inline.static_dir",
            )?,
            on_error: self.inline.on_error.unwrap_or_default(),
        };

        self.content_resolved = ContentConfig {
            dirs: match &self.content.dirs {
                Some(dirs) => {
                    let mut resolved = Vec::with_capacity(dirs.len());
                    for dir in dirs {
                        resolved.push(config_dir.join(expand_env(dir, "content.dirs")?));
                    }
                    resolved
                }
                None => vec![config_dir.join("docs")],
            },
            out_dir: resolve(self.content.out_dir.as_deref(), "build", "content.out_dir")?,
        };

        self.site_root = config_dir.to_path_buf();
        Ok(())
    }
}
