//! Configuration management for rawpaste.
//!
//! Parses `rawpaste.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [paste]
//! mode = "auto"              # auto | inline | blocks
//! tag_name = "p"             # target tag hint for inline detection
//! allow_embedded_frames = false
//! block_delimiter = "<!-- wp:"
//!
//! [markdown]
//! tables = true
//! strikethrough = false
//! simple_line_breaks = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rawpaste.toml";

/// Default marker announcing already-serialized blocks.
pub const DEFAULT_BLOCK_DELIMITER: &str = "<!-- wp:";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Paste handling configuration.
    pub paste: PasteConfig,
    /// Markdown conversion configuration.
    pub markdown: MarkdownConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// How pasted content is handled when the caller does not say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// Decide based on the content.
    #[default]
    Auto,
    /// Always return sanitized inline markup.
    Inline,
    /// Always return blocks.
    Blocks,
}

/// Paste handling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PasteConfig {
    /// Default handling mode.
    pub mode: ModeSetting,
    /// Tag the content will be inserted into, if known.
    pub tag_name: Option<String>,
    /// Whether `iframe` survives inside figures.
    pub allow_embedded_frames: bool,
    /// Marker that hands the input to the serialized block parser.
    pub block_delimiter: String,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            mode: ModeSetting::Auto,
            tag_name: None,
            allow_embedded_frames: false,
            block_delimiter: DEFAULT_BLOCK_DELIMITER.to_owned(),
        }
    }
}

/// Markdown conversion configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GFM tables.
    pub tables: bool,
    /// Enable `~~strikethrough~~`.
    pub strikethrough: bool,
    /// Render single newlines as `<br>`.
    pub simple_line_breaks: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: false,
            simple_line_breaks: true,
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rawpaste.toml` in current directory and
    /// parents, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        match Self::discover_config() {
            Some(discovered) => Self::load_from_file(&discovered),
            None => Ok(Self::default()),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
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
        self.validate_paste()
    }

    fn validate_paste(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.paste.block_delimiter, "paste.block_delimiter")?;

        if let Some(tag) = &self.paste.tag_name {
            require_non_empty(tag, "paste.tag_name")?;
            if !tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return Err(ConfigError::Validation(format!(
                    "paste.tag_name must be a lowercase tag name, got '{tag}'"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paste.mode, ModeSetting::Auto);
        assert_eq!(config.paste.tag_name, None);
        assert!(!config.paste.allow_embedded_frames);
        assert_eq!(config.paste.block_delimiter, "<!-- wp:");
        assert!(config.markdown.tables);
        assert!(!config.markdown.strikethrough);
        assert!(config.markdown.simple_line_breaks);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paste.mode, ModeSetting::Auto);
        assert_eq!(config.paste.block_delimiter, "<!-- wp:");
    }

    #[test]
    fn test_parse_paste_config() {
        let toml = r#"
[paste]
mode = "inline"
tag_name = "h2"
allow_embedded_frames = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paste.mode, ModeSetting::Inline);
        assert_eq!(config.paste.tag_name.as_deref(), Some("h2"));
        assert!(config.paste.allow_embedded_frames);
        assert_eq!(config.paste.block_delimiter, "<!-- wp:");
    }

    #[test]
    fn test_parse_markdown_config() {
        let toml = r"
[markdown]
tables = false
strikethrough = true
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.markdown.tables);
        assert!(config.markdown.strikethrough);
        assert!(config.markdown.simple_line_breaks);
    }

    #[test]
    fn test_parse_invalid_mode() {
        let toml = r#"
[paste]
mode = "sometimes"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_delimiter() {
        let mut config = Config::default();
        config.paste.block_delimiter = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("paste.block_delimiter"));
    }

    #[test]
    fn test_validate_tag_name() {
        let mut config = Config::default();
        config.paste.tag_name = Some("H2".to_owned());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.paste.tag_name = Some("h2".to_owned());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "[paste]\nmode = \"blocks\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.paste.mode, ModeSetting::Blocks);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rawpaste.toml");
        std::fs::write(&path, "[paste]\nblock_delimiter = \"\"\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&config_path, "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(config_path));
    }
}
