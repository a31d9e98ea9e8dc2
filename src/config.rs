//! Configuration management and validation.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides applied by the
//! CLI layer. The civic API key only ever arrives through the file or the
//! environment.

use crate::app::services::time_analysis::MalformedTimestampPolicy;
use crate::constants::{self, ENV_CIVIC_API_BASE_URL, ENV_CIVIC_API_KEY};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Roster input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub roster_path: PathBuf,
    /// Whether the first CSV row names the columns
    pub has_header_row: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from(constants::DEFAULT_ROSTER_PATH),
            has_header_row: true,
        }
    }
}

/// Where the three artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root that the directories below are resolved against
    pub root: PathBuf,
    pub letters_dir: PathBuf,
    pub phone_list_dir: PathBuf,
    pub time_overview_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            letters_dir: PathBuf::from(constants::DEFAULT_LETTERS_DIR),
            phone_list_dir: PathBuf::from(constants::DEFAULT_PHONE_LIST_DIR),
            time_overview_dir: PathBuf::from(constants::DEFAULT_TIME_OVERVIEW_DIR),
        }
    }
}

/// Template file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub dir: PathBuf,
    pub form_letter: String,
    pub phone_list: String,
    pub time_overview: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_TEMPLATES_DIR),
            form_letter: constants::FORM_LETTER_TEMPLATE.to_string(),
            phone_list: constants::PHONE_LIST_TEMPLATE.to_string(),
            time_overview: constants::TIME_OVERVIEW_TEMPLATE.to_string(),
        }
    }
}

impl TemplateConfig {
    pub fn form_letter_path(&self) -> PathBuf {
        self.dir.join(&self.form_letter)
    }

    pub fn phone_list_path(&self) -> PathBuf {
        self.dir.join(&self.phone_list)
    }

    pub fn time_overview_path(&self) -> PathBuf {
        self.dir.join(&self.time_overview)
    }
}

/// Civic information service settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// API key; without one every lookup falls back
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: constants::DEFAULT_CIVIC_API_BASE_URL.to_string(),
        }
    }
}

// Keeps the key out of debug logs
impl std::fmt::Debug for LookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Registration time analysis settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub malformed_timestamps: MalformedTimestampPolicy,
}

/// Logging settings; `-v`/`-q` override the file, `RUST_LOG` overrides both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
    /// Errors only, no progress bar or summary
    pub quiet: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            quiet: false,
        }
    }
}

/// Complete configuration for a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
    pub lookup: LookupConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location (`<config dir>/event-manager/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("could not determine user config directory"))?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("invalid configuration file: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the config file if given, then the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        debug!("Layered configuration: {:?}", config);
        Ok(config)
    }

    /// Apply environment overrides read through `lookup_env`
    pub fn apply_env(&mut self, lookup_env: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup_env(ENV_CIVIC_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.lookup.api_key = Some(key);
        }
        if let Some(url) = lookup_env(ENV_CIVIC_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.lookup.base_url = url;
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.input.roster_path.as_os_str().is_empty() {
            return Err(Error::configuration("roster path cannot be empty"));
        }

        let dirs = [
            ("letters_dir", &self.output.letters_dir),
            ("phone_list_dir", &self.output.phone_list_dir),
            ("time_overview_dir", &self.output.time_overview_dir),
        ];
        for (name, dir) in dirs {
            if dir.as_os_str().is_empty() {
                return Err(Error::configuration(format!("output.{} cannot be empty", name)));
            }
            if dir.is_absolute() || dir.components().any(|c| c == Component::ParentDir) {
                return Err(Error::configuration(format!(
                    "output.{} must be relative to output.root, got '{}'",
                    name,
                    dir.display()
                )));
            }
        }

        let templates = [
            ("form_letter", &self.templates.form_letter),
            ("phone_list", &self.templates.phone_list),
            ("time_overview", &self.templates.time_overview),
        ];
        for (name, file) in templates {
            if file.trim().is_empty() {
                return Err(Error::configuration(format!("templates.{} cannot be empty", name)));
            }
        }

        if !self.lookup.base_url.starts_with("http://") && !self.lookup.base_url.starts_with("https://")
        {
            return Err(Error::configuration(format!(
                "lookup.base_url must be an http(s) URL, got '{}'",
                self.lookup.base_url
            )));
        }

        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_standard_layout() {
        let config = Config::default();

        assert_eq!(config.input.roster_path, PathBuf::from("event_attendees.csv"));
        assert!(config.input.has_header_row);
        assert_eq!(config.output.letters_dir, PathBuf::from("output"));
        assert_eq!(config.output.phone_list_dir, PathBuf::from("phone_list"));
        assert_eq!(config.output.time_overview_dir, PathBuf::from("time_overview"));
        assert_eq!(
            config.templates.form_letter_path(),
            PathBuf::from("templates/form_letter.html")
        );
        assert_eq!(config.lookup.api_key, None);
        assert_eq!(
            config.analysis.malformed_timestamps,
            MalformedTimestampPolicy::Abort
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [lookup]
            api_key = "from-file"

            [analysis]
            malformed_timestamps = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookup.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.lookup.base_url, constants::DEFAULT_CIVIC_API_BASE_URL);
        assert_eq!(config.analysis.malformed_timestamps, MalformedTimestampPolicy::Skip);
        assert_eq!(config.output.letters_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_from_file_and_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nroot = \"/tmp/event\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output.root, PathBuf::from("/tmp/event"));

        let err = Config::from_toml_str("[output\nroot = 1").unwrap_err();
        assert_eq!(err.exit_code(), 6);

        let err = Config::from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let mut config = Config::default();
        config.lookup.api_key = Some("from-file".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CIVIC_API_KEY, "from-env"),
            (ENV_CIVIC_API_BASE_URL, "http://localhost:8080/civicinfo/v2"),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.lookup.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.lookup.base_url, "http://localhost:8080/civicinfo/v2");
    }

    #[test]
    fn test_blank_environment_values_are_ignored() {
        let mut config = Config::default();
        config.lookup.api_key = Some("from-file".to_string());

        config.apply_env(|_| Some("  ".to_string()));

        assert_eq!(config.lookup.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.lookup.base_url, constants::DEFAULT_CIVIC_API_BASE_URL);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.output.letters_dir = PathBuf::from("/abs/output");
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.templates.phone_list = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lookup.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.phone_list_dir = PathBuf::from("../phones");
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_section_is_read_from_toml() {
        let config = Config::from_toml_str("[logging]\nlevel = \"debug\"\nquiet = true").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.quiet);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let lookup = LookupConfig {
            api_key: Some("secret-key".to_string()),
            ..LookupConfig::default()
        };
        let debug = format!("{:?}", lookup);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
