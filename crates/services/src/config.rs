use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// The service stops producing questions after this many per session.
pub const DEFAULT_MAX_QUESTIONS: u32 = 10;

/// Where and how to reach the interview service.
///
/// Layered lowest to highest: built-in defaults, the global
/// `interview-rehearsal/config.toml` in the user's config directory, an
/// explicit file, then `INTERVIEW_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout_secs: u64,
    pub token: Option<String>,
    pub max_questions: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

impl ServiceConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a file cannot be read or parsed, or if
    /// `path` is given but missing, and `ConfigError::Invalid` if the merged
    /// values are unusable.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(global_config_path(), path, true)
    }

    fn build(
        global: Option<PathBuf>,
        explicit: Option<&Path>,
        with_env: bool,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(global) = global {
            builder = builder.add_source(File::from(global).required(false));
        }
        if let Some(explicit) = explicit {
            builder = builder.add_source(File::from(explicit).required(true));
        }
        if with_env {
            builder = builder.add_source(Environment::with_prefix("INTERVIEW").try_parsing(true));
        }

        let config: ServiceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a non-HTTP base URL, a zero timeout
    /// or a zero question limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.max_questions == 0 {
            return Err(ConfigError::Invalid("max_questions must be positive".into()));
        }
        Ok(())
    }

    /// Base URL joined with the API prefix, without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let prefix = self.api_prefix.trim().trim_matches('/');
        if prefix.is_empty() {
            base.to_owned()
        } else {
            format!("{base}/{prefix}")
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Token from configuration, ignoring blank values.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// `$XDG_CONFIG_HOME/interview-rehearsal/config.toml` or the platform equivalent.
#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("interview-rehearsal").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_apply_without_files() {
        let config = ServiceConfig::build(None, None, false).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.api_base(), "http://localhost:8000/api/v1");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_questions, 10);
    }

    #[test]
    fn question_limit_is_configurable_but_positive() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("limit.toml");
        fs::write(&explicit, "max_questions = 5\n").unwrap();
        let config = ServiceConfig::build(None, Some(&explicit), false).unwrap();
        assert_eq!(config.max_questions, 5);

        fs::write(&explicit, "max_questions = 0\n").unwrap();
        let err = ServiceConfig::build(None, Some(&explicit), false).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn explicit_file_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(&global, "base_url = \"http://global:9000\"\ntimeout_secs = 5\n").unwrap();
        fs::write(&explicit, "base_url = \"https://interviews.example.com/\"\n").unwrap();

        let config = ServiceConfig::build(Some(global), Some(&explicit), false).unwrap();
        assert_eq!(config.base_url, "https://interviews.example.com/");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.api_base(), "https://interviews.example.com/api/v1");
    }

    #[test]
    fn missing_global_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::build(Some(dir.path().join("absent.toml")), None, false);
        assert!(config.is_ok());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let err = ServiceConfig::build(None, Some(&absent), false).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.toml");
        fs::write(&explicit, "base_url = \"ftp://example.com\"\n").unwrap();

        let err = ServiceConfig::build(None, Some(&explicit), false).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let config = ServiceConfig {
            token: Some("   ".into()),
            ..ServiceConfig::default()
        };
        assert_eq!(config.token(), None);
    }

    #[test]
    fn empty_prefix_uses_bare_base_url() {
        let config = ServiceConfig {
            api_prefix: String::new(),
            ..ServiceConfig::default()
        };
        assert_eq!(config.api_base(), "http://localhost:8000");
    }
}
