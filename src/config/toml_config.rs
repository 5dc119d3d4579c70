use crate::adapters::state_file::DEFAULT_STATE_FILE;
use crate::adapters::webhook::DEFAULT_EMBED_COLOR;
use crate::utils::error::{DigestError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    pub state: StateConfig,
    pub channels: ChannelsConfig,
    pub digest: Option<DigestSettings>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub directory: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Where each submission is announced.
    pub announcements: ChannelConfig,
    /// Where the per-day records live.
    pub overview: ChannelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSettings {
    pub embed_color: Option<u32>,
    pub scaffold_current_month: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl DigestConfig {
    /// Reads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DigestError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DigestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn state_directory(&self) -> &str {
        &self.state.directory
    }

    pub fn state_file_name(&self) -> &str {
        self.state.file_name.as_deref().unwrap_or(DEFAULT_STATE_FILE)
    }

    pub fn embed_color(&self) -> u32 {
        self.digest
            .as_ref()
            .and_then(|d| d.embed_color)
            .unwrap_or(DEFAULT_EMBED_COLOR)
    }

    pub fn scaffold_current_month(&self) -> bool {
        self.digest
            .as_ref()
            .and_then(|d| d.scaffold_current_month)
            .unwrap_or(true)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(LogFormat::from_name)
            .unwrap_or_default()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("state.directory", &self.state.directory)?;
        validation::validate_file_name("state.file_name", self.state_file_name())?;
        validation::validate_url(
            "channels.announcements.webhook_url",
            &self.channels.announcements.webhook_url,
        )?;
        validation::validate_url(
            "channels.overview.webhook_url",
            &self.channels.overview.webhook_url,
        )?;
        validation::validate_range("digest.embed_color", self.embed_color(), 0, 0xFF_FFFF)?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if LogFormat::from_name(format).is_none() {
                return Err(DigestError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Supported formats: compact, json".to_string(),
                });
            }
        }

        if let Some(level) = self.log_level() {
            validation::validate_non_empty_string("logging.level", level)?;
        }

        Ok(())
    }
}

impl Validate for DigestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
