use serde::{Deserialize, Serialize};

use crate::error::{ImpersonateError, Result};
use crate::session::SessionConfig;
use crate::utils::{get_env_bool, get_env_with_prefix};

/// Complete configuration for the impersonation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub impersonate: ImpersonateConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings consumed by [`ImpersonationManager`](crate::ImpersonationManager)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImpersonateConfig {
    /// Session key holding the impersonator's id while impersonating
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Route name or URI to redirect to after taking an impersonation
    #[serde(default = "default_redirect_to")]
    pub take_redirect_to: String,
    /// Route name or URI to redirect to after leaving an impersonation
    #[serde(default = "default_redirect_to")]
    pub leave_redirect_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for ImpersonateConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            take_redirect_to: default_redirect_to(),
            leave_redirect_to: default_redirect_to(),
        }
    }
}

impl ImpersonateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    #[must_use]
    pub fn take_redirect_to(mut self, route_or_uri: impl Into<String>) -> Self {
        self.take_redirect_to = route_or_uri.into();
        self
    }

    #[must_use]
    pub fn leave_redirect_to(mut self, route_or_uri: impl Into<String>) -> Self {
        self.leave_redirect_to = route_or_uri.into();
        self
    }

    /// Load impersonation settings from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(key) = get_env_with_prefix("IMPERSONATE_SESSION_KEY") {
            config.session_key = key;
        }
        if let Some(to) = get_env_with_prefix("IMPERSONATE_TAKE_REDIRECT_TO") {
            config.take_redirect_to = to;
        }
        if let Some(to) = get_env_with_prefix("IMPERSONATE_LEAVE_REDIRECT_TO") {
            config.leave_redirect_to = to;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_key.trim().is_empty() {
            return Err(ImpersonateError::Config(
                "Impersonation session key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

fn default_session_key() -> String {
    "impersonated_by".to_string()
}

fn default_redirect_to() -> String {
    "/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.config.impersonate.session_key = key.into();
        self
    }

    pub fn with_take_redirect_to(mut self, route_or_uri: impl Into<String>) -> Self {
        self.config.impersonate.take_redirect_to = route_or_uri.into();
        self
    }

    pub fn with_leave_redirect_to(mut self, route_or_uri: impl Into<String>) -> Self {
        self.config.impersonate.leave_redirect_to = route_or_uri.into();
        self
    }

    pub fn with_impersonate(mut self, impersonate: ImpersonateConfig) -> Self {
        self.config.impersonate = impersonate;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Load configuration from environment variables with TIDEWAY_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_bool("LOG_JSON") {
            self.config.logging.json = json;
        }

        self.config.impersonate = ImpersonateConfig::from_env();
        self.config.session = SessionConfig::from_env();

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns [`ImpersonateError::Config`] for an empty session key, an
    /// unknown log level, or a zero session TTL.
    pub fn build(self) -> Result<Config> {
        self.config.impersonate.validate()?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(ImpersonateError::Config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.session.default_ttl_seconds == 0 {
            return Err(ImpersonateError::Config(
                "Session TTL must be greater than 0".to_string(),
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
