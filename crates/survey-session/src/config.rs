//! `survey.toml` loading with environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use survey_spec::{Language, NavigationPolicy};
use thiserror::Error;
use time::Duration;
use tracing::warn;

use crate::admin::AdminAuth;

pub const PLACEHOLDER_BACKEND_URL: &str = "https://your-supabase-url.supabase.co";
pub const PLACEHOLDER_ANON_KEY: &str = "your-supabase-anon-key";

pub const ENV_BACKEND_URL: &str = "SURVEY_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "SURVEY_BACKEND_KEY";
pub const ENV_ADMIN_EMAIL: &str = "SURVEY_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "SURVEY_ADMIN_PASSWORD";
pub const ENV_ADMIN_SECRET: &str = "SURVEY_ADMIN_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config toml: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    pub survey_path: PathBuf,
    pub default_language: Language,
    pub navigation_policy: NavigationPolicy,
    pub backend: BackendConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminConfig>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            survey_path: PathBuf::from("assets/survey.json"),
            default_language: Language::English,
            navigation_policy: NavigationPolicy::Block,
            backend: BackendConfig::default(),
            admin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_BACKEND_URL.into(),
            anon_key: PLACEHOLDER_ANON_KEY.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl SurveyConfig {
    /// Reads `path`, applies `SURVEY_*` environment overrides and warns about placeholders.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        if let Some(parent) = path.parent()
            && config.survey_path.is_relative()
            && !parent.as_os_str().is_empty()
        {
            config.survey_path = parent.join(&config.survey_path);
        }
        config.warn_placeholders();
        Ok(config)
    }

    /// Parses TOML without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Overrides backend and admin settings from `lookup`, typically the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(ENV_BACKEND_KEY) {
            self.backend.anon_key = key;
        }

        let email = lookup(ENV_ADMIN_EMAIL);
        let password = lookup(ENV_ADMIN_PASSWORD);
        let secret = lookup(ENV_ADMIN_SECRET);
        if self.admin.is_none() && email.is_none() && password.is_none() && secret.is_none() {
            return;
        }
        let admin = self.admin.get_or_insert_with(|| AdminConfig {
            email: String::new(),
            password: String::new(),
            secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        });
        if let Some(email) = email {
            admin.email = email;
        }
        if let Some(password) = password {
            admin.password = password;
        }
        if let Some(secret) = secret {
            admin.secret = secret;
        }
    }

    pub fn uses_placeholder_backend(&self) -> bool {
        self.backend.url == PLACEHOLDER_BACKEND_URL || self.backend.anon_key == PLACEHOLDER_ANON_KEY
    }

    fn warn_placeholders(&self) {
        if self.uses_placeholder_backend() {
            warn!(
                url = %self.backend.url,
                "backend settings are placeholders; set {ENV_BACKEND_URL} and {ENV_BACKEND_KEY}"
            );
        }
    }

    /// Admin account, when one is fully configured.
    pub fn admin_auth(&self) -> Option<AdminAuth> {
        let admin = self.admin.as_ref()?;
        if admin.email.is_empty() || admin.password.is_empty() || admin.secret.is_empty() {
            return None;
        }
        Some(AdminAuth::new(
            admin.email.clone(),
            admin.password.clone(),
            admin.secret.clone(),
            Duration::hours(admin.token_ttl_hours.max(1)),
        ))
    }
}
