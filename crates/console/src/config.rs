//! Console configuration, read from `SUPPLYDESK_*` environment variables.

use std::time::Duration;

use thiserror::Error;

use supplydesk_core::{EntityKind, UserId};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },
    #[error("{key} must be at least 1")]
    ZeroPageSize { key: &'static str },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub category_page_size: usize,
    pub role_page_size: usize,
    pub user_page_size: usize,
    /// Signed-in operator; hidden from the users list.
    pub current_user_id: Option<UserId>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            category_page_size: EntityKind::Category.default_page_size(),
            role_page_size: EntityKind::Role.default_page_size(),
            user_page_size: EntityKind::User.default_page_size(),
            current_user_id: None,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup("SUPPLYDESK_API_URL") {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty { key: "SUPPLYDESK_API_URL" }),
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => defaults.api_url,
        };

        let auth_token = lookup("SUPPLYDESK_AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        let timeout_secs = number(&lookup, "SUPPLYDESK_REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let current_user_id = number::<i64, _>(&lookup, "SUPPLYDESK_CURRENT_USER_ID")?.map(UserId::new);

        Ok(Self {
            api_url,
            auth_token,
            request_timeout: Duration::from_secs(timeout_secs),
            category_page_size: page_size(&lookup, "SUPPLYDESK_CATEGORY_PAGE_SIZE", defaults.category_page_size)?,
            role_page_size: page_size(&lookup, "SUPPLYDESK_ROLE_PAGE_SIZE", defaults.role_page_size)?,
            user_page_size: page_size(&lookup, "SUPPLYDESK_USER_PAGE_SIZE", defaults.user_page_size)?,
            current_user_id,
        })
    }

    pub fn page_size(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Category => self.category_page_size,
            EntityKind::Role => self.role_page_size,
            EntityKind::User => self.user_page_size,
        }
    }
}

fn number<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { key, value: raw }),
    }
}

fn page_size<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match number::<usize, F>(lookup, key)? {
        Some(0) => Err(ConfigError::ZeroPageSize { key }),
        Some(size) => Ok(size),
        None => Ok(default),
    }
}
