//! Market-data provider configuration parsing from environment variables.
//!
//! - Provider selection (`FX_PROVIDER`)
//! - OANDA credentials and endpoint
//! - HTTP transport (`HTTP_MAX_RETRIES`, `HTTP_TIMEOUT_SECS`)

use super::parse_var;
use crate::domain::session::ApiSession;
use crate::infrastructure::core::HttpClientSettings;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which candle source backs the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Mock,
    Oanda,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Provider::Mock),
            "oanda" => Ok(Provider::Oanda),
            _ => anyhow::bail!("Invalid FX_PROVIDER: {}. Must be 'mock' or 'oanda'", s),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Mock => write!(f, "mock"),
            Provider::Oanda => write!(f, "oanda"),
        }
    }
}

/// OANDA API configuration
#[derive(Clone, Default)]
pub struct OandaConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl OandaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_base_url: env::var("OANDA_API_BASE_URL")
                .unwrap_or_else(|_| "https://api-fxpractice.oanda.com".to_string()),
            api_key: env::var("OANDA_API_KEY").unwrap_or_default(),
            token_expires_at: parse_expiry(env::var("OANDA_TOKEN_EXPIRES_AT").ok())?,
        })
    }

    pub fn session(&self) -> ApiSession {
        ApiSession::new(self.api_key.clone(), self.token_expires_at)
    }
}

impl fmt::Debug for OandaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OandaConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("token_expires_at", &self.token_expires_at)
            .finish()
    }
}

fn parse_expiry(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .context(format!(
                "Failed to parse OANDA_TOKEN_EXPIRES_AT '{}' (expected RFC 3339)",
                value
            )),
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpEnvConfig {
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for HttpEnvConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            timeout_secs: 30,
        }
    }
}

impl HttpEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_retries: parse_var("HTTP_MAX_RETRIES", defaults.max_retries)?,
            timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }

    pub fn client_settings(&self) -> HttpClientSettings {
        HttpClientSettings {
            max_retries: self.max_retries,
            timeout: Duration::from_secs(self.timeout_secs),
            ..HttpClientSettings::default()
        }
    }
}

/// Aggregated provider configuration
#[derive(Debug, Clone, Default)]
pub struct ProviderEnvConfig {
    pub provider: Provider,
    pub oanda: OandaConfig,
    pub http: HttpEnvConfig,
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        let provider = env::var("FX_PROVIDER")
            .unwrap_or_else(|_| "mock".to_string())
            .parse::<Provider>()?;

        Ok(Self {
            provider,
            oanda: OandaConfig::from_env()?,
            http: HttpEnvConfig::from_env()?,
        })
    }
}
