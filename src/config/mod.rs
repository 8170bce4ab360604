//! Configuration module for fxsignal.
//!
//! Loads settings from environment variables (a `.env` file is honoured by the
//! binary), organized by concern: provider and analysis.

mod analysis_env_config;
mod provider_config;

pub use analysis_env_config::AnalysisEnvConfig;
pub use provider_config::{HttpEnvConfig, OandaConfig, Provider, ProviderEnvConfig};

use crate::application::analysis_service::AnalysisSettings;
use crate::domain::analysis::ForecastMethod;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderEnvConfig,
    pub analysis: AnalysisEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider: ProviderEnvConfig::from_env()?,
            analysis: AnalysisEnvConfig::from_env()?,
        })
    }

    pub fn analysis_settings(&self, forecast_method: ForecastMethod) -> AnalysisSettings {
        AnalysisSettings {
            indicators: self.analysis.indicators,
            signal: self.analysis.signal,
            forecast_method,
            cache_ttl: self.analysis.cache_ttl(),
        }
    }
}

/// Reads `key`, falling back to `default` when it is unset.
pub(crate) fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}
