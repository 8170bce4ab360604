//! Analysis configuration parsing from environment variables.
//!
//! Indicator periods, stop/target offsets and the candle cache TTL.

use super::parse_var;
use crate::application::analysis::{IndicatorConfig, SignalConfig};
use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisEnvConfig {
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub cache_ttl_secs: u64,
}

impl Default for AnalysisEnvConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            cache_ttl_secs: 60,
        }
    }
}

impl AnalysisEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let ind = defaults.indicators;
        let sig = defaults.signal;

        let indicators = IndicatorConfig {
            rsi_period: parse_var("RSI_PERIOD", ind.rsi_period)?,
            macd_fast_period: parse_var("MACD_FAST_PERIOD", ind.macd_fast_period)?,
            macd_slow_period: parse_var("MACD_SLOW_PERIOD", ind.macd_slow_period)?,
            macd_signal_period: parse_var("MACD_SIGNAL_PERIOD", ind.macd_signal_period)?,
            sma_period: parse_var("SMA_PERIOD", ind.sma_period)?,
        };
        let signal = SignalConfig {
            stop_loss_pct: parse_var("STOP_LOSS_PCT", sig.stop_loss_pct)?,
            take_profit_pct: parse_var("TAKE_PROFIT_PCT", sig.take_profit_pct)?,
        };

        indicators.validate()?;
        signal.validate()?;

        Ok(Self {
            indicators,
            signal,
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_analysis_config_defaults() {
        let config = AnalysisEnvConfig::default();
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.indicators.macd_slow_period, 26);
        assert_eq!(config.indicators.sma_period, 20);
        assert_eq!(config.signal.stop_loss_pct, dec!(0.01));
        assert_eq!(config.signal.take_profit_pct, dec!(0.02));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    }
}
