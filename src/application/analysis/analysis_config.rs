use crate::domain::errors::AnalysisError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Indicator periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub sma_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            sma_period: 20,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("sma_period", self.sma_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(AnalysisError::validation(format!("{} must be > 0", name)));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return Err(AnalysisError::validation(format!(
                "macd_fast_period ({}) must be below macd_slow_period ({})",
                self.macd_fast_period, self.macd_slow_period
            )));
        }
        Ok(())
    }

    /// Index of the first close where RSI, MACD and SMA are all defined.
    ///
    /// RSI needs `rsi_period` price changes, so its first value sits at
    /// index `rsi_period`.
    pub fn warmup_index(&self) -> usize {
        self.macd_slow_period
            .saturating_sub(1)
            .max(self.rsi_period)
            .max(self.sma_period.saturating_sub(1))
    }

    /// Minimum number of closes accepted by `compute_indicators`.
    pub fn min_points(&self) -> usize {
        self.warmup_index() + 1
    }
}

/// Stop-loss / take-profit offsets as fractions of the entry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: dec!(0.01),
            take_profit_pct: dec!(0.02),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let valid = |v: Decimal| v > Decimal::ZERO && v < Decimal::ONE;
        if !valid(self.stop_loss_pct) || !valid(self.take_profit_pct) {
            return Err(AnalysisError::validation(format!(
                "stop_loss_pct ({}) and take_profit_pct ({}) must be in (0, 1)",
                self.stop_loss_pct, self.take_profit_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_min_points() {
        let config = IndicatorConfig::default();
        assert_eq!(config.warmup_index(), 25);
        assert_eq!(config.min_points(), 26);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rsi_dominated_warmup() {
        let config = IndicatorConfig {
            rsi_period: 30,
            ..Default::default()
        };
        assert_eq!(config.min_points(), 31);
    }

    #[test]
    fn test_invalid_periods() {
        let zero = IndicatorConfig {
            sma_period: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let inverted = IndicatorConfig {
            macd_fast_period: 26,
            macd_slow_period: 12,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_signal_config_bounds() {
        assert!(SignalConfig::default().validate().is_ok());
        let bad = SignalConfig {
            stop_loss_pct: dec!(0),
            take_profit_pct: dec!(0.02),
        };
        assert!(bad.validate().is_err());
    }
}
