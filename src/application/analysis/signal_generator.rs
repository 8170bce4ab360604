use crate::application::analysis::analysis_config::SignalConfig;
use crate::domain::analysis::{Direction, IndicatorSet, IndicatorSnapshot, Signal};
use crate::domain::errors::AnalysisError;
use crate::domain::market::{Candle, CurrencyPair};
use rust_decimal::Decimal;
use tracing::debug;

/// Turns the latest candle and indicator values into a [`Signal`].
///
/// Direction follows the sign of the MACD histogram. Position size is the
/// risk budget `capital * risk_percent / 100`; stops are fixed percentage
/// offsets from the close.
pub struct SignalGenerator {
    config: SignalConfig,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn generate_signal(
        &self,
        pair: &CurrencyPair,
        candle: &Candle,
        indicators: &IndicatorSet,
        capital: Decimal,
        risk_percent: Decimal,
    ) -> Result<Signal, AnalysisError> {
        self.config.validate()?;
        let position_size = risk_budget(capital, risk_percent)?;

        let latest = indicators
            .latest()
            .ok_or(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            })?;

        let direction = direction_from_histogram(latest.macd.histogram);
        let confidence = momentum_confidence(latest.rsi);
        let entry_price = candle.close;
        let (stop_loss, take_profit) = self.stop_band(pair, direction, entry_price)?;
        let stop_distance_pips = pair
            .to_pips(entry_price - stop_loss)
            .ok_or_else(|| overflow("stop distance", entry_price))?;

        let signal = Signal {
            pair: pair.clone(),
            direction,
            confidence,
            entry_price,
            stop_loss,
            take_profit,
            position_size,
            stop_distance_pips,
            justification: justify(direction, &latest),
            timestamp: candle.timestamp,
        };

        debug!(
            "SignalGenerator: {} {} @ {} (confidence {:.2}, SL {}, size {})",
            pair, direction, entry_price, confidence, stop_loss, position_size
        );

        Ok(signal)
    }

    fn stop_band(
        &self,
        pair: &CurrencyPair,
        direction: Direction,
        entry: Decimal,
    ) -> Result<(Decimal, Option<Decimal>), AnalysisError> {
        // One digit finer than a pip
        let dp = pair.pip_size().scale() + 1;
        let sl = self.config.stop_loss_pct;
        let tp = self.config.take_profit_pct;
        let offset = |factor: Decimal| {
            entry
                .checked_mul(factor)
                .map(|price| price.round_dp(dp))
                .ok_or_else(|| overflow("stop band", entry))
        };

        match direction {
            Direction::Buy => Ok((offset(Decimal::ONE - sl)?, Some(offset(Decimal::ONE + tp)?))),
            Direction::Sell => Ok((offset(Decimal::ONE + sl)?, Some(offset(Decimal::ONE - tp)?))),
            Direction::Hold => Ok((entry, None)),
        }
    }
}

/// `capital * risk_percent / 100`, rejecting amounts `Decimal` cannot hold.
pub fn risk_budget(capital: Decimal, risk_percent: Decimal) -> Result<Decimal, AnalysisError> {
    validate_risk(capital, risk_percent)?;
    risk_percent
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| capital.checked_mul(fraction))
        .ok_or_else(|| overflow("position size", capital))
}

fn overflow(what: &str, value: Decimal) -> AnalysisError {
    AnalysisError::validation(format!("{} out of range for {}", what, value))
}

/// Capital must be positive and risk a percentage in `(0, 100]`.
pub fn validate_risk(capital: Decimal, risk_percent: Decimal) -> Result<(), AnalysisError> {
    if capital <= Decimal::ZERO {
        return Err(AnalysisError::validation(format!(
            "Capital must be positive, got {}",
            capital
        )));
    }
    if risk_percent <= Decimal::ZERO || risk_percent > Decimal::ONE_HUNDRED {
        return Err(AnalysisError::validation(format!(
            "Risk percent must be in (0, 100], got {}",
            risk_percent
        )));
    }
    Ok(())
}

pub fn direction_from_histogram(histogram: f64) -> Direction {
    if histogram > 0.0 {
        Direction::Buy
    } else if histogram < 0.0 {
        Direction::Sell
    } else {
        Direction::Hold
    }
}

/// `min(1, |rsi - 50| / 50)`
pub fn momentum_confidence(rsi: f64) -> f64 {
    if !rsi.is_finite() {
        return 0.0;
    }
    ((rsi - 50.0).abs() / 50.0).min(1.0)
}

fn justify(direction: Direction, latest: &IndicatorSnapshot) -> String {
    let bias = match direction {
        Direction::Buy => "MACD above signal line",
        Direction::Sell => "MACD below signal line",
        Direction::Hold => "MACD flat against signal line",
    };
    format!(
        "{}: histogram {:+.6}, RSI {:.1}, SMA {:.5}",
        bias, latest.macd.histogram, latest.rsi, latest.sma
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::MacdPoint;
    use rust_decimal_macros::dec;

    fn candle(close: Decimal) -> Candle {
        Candle {
            timestamp: 1_704_067_200_000,
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1000),
        }
    }

    fn indicators(histogram: f64, rsi: f64) -> IndicatorSet {
        IndicatorSet {
            start_index: 25,
            rsi: vec![rsi],
            macd: vec![MacdPoint {
                line: histogram,
                signal: 0.0,
                histogram,
            }],
            sma: vec![1.1],
        }
    }

    fn eurusd() -> CurrencyPair {
        "EUR/USD".parse().unwrap()
    }

    #[test]
    fn test_position_size_ignores_prices() {
        let generator = SignalGenerator::default();
        for (close, hist) in [(dec!(1.1), 0.002), (dec!(0.65), -0.5), (dec!(150.2), 0.0)] {
            let signal = generator
                .generate_signal(
                    &eurusd(),
                    &candle(close),
                    &indicators(hist, 60.0),
                    dec!(10000),
                    dec!(2),
                )
                .unwrap();
            assert_eq!(signal.position_size, dec!(200));
        }
    }

    #[test]
    fn test_buy_band() {
        let signal = SignalGenerator::default()
            .generate_signal(
                &eurusd(),
                &candle(dec!(1.10000)),
                &indicators(0.0004, 75.0),
                dec!(10000),
                dec!(1),
            )
            .unwrap();

        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.stop_loss, dec!(1.08900));
        assert_eq!(signal.take_profit, Some(dec!(1.12200)));
        assert_eq!(signal.stop_distance_pips, dec!(110));
        assert!((signal.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sell_band() {
        let signal = SignalGenerator::default()
            .generate_signal(
                &eurusd(),
                &candle(dec!(1.20000)),
                &indicators(-0.0004, 20.0),
                dec!(5000),
                dec!(1),
            )
            .unwrap();

        assert_eq!(signal.direction, Direction::Sell);
        assert_eq!(signal.stop_loss, dec!(1.21200));
        assert_eq!(signal.take_profit, Some(dec!(1.17600)));
        assert!(signal.stop_loss > signal.entry_price);
        assert!((signal.confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_hold_has_no_take_profit() {
        let signal = SignalGenerator::default()
            .generate_signal(
                &eurusd(),
                &candle(dec!(1.1)),
                &indicators(0.0, 50.0),
                dec!(10000),
                dec!(2),
            )
            .unwrap();

        assert_eq!(signal.direction, Direction::Hold);
        assert_eq!(signal.stop_loss, signal.entry_price);
        assert_eq!(signal.take_profit, None);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_jpy_rounding() {
        let usdjpy: CurrencyPair = "USD/JPY".parse().unwrap();
        let signal = SignalGenerator::default()
            .generate_signal(
                &usdjpy,
                &candle(dec!(150.123)),
                &indicators(0.05, 65.0),
                dec!(10000),
                dec!(2),
            )
            .unwrap();
        assert_eq!(signal.stop_loss, dec!(148.622));
        assert_eq!(signal.stop_loss.scale(), 3);
    }

    #[test]
    fn test_invalid_risk_inputs() {
        let generator = SignalGenerator::default();
        let set = indicators(0.1, 60.0);
        let c = candle(dec!(1.1));

        for (capital, risk) in [
            (dec!(0), dec!(2)),
            (dec!(-100), dec!(2)),
            (dec!(1000), dec!(0)),
            (dec!(1000), dec!(101)),
        ] {
            assert!(matches!(
                generator.generate_signal(&eurusd(), &c, &set, capital, risk),
                Err(AnalysisError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_empty_indicators() {
        let empty = IndicatorSet {
            start_index: 0,
            rsi: vec![],
            macd: vec![],
            sma: vec![],
        };
        let result = SignalGenerator::default().generate_signal(
            &eurusd(),
            &candle(dec!(1.1)),
            &empty,
            dec!(10000),
            dec!(2),
        );
        assert!(matches!(result, Err(AnalysisError::InsufficientData { .. })));
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(momentum_confidence(100.0), 1.0);
        assert_eq!(momentum_confidence(0.0), 1.0);
        assert_eq!(momentum_confidence(50.0), 0.0);
        assert_eq!(momentum_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        assert_eq!(risk_budget(dec!(10000), dec!(2)).unwrap(), dec!(200));
        assert!(risk_budget(Decimal::MAX, dec!(100)).is_ok());
        assert!(matches!(
            risk_budget(Decimal::MAX, dec!(0)),
            Err(AnalysisError::ValidationError(_))
        ));

        let generator = SignalGenerator::default();
        let set = indicators(0.1, 60.0);
        let result = generator.generate_signal(
            &eurusd(),
            &candle(dec!(1.1)),
            &set,
            Decimal::MAX,
            dec!(2),
        );
        assert!(result.is_ok());

        // Take profit above the largest representable price
        let result = generator.generate_signal(
            &eurusd(),
            &candle(Decimal::MAX),
            &set,
            dec!(10000),
            dec!(2),
        );
        assert!(matches!(result, Err(AnalysisError::ValidationError(_))));
    }
}
