//! Technical indicator computation over a close-price series.
//!
//! MACD and SMA come from the `ta` crate; RSI uses [`WindowedRsi`] because
//! `ta`'s RSI smooths with an EMA instead of a trailing window.

use crate::application::analysis::analysis_config::IndicatorConfig;
use crate::application::analysis::rsi::WindowedRsi;
use crate::domain::analysis::{IndicatorSet, MacdPoint};
use crate::domain::errors::AnalysisError;
use ta::Next;
use ta::indicators::{MovingAverageConvergenceDivergence, SimpleMovingAverage};

/// Computes aligned RSI, MACD and SMA series for `closes`.
///
/// Fails with `InsufficientData` when fewer than `config.min_points()` closes
/// are given, and with `ValidationError` on a bad config or non-finite input.
pub fn compute_indicators(
    closes: &[f64],
    config: &IndicatorConfig,
) -> Result<IndicatorSet, AnalysisError> {
    config.validate()?;

    let required = config.min_points();
    if closes.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: closes.len(),
        });
    }
    if let Some(pos) = closes.iter().position(|c| !c.is_finite()) {
        return Err(AnalysisError::validation(format!(
            "Close at index {} is not finite: {}",
            pos, closes[pos]
        )));
    }

    let mut rsi = WindowedRsi::new(config.rsi_period);
    let mut macd = MovingAverageConvergenceDivergence::new(
        config.macd_fast_period,
        config.macd_slow_period,
        config.macd_signal_period,
    )
    .map_err(|e| AnalysisError::validation(format!("Invalid MACD periods: {:?}", e)))?;
    let mut sma = SimpleMovingAverage::new(config.sma_period)
        .map_err(|e| AnalysisError::validation(format!("Invalid SMA period: {:?}", e)))?;

    let start_index = config.warmup_index();
    let capacity = closes.len() - start_index;
    let mut set = IndicatorSet {
        start_index,
        rsi: Vec::with_capacity(capacity),
        macd: Vec::with_capacity(capacity),
        sma: Vec::with_capacity(capacity),
    };

    for (i, &close) in closes.iter().enumerate() {
        let rsi_val = rsi.next(close);
        let macd_val = macd.next(close);
        let sma_val = sma.next(close);

        if i < start_index {
            continue;
        }

        // start_index >= rsi_period, so the window is full here
        let Some(rsi_val) = rsi_val else {
            return Err(AnalysisError::InsufficientData {
                required: config.rsi_period + 1,
                actual: i + 1,
            });
        };

        set.rsi.push(rsi_val);
        set.macd.push(MacdPoint {
            line: macd_val.macd,
            signal: macd_val.signal,
            histogram: macd_val.histogram,
        });
        set.sma.push(sma_val);
    }

    tracing::debug!(
        "Computed indicators: {} points from {} closes (warm-up {})",
        set.len(),
        closes.len(),
        start_index
    );

    Ok(set)
}
