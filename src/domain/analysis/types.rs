use crate::domain::market::CurrencyPair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One MACD sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest value of every indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: MacdPoint,
    pub sma: f64,
}

/// Aligned RSI / MACD / SMA series.
///
/// The three vectors always have the same length; entry `i` belongs to input
/// index `start_index + i`, the first index past every indicator's warm-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub start_index: usize,
    pub rsi: Vec<f64>,
    pub macd: Vec<MacdPoint>,
    pub sma: Vec<f64>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        Some(IndicatorSnapshot {
            rsi: *self.rsi.last()?,
            macd: *self.macd.last()?,
            sma: *self.sma.last()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// A trade suggestion for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub pair: CurrencyPair,
    pub direction: Direction,
    /// In `[0, 1]`
    pub confidence: f64,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Option<Decimal>,
    pub position_size: Decimal,
    pub stop_distance_pips: Decimal,
    pub justification: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastMethod {
    /// `last + (last - previous)`
    TrendContinuation,
    /// Least squares line over the series, extrapolated one interval
    LinearRegression,
    /// Last close perturbed within ±0.5%, reproducible for a given seed
    SeededRandomWalk { seed: u64 },
}

impl ForecastMethod {
    pub fn min_points(&self) -> usize {
        match self {
            ForecastMethod::TrendContinuation => 2,
            ForecastMethod::LinearRegression => 5,
            ForecastMethod::SeededRandomWalk { .. } => 1,
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMethod::TrendContinuation => write!(f, "trend"),
            ForecastMethod::LinearRegression => write!(f, "regression"),
            ForecastMethod::SeededRandomWalk { seed } => write!(f, "random-walk(seed={})", seed),
        }
    }
}

/// Projected next close for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub pair: CurrencyPair,
    pub next_price: Decimal,
    /// In `[0, 1]`
    pub confidence: f64,
    /// Open time of the projected candle (ms)
    pub timestamp: i64,
    pub method: ForecastMethod,
}
