use crate::domain::errors::AnalysisError;
use crate::domain::market::pair::CurrencyPair;
use crate::domain::market::timeframe::Timeframe;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One interval's open/high/low/close/volume record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    /// Interval open time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Checks `low <= {open, close} <= high`.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let in_range = |v: Decimal| self.low <= v && v <= self.high;
        if self.low > self.high || !in_range(self.open) || !in_range(self.close) {
            return Err(AnalysisError::invalid_shape(format!(
                "Candle at {} violates low <= open/close <= high (o={} h={} l={} c={})",
                self.timestamp, self.open, self.high, self.low, self.close
            )));
        }
        if self.volume.is_sign_negative() {
            return Err(AnalysisError::invalid_shape(format!(
                "Candle at {} has negative volume {}",
                self.timestamp, self.volume
            )));
        }
        Ok(())
    }

    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(0.0)
    }
}

/// An ordered candle series for one pair and timeframe.
///
/// Timestamps are strictly increasing and every candle satisfies the OHLC
/// invariant; both are checked on construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawCandleSeries")]
pub struct CandleSeries {
    pair: CurrencyPair,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

#[derive(Deserialize)]
struct RawCandleSeries {
    pair: CurrencyPair,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl TryFrom<RawCandleSeries> for CandleSeries {
    type Error = AnalysisError;

    fn try_from(raw: RawCandleSeries) -> Result<Self, Self::Error> {
        CandleSeries::new(raw.pair, raw.timeframe, raw.candles)
    }
}

impl CandleSeries {
    pub fn new(
        pair: CurrencyPair,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Result<Self, AnalysisError> {
        for candle in &candles {
            candle.validate()?;
        }
        if let Some(w) = candles.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(AnalysisError::invalid_shape(format!(
                "Candle timestamps not strictly increasing: {} followed by {}",
                w[0].timestamp, w[1].timestamp
            )));
        }

        Ok(Self {
            pair,
            timeframe,
            candles,
        })
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::close_f64).collect()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(timestamp: i64, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume: dec!(100),
        }
    }

    fn eurusd() -> CurrencyPair {
        "EUR/USD".parse().unwrap()
    }

    #[test]
    fn test_validate_ohlc_bounds() {
        assert!(candle(0, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.15)).validate().is_ok());
        assert!(candle(0, dec!(1.3), dec!(1.2), dec!(1.0), dec!(1.15)).validate().is_err());
        assert!(candle(0, dec!(1.1), dec!(1.2), dec!(1.0), dec!(0.9)).validate().is_err());
    }

    #[test]
    fn test_series_rejects_unordered_timestamps() {
        let candles = vec![
            candle(2000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
            candle(1000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
        ];
        let result = CandleSeries::new(eurusd(), Timeframe::H1, candles);
        assert!(matches!(result, Err(AnalysisError::InvalidResponseShape(_))));

        let duplicate = vec![
            candle(1000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
            candle(1000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
        ];
        assert!(CandleSeries::new(eurusd(), Timeframe::H1, duplicate).is_err());
    }

    #[test]
    fn test_series_closes() {
        let candles = vec![
            candle(1000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
            candle(2000, dec!(1.1), dec!(1.3), dec!(1.1), dec!(1.25)),
        ];
        let series = CandleSeries::new(eurusd(), Timeframe::H1, candles).unwrap();
        assert_eq!(series.closes(), vec![1.1, 1.25]);
        assert_eq!(series.last().unwrap().timestamp, 2000);
    }

    #[test]
    fn test_deserialize_rechecks_invariants() {
        let candles = vec![
            candle(1000, dec!(1.1), dec!(1.2), dec!(1.0), dec!(1.1)),
            candle(2000, dec!(1.1), dec!(1.3), dec!(1.1), dec!(1.25)),
        ];
        let series = CandleSeries::new(eurusd(), Timeframe::H1, candles).unwrap();
        let mut json = serde_json::to_value(&series).unwrap();
        let decoded: CandleSeries = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(decoded, series);

        json["candles"][1]["timestamp"] = serde_json::json!(500);
        assert!(serde_json::from_value::<CandleSeries>(json).is_err());
    }
}
