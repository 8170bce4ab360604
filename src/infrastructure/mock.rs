use crate::domain::errors::AnalysisError;
use crate::domain::market::{Candle, CandleSeries, CurrencyPair, Timeframe};
use crate::domain::ports::MarketDataService;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Maximum per-candle close-to-close move of the synthetic walk
const STEP_VOLATILITY: f64 = 0.002;
/// Maximum wick length relative to the candle body edge
const WICK_VOLATILITY: f64 = 0.0005;

#[derive(Debug, Clone)]
enum MockSource {
    RandomWalk { seed: u64 },
    FixedCloses(Vec<f64>),
    Failure(AnalysisError),
}

/// Offline market-data provider.
///
/// Produces a seeded random walk by default, so two services built with the
/// same seed and anchor return identical candles.
#[derive(Debug)]
pub struct MockMarketDataService {
    source: MockSource,
    anchor_ms: Option<i64>,
    calls: AtomicUsize,
}

impl MockMarketDataService {
    pub fn new(seed: u64) -> Self {
        Self {
            source: MockSource::RandomWalk { seed },
            anchor_ms: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Serves exactly these closes (oldest first), truncated to the requested periods.
    pub fn with_closes(closes: Vec<f64>) -> Self {
        Self {
            source: MockSource::FixedCloses(closes),
            anchor_ms: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every fetch with `error`.
    pub fn failing(error: AnalysisError) -> Self {
        Self {
            source: MockSource::Failure(error),
            anchor_ms: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Pins the open time of the newest candle instead of deriving it from the clock.
    pub fn anchored_at(mut self, anchor_ms: i64) -> Self {
        self.anchor_ms = Some(anchor_ms);
        self
    }

    /// Number of `fetch_candles` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn closes_for(&self, pair: &CurrencyPair, periods: usize) -> Result<Vec<f64>, AnalysisError> {
        match &self.source {
            MockSource::RandomWalk { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                let mut price = base_price(pair);
                Ok((0..periods)
                    .map(|_| {
                        price *= 1.0 + rng.random_range(-STEP_VOLATILITY..=STEP_VOLATILITY);
                        price
                    })
                    .collect())
            }
            MockSource::FixedCloses(closes) => {
                let skip = closes.len().saturating_sub(periods);
                Ok(closes[skip..].to_vec())
            }
            MockSource::Failure(error) => Err(error.clone()),
        }
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new(7)
    }
}

fn base_price(pair: &CurrencyPair) -> f64 {
    match (pair.base(), pair.quote()) {
        (_, "JPY") => 150.0,
        ("GBP", _) => 1.27,
        ("AUD", _) | ("NZD", _) => 0.66,
        ("USD", _) => 1.35,
        _ => 1.10,
    }
}

fn to_price(value: f64, dp: u32) -> Result<Decimal, AnalysisError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .ok_or_else(|| AnalysisError::invalid_shape(format!("Unrepresentable price {}", value)))
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch_candles(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
        periods: usize,
    ) -> Result<CandleSeries, AnalysisError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let closes = self.closes_for(pair, periods)?;

        let step = timeframe.to_millis();
        let newest = self
            .anchor_ms
            .unwrap_or_else(|| timeframe.period_start(Utc::now().timestamp_millis()) - step);
        let first_ts = newest - step * (closes.len() as i64 - 1).max(0);

        // Wicks come from their own stream so fixed closes stay fixed
        let mut wick_rng = StdRng::seed_from_u64(closes.len() as u64);
        let dp = pair.pip_size().scale() + 1;

        let mut candles = Vec::with_capacity(closes.len());
        let mut prev_close = closes.first().copied().unwrap_or_default();
        for (i, &close) in closes.iter().enumerate() {
            let open = prev_close;
            let upper = open.max(close) * (1.0 + wick_rng.random_range(0.0..=WICK_VOLATILITY));
            let lower = open.min(close) * (1.0 - wick_rng.random_range(0.0..=WICK_VOLATILITY));

            candles.push(Candle {
                timestamp: first_ts + step * i as i64,
                open: to_price(open, dp)?,
                high: to_price(upper, dp)?,
                low: to_price(lower, dp)?,
                close: to_price(close, dp)?,
                volume: Decimal::from(wick_rng.random_range(500..5000u32)),
            });
            prev_close = close;
        }

        info!(
            "MockMarketDataService: Served {} {} candles for {}",
            candles.len(),
            timeframe,
            pair
        );

        CandleSeries::new(pair.clone(), timeframe, candles)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eurusd() -> CurrencyPair {
        "EUR/USD".parse().unwrap()
    }

    #[tokio::test]
    async fn test_same_seed_same_series() {
        let anchor = 1_704_067_200_000;
        let a = MockMarketDataService::new(11).anchored_at(anchor);
        let b = MockMarketDataService::new(11).anchored_at(anchor);

        let sa = a.fetch_candles(&eurusd(), Timeframe::H1, 120).await.unwrap();
        let sb = b.fetch_candles(&eurusd(), Timeframe::H1, 120).await.unwrap();
        assert_eq!(sa, sb);
        assert_eq!(sa.len(), 120);
        assert_eq!(sa.last().unwrap().timestamp, anchor);
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test]
    async fn test_fixed_closes_are_served_verbatim() {
        let closes: Vec<f64> = (0..40).map(|i| 1.1 + i as f64 * 0.001).collect();
        let service = MockMarketDataService::with_closes(closes.clone()).anchored_at(0);

        let series = service.fetch_candles(&eurusd(), Timeframe::M5, 30).await.unwrap();
        assert_eq!(series.len(), 30);
        let served = series.closes();
        for (got, want) in served.iter().zip(&closes[10..]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let service = MockMarketDataService::failing(AnalysisError::NetworkError("down".into()));
        let result = service.fetch_candles(&eurusd(), Timeframe::H1, 10).await;
        assert_eq!(result, Err(AnalysisError::NetworkError("down".into())));
    }
}
