use crate::application::analysis::statistical_features::linear_regression;
use crate::domain::analysis::{Forecast, ForecastMethod};
use crate::domain::errors::AnalysisError;
use crate::domain::market::CandleSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Maximum relative move of the seeded random walk (±0.5%)
const RANDOM_WALK_BAND: f64 = 0.005;
/// Fixed confidence of the placeholder methods
const PLACEHOLDER_CONFIDENCE: f64 = 0.5;

/// A next-close estimate before it is attached to a pair and timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub next_price: f64,
    pub confidence: f64,
}

pub struct Forecaster {
    method: ForecastMethod,
}

impl Forecaster {
    pub fn new(method: ForecastMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> ForecastMethod {
        self.method
    }

    /// Projects the next close of a bare close series, one index step ahead.
    pub fn project(&self, closes: &[f64]) -> Result<Projection, AnalysisError> {
        let xs: Vec<f64> = (0..closes.len()).map(|i| i as f64).collect();
        self.project_on_axis(&xs, closes, closes.len() as f64)
    }

    /// Projects the next close of `series`, one timeframe interval past its
    /// last candle.
    pub fn forecast(&self, series: &CandleSeries) -> Result<Forecast, AnalysisError> {
        let closes = series.closes();
        let last = series.last().ok_or(AnalysisError::InsufficientData {
            required: self.method.min_points(),
            actual: 0,
        })?;

        // Timestamps in interval units keep the regression well conditioned
        let step = series.timeframe().to_millis() as f64;
        let first_ts = series.candles()[0].timestamp;
        let xs: Vec<f64> = series
            .timestamps()
            .iter()
            .map(|ts| (ts - first_ts) as f64 / step)
            .collect();

        // One interval past the last candle, whatever gap precedes it
        let next_x = xs.last().map_or(0.0, |x| x + 1.0);
        let projection = self.project_on_axis(&xs, &closes, next_x)?;
        let next_price = Decimal::from_f64(projection.next_price)
            .map(|d| d.round_dp(series.pair().pip_size().scale() + 1))
            .ok_or_else(|| {
                AnalysisError::validation(format!(
                    "Projected price is not representable: {}",
                    projection.next_price
                ))
            })?;

        Ok(Forecast {
            pair: series.pair().clone(),
            next_price,
            confidence: projection.confidence,
            timestamp: last.timestamp + series.timeframe().to_millis(),
            method: self.method,
        })
    }

    fn project_on_axis(
        &self,
        xs: &[f64],
        closes: &[f64],
        next_x: f64,
    ) -> Result<Projection, AnalysisError> {
        let required = self.method.min_points();
        if closes.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                actual: closes.len(),
            });
        }
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(AnalysisError::validation("Close series contains non-finite values"));
        }

        let last = closes[closes.len() - 1];
        match self.method {
            ForecastMethod::TrendContinuation => {
                let prev = closes[closes.len() - 2];
                Ok(Projection {
                    next_price: last + (last - prev),
                    confidence: PLACEHOLDER_CONFIDENCE,
                })
            }
            ForecastMethod::LinearRegression => {
                let fit = linear_regression(xs, closes).ok_or_else(|| {
                    AnalysisError::validation("Regression axis is degenerate")
                })?;
                Ok(Projection {
                    next_price: fit.predict(next_x),
                    confidence: fit.r_squared,
                })
            }
            ForecastMethod::SeededRandomWalk { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let change = rng.random_range(-RANDOM_WALK_BAND..=RANDOM_WALK_BAND);
                Ok(Projection {
                    next_price: last * (1.0 + change),
                    confidence: PLACEHOLDER_CONFIDENCE,
                })
            }
        }
    }
}
