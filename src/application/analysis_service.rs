//! One analysis request end to end: validate, fetch candles (through the
//! response cache), compute indicators, derive the signal and the forecast.

use crate::application::analysis::{
    Forecaster, IndicatorConfig, SignalConfig, SignalGenerator, compute_indicators,
};
use crate::application::analysis::signal_generator::validate_risk;
use crate::application::market_data::{CacheKey, ResponseCache};
use crate::domain::analysis::{Forecast, ForecastMethod, IndicatorSnapshot, Signal};
use crate::domain::errors::AnalysisError;
use crate::domain::market::{Candle, CandleSeries, CurrencyPair, Timeframe};
use crate::domain::ports::MarketDataService;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const FETCH_CANDLES_TOOL: &str = "fetch_candles";
pub const MAX_PERIODS: usize = 5000;

/// Raw request as received from a caller; validated by [`AnalysisService::analyze`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub pair: String,
    pub timeframe: String,
    pub periods: usize,
    pub capital: Decimal,
    pub risk_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub pair: CurrencyPair,
    pub timeframe: Timeframe,
    pub provider: String,
    pub candle_count: usize,
    pub latest_candle: Candle,
    pub indicators: IndicatorSnapshot,
    pub signal: Signal,
    pub forecast: Forecast,
}

#[derive(Debug, Serialize)]
struct FetchArgs<'a> {
    pair: &'a CurrencyPair,
    timeframe: Timeframe,
    periods: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub forecast_method: ForecastMethod,
    pub cache_ttl: Duration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            forecast_method: ForecastMethod::LinearRegression,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

pub struct AnalysisService {
    market_data: Arc<dyn MarketDataService>,
    cache: ResponseCache<Arc<CandleSeries>>,
    indicator_config: IndicatorConfig,
    signal_generator: SignalGenerator,
    forecaster: Forecaster,
}

impl AnalysisService {
    pub fn new(market_data: Arc<dyn MarketDataService>, settings: AnalysisSettings) -> Self {
        Self {
            market_data,
            cache: ResponseCache::new(settings.cache_ttl),
            indicator_config: settings.indicators,
            signal_generator: SignalGenerator::new(settings.signal),
            forecaster: Forecaster::new(settings.forecast_method),
        }
    }

    pub fn cache(&self) -> &ResponseCache<Arc<CandleSeries>> {
        &self.cache
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let pair: CurrencyPair = request.pair.parse()?;
        let timeframe: Timeframe = request.timeframe.parse()?;
        validate_periods(request.periods)?;
        validate_risk(request.capital, request.risk_percent)?;

        let series = self.candles(&pair, timeframe, request.periods).await?;
        let report = self.analyze_series(&series, request.capital, request.risk_percent)?;

        info!(
            "AnalysisService: {} {} -> {} (confidence {:.2}), next close {}",
            pair,
            timeframe,
            report.signal.direction,
            report.signal.confidence,
            report.forecast.next_price
        );
        Ok(report)
    }

    /// Runs the pure part of the pipeline on an already fetched series.
    pub fn analyze_series(
        &self,
        series: &CandleSeries,
        capital: Decimal,
        risk_percent: Decimal,
    ) -> Result<AnalysisReport, AnalysisError> {
        let latest_candle = series.last().cloned().ok_or(AnalysisError::InsufficientData {
            required: self.indicator_config.min_points(),
            actual: 0,
        })?;

        let indicators = compute_indicators(&series.closes(), &self.indicator_config)?;
        let snapshot = indicators.latest().ok_or(AnalysisError::InsufficientData {
            required: self.indicator_config.min_points(),
            actual: series.len(),
        })?;

        let signal = self.signal_generator.generate_signal(
            series.pair(),
            &latest_candle,
            &indicators,
            capital,
            risk_percent,
        )?;
        let forecast = self.forecaster.forecast(series)?;

        Ok(AnalysisReport {
            pair: series.pair().clone(),
            timeframe: series.timeframe(),
            provider: self.market_data.name().to_string(),
            candle_count: series.len(),
            latest_candle,
            indicators: snapshot,
            signal,
            forecast,
        })
    }

    async fn candles(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
        periods: usize,
    ) -> Result<Arc<CandleSeries>, AnalysisError> {
        let key = CacheKey::new(
            FETCH_CANDLES_TOOL,
            &FetchArgs {
                pair,
                timeframe,
                periods,
            },
        )?;

        if let Some(series) = self.cache.get(&key) {
            debug!("AnalysisService: Cache hit for {} {} x{}", pair, timeframe, periods);
            return Ok(series);
        }

        let series = match self.market_data.fetch_candles(pair, timeframe, periods).await {
            Ok(series) => Arc::new(series),
            Err(e) => {
                warn!(
                    "AnalysisService: {} fetch failed for {}: {}",
                    self.market_data.name(),
                    pair,
                    e
                );
                return Err(e);
            }
        };

        self.cache.insert(key, series.clone());
        Ok(series)
    }
}

fn validate_periods(periods: usize) -> Result<(), AnalysisError> {
    if periods == 0 || periods > MAX_PERIODS {
        return Err(AnalysisError::validation(format!(
            "periods must be in 1..={}, got {}",
            MAX_PERIODS, periods
        )));
    }
    Ok(())
}
