use crate::domain::errors::AnalysisError;
use crate::domain::market::{CandleSeries, CurrencyPair, Timeframe};
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Fetches the most recent `periods` completed candles, oldest first.
    async fn fetch_candles(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
        periods: usize,
    ) -> Result<CandleSeries, AnalysisError>;

    fn name(&self) -> &'static str;
}
