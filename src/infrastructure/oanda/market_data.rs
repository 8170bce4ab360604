//! OANDA v20 candle provider.
//!
//! Fetches midpoint candles from `/v3/instruments/{instrument}/candles` and
//! maps transport, status and payload failures onto [`AnalysisError`].

use crate::domain::errors::AnalysisError;
use crate::domain::market::{Candle, CandleSeries, CurrencyPair, Timeframe};
use crate::domain::ports::MarketDataService;
use crate::domain::session::ApiSession;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, HttpClientSettings, build_url_with_query,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::ClientWithMiddleware;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

/// OANDA rejects requests for more candles than this
pub const OANDA_MAX_COUNT: usize = 5000;

pub struct OandaMarketDataService {
    client: ClientWithMiddleware,
    api_base_url: String,
    session: ApiSession,
}

impl OandaMarketDataService {
    pub fn new(api_base_url: String, session: ApiSession, settings: &HttpClientSettings) -> Self {
        Self {
            client: HttpClientFactory::create_client(settings),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }
}

#[async_trait]
impl MarketDataService for OandaMarketDataService {
    async fn fetch_candles(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
        periods: usize,
    ) -> Result<CandleSeries, AnalysisError> {
        self.session.ensure_valid(Utc::now())?;

        // One extra candle: the newest one is usually still forming
        let count = (periods + 1).min(OANDA_MAX_COUNT);
        let base = format!(
            "{}/v3/instruments/{}/candles",
            self.api_base_url,
            pair.to_oanda_instrument()
        );
        let url = build_url_with_query(
            &base,
            &[
                ("granularity", timeframe.to_oanda_string().to_string()),
                ("count", count.to_string()),
                ("price", "M".to_string()), // Midpoint candles
            ],
        );

        info!(
            "OandaMarketDataService: Fetching {} {} candles for {}",
            count, timeframe, pair
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.session.bearer_header())
            .header("Accept-Datetime-Format", "RFC3339")
            .send()
            .await
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            warn!(
                "OandaMarketDataService: {} returned HTTP {}",
                pair,
                status.as_u16()
            );
            return Err(AnalysisError::UpstreamError {
                status: status.as_u16(),
                body: truncate(&body, 512),
            });
        }

        let series = parse_candles_response(pair, timeframe, &body)?;
        keep_latest(series, periods)
    }

    fn name(&self) -> &'static str {
        "oanda"
    }
}

/// Decodes an OANDA candles payload into a validated series.
///
/// Incomplete candles and candles without a `mid` block are skipped.
pub fn parse_candles_response(
    pair: &CurrencyPair,
    timeframe: Timeframe,
    body: &str,
) -> Result<CandleSeries, AnalysisError> {
    let resp: OandaCandlesResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::invalid_shape(format!("Undecodable candles payload: {}", e)))?;

    let mut candles = Vec::with_capacity(resp.candles.len());
    for c in resp.candles {
        if !c.complete {
            continue;
        }
        let Some(mid) = c.mid else {
            warn!("OandaMarketDataService: Candle at {} has no mid prices, skipping", c.time);
            continue;
        };

        let timestamp = chrono::DateTime::parse_from_rfc3339(&c.time)
            .map_err(|e| {
                AnalysisError::invalid_shape(format!("Bad candle time '{}': {}", c.time, e))
            })?
            .timestamp_millis();

        candles.push(Candle {
            timestamp,
            open: parse_price("o", &mid.o)?,
            high: parse_price("h", &mid.h)?,
            low: parse_price("l", &mid.l)?,
            close: parse_price("c", &mid.c)?,
            volume: Decimal::from(c.volume),
        });
    }

    CandleSeries::new(pair.clone(), timeframe, candles)
}

fn parse_price(field: &str, raw: &str) -> Result<Decimal, AnalysisError> {
    raw.parse::<Decimal>()
        .map_err(|e| AnalysisError::invalid_shape(format!("Bad price {}='{}': {}", field, raw, e)))
}

fn keep_latest(series: CandleSeries, periods: usize) -> Result<CandleSeries, AnalysisError> {
    if series.len() <= periods {
        return Ok(series);
    }
    let skip = series.len() - periods;
    let pair = series.pair().clone();
    let timeframe = series.timeframe();
    CandleSeries::new(pair, timeframe, series.candles()[skip..].to_vec())
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

// OANDA JSON Structures for Market Data
#[derive(Debug, Deserialize)]
struct OandaCandlesResponse {
    candles: Vec<OandaCandle>,
}

#[derive(Debug, Deserialize)]
struct OandaCandle {
    complete: bool,
    volume: i64,
    time: String,
    mid: Option<OandaCandleOHLC>,
}

#[derive(Debug, Deserialize)]
struct OandaCandleOHLC {
    o: String,
    h: String,
    l: String,
    c: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eurusd() -> CurrencyPair {
        "EUR/USD".parse().unwrap()
    }

    const PAYLOAD: &str = r#"{
        "instrument": "EUR_USD",
        "granularity": "H1",
        "candles": [
            {"complete": true, "volume": 1520, "time": "2024-01-02T10:00:00.000000000Z",
             "mid": {"o": "1.09410", "h": "1.09480", "l": "1.09350", "c": "1.09455"}},
            {"complete": true, "volume": 1388, "time": "2024-01-02T11:00:00.000000000Z",
             "mid": {"o": "1.09455", "h": "1.09500", "l": "1.09400", "c": "1.09420"}},
            {"complete": false, "volume": 211, "time": "2024-01-02T12:00:00.000000000Z",
             "mid": {"o": "1.09420", "h": "1.09430", "l": "1.09410", "c": "1.09425"}}
        ]
    }"#;

    #[test]
    fn test_parse_skips_incomplete() {
        let series = parse_candles_response(&eurusd(), Timeframe::H1, PAYLOAD).unwrap();
        assert_eq!(series.len(), 2);

        let first = &series.candles()[0];
        assert_eq!(first.timestamp, 1_704_189_600_000);
        assert_eq!(first.open, dec!(1.09410));
        assert_eq!(first.close, dec!(1.09455));
        assert_eq!(first.volume, dec!(1520));
    }

    #[test]
    fn test_keep_latest_trims_oldest() {
        let series = parse_candles_response(&eurusd(), Timeframe::H1, PAYLOAD).unwrap();
        let trimmed = keep_latest(series, 1).unwrap();
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed.last().unwrap().close, dec!(1.09420));
    }

    #[test]
    fn test_bad_json_is_invalid_shape() {
        let result = parse_candles_response(&eurusd(), Timeframe::H1, "<html>oops</html>");
        assert!(matches!(result, Err(AnalysisError::InvalidResponseShape(_))));

        let missing = parse_candles_response(&eurusd(), Timeframe::H1, r#"{"instrument":"EUR_USD"}"#);
        assert!(matches!(missing, Err(AnalysisError::InvalidResponseShape(_))));
    }

    #[test]
    fn test_bad_price_is_invalid_shape() {
        let body = r#"{"candles": [{"complete": true, "volume": 1, "time": "2024-01-02T10:00:00Z",
            "mid": {"o": "abc", "h": "1.1", "l": "1.0", "c": "1.05"}}]}"#;
        assert!(matches!(
            parse_candles_response(&eurusd(), Timeframe::H1, body),
            Err(AnalysisError::InvalidResponseShape(_))
        ));
    }

    #[test]
    fn test_ohlc_violation_is_invalid_shape() {
        let body = r#"{"candles": [{"complete": true, "volume": 1, "time": "2024-01-02T10:00:00Z",
            "mid": {"o": "1.2", "h": "1.1", "l": "1.0", "c": "1.05"}}]}"#;
        assert!(matches!(
            parse_candles_response(&eurusd(), Timeframe::H1, body),
            Err(AnalysisError::InvalidResponseShape(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_session_short_circuits() {
        let expired = ApiSession::new("token", Some(Utc::now() - chrono::Duration::minutes(5)));
        let service = OandaMarketDataService::new(
            "http://127.0.0.1:9".to_string(),
            expired,
            &HttpClientSettings::default(),
        );

        let result = service.fetch_candles(&eurusd(), Timeframe::H1, 50).await;
        assert!(matches!(result, Err(AnalysisError::SessionExpired { .. })));
    }
}
