//! OANDA infrastructure - Forex candle data.
//!
//! Provides [OandaMarketDataService] over the v20 REST API.

pub mod market_data;

pub use market_data::{OandaMarketDataService, parse_candles_response};
