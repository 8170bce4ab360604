use crate::domain::errors::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval requested from a market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    pub fn to_seconds(&self) -> i64 {
        self.to_minutes() * 60
    }

    pub fn to_millis(&self) -> i64 {
        self.to_seconds() * 1000
    }

    /// Converts to OANDA API granularity string
    pub fn to_oanda_string(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D",
        }
    }

    /// Returns the start timestamp (ms) of the period containing `timestamp_ms`.
    /// Daily candles are aligned to midnight UTC.
    pub fn period_start(&self, timestamp_ms: i64) -> i64 {
        let period_ms = self.to_millis();
        timestamp_ms - timestamp_ms.rem_euclid(period_ms)
    }
}

impl FromStr for Timeframe {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m1" | "1m" | "1min" => Ok(Timeframe::M1),
            "m5" | "5m" | "5min" => Ok(Timeframe::M5),
            "m15" | "15m" | "15min" => Ok(Timeframe::M15),
            "m30" | "30m" | "30min" => Ok(Timeframe::M30),
            "h1" | "1h" | "1hour" => Ok(Timeframe::H1),
            "h4" | "4h" | "4hour" => Ok(Timeframe::H4),
            "d" | "d1" | "1d" | "1day" => Ok(Timeframe::D1),
            _ => Err(AnalysisError::validation(format!(
                "Invalid timeframe: '{}'. Valid options: M1, M5, M15, M30, H1, H4, D1",
                s
            ))),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
