use crate::domain::errors::AnalysisError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A currency pair such as EUR/USD.
///
/// Both legs are three-letter uppercase ISO codes and never equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PairLegs")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

// Deserialization goes through `CurrencyPair::new`
#[derive(Deserialize)]
struct PairLegs {
    base: String,
    quote: String,
}

impl TryFrom<PairLegs> for CurrencyPair {
    type Error = AnalysisError;

    fn try_from(legs: PairLegs) -> Result<Self, Self::Error> {
        CurrencyPair::new(&legs.base, &legs.quote)
    }
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Result<Self, AnalysisError> {
        let base = normalize_leg(base)?;
        let quote = normalize_leg(quote)?;
        if base == quote {
            return Err(AnalysisError::validation(format!(
                "Currency pair legs must differ: {}/{}",
                base, quote
            )));
        }
        Ok(Self { base, quote })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// OANDA instrument name, e.g. `EUR_USD`.
    pub fn to_oanda_instrument(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }

    /// Smallest standardized price increment: 0.01 for JPY pairs, 0.0001 otherwise.
    pub fn pip_size(&self) -> Decimal {
        if self.base == "JPY" || self.quote == "JPY" {
            dec!(0.01)
        } else {
            dec!(0.0001)
        }
    }

    /// Converts a price distance into pips (always non-negative).
    /// `None` when the pip count does not fit in a `Decimal`.
    pub fn to_pips(&self, distance: Decimal) -> Option<Decimal> {
        distance
            .abs()
            .checked_div(self.pip_size())
            .map(|pips| pips.round_dp(1))
    }
}

fn normalize_leg(leg: &str) -> Result<String, AnalysisError> {
    let leg = leg.trim().to_ascii_uppercase();
    if leg.len() != 3 || !leg.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AnalysisError::validation(format!(
            "Invalid currency code: '{}'",
            leg
        )));
    }
    Ok(leg)
}

impl FromStr for CurrencyPair {
    type Err = AnalysisError;

    /// Accepts `EUR/USD`, `EUR_USD`, `EUR-USD` and `EURUSD`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((base, quote)) = trimmed.split_once(['/', '_', '-']) {
            return CurrencyPair::new(base, quote);
        }

        if trimmed.len() == 6 && trimmed.is_ascii() {
            return CurrencyPair::new(&trimmed[..3], &trimmed[3..]);
        }

        Err(AnalysisError::validation(format!(
            "Cannot parse currency pair: '{}'",
            s
        )))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let expected = CurrencyPair::new("EUR", "USD").unwrap();
        assert_eq!("EUR/USD".parse::<CurrencyPair>().unwrap(), expected);
        assert_eq!("EUR_USD".parse::<CurrencyPair>().unwrap(), expected);
        assert_eq!("eur-usd".parse::<CurrencyPair>().unwrap(), expected);
        assert_eq!("EURUSD".parse::<CurrencyPair>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<CurrencyPair>().is_err());
        assert!("EURO/USD".parse::<CurrencyPair>().is_err());
        assert!("EUR/US1".parse::<CurrencyPair>().is_err());
        assert!("USD/USD".parse::<CurrencyPair>().is_err());
        assert!("EURUSDX".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_display_and_instrument() {
        let pair: CurrencyPair = "gbp_jpy".parse().unwrap();
        assert_eq!(pair.to_string(), "GBP/JPY");
        assert_eq!(pair.to_oanda_instrument(), "GBP_JPY");
    }

    #[test]
    fn test_pip_size() {
        let eurusd: CurrencyPair = "EUR/USD".parse().unwrap();
        let usdjpy: CurrencyPair = "USD/JPY".parse().unwrap();
        assert_eq!(eurusd.pip_size(), dec!(0.0001));
        assert_eq!(usdjpy.pip_size(), dec!(0.01));

        assert_eq!(eurusd.to_pips(dec!(0.0110)), Some(dec!(110)));
        assert_eq!(usdjpy.to_pips(dec!(-1.5)), Some(dec!(150)));
        assert_eq!(eurusd.to_pips(Decimal::MAX), None);
    }

    #[test]
    fn test_deserialize_validates_legs() {
        let pair: CurrencyPair = serde_json::from_str(r#"{"base":"eur","quote":"usd"}"#).unwrap();
        assert_eq!(pair.to_string(), "EUR/USD");

        assert!(serde_json::from_str::<CurrencyPair>(r#"{"base":"USD","quote":"USD"}"#).is_err());
        assert!(serde_json::from_str::<CurrencyPair>(r#"{"base":"EURO","quote":"USD"}"#).is_err());
    }
}
