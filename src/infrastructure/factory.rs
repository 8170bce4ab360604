use crate::config::{Provider, ProviderEnvConfig};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::oanda::OandaMarketDataService;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    /// Builds the configured candle provider. `mock_seed` only applies to the mock.
    pub fn create_market_data(
        config: &ProviderEnvConfig,
        mock_seed: u64,
    ) -> Result<Arc<dyn MarketDataService>> {
        match config.provider {
            Provider::Mock => {
                info!("ServiceFactory: Using mock market data (seed {})", mock_seed);
                Ok(Arc::new(MockMarketDataService::new(mock_seed)))
            }
            Provider::Oanda => {
                if config.oanda.api_key.trim().is_empty() {
                    anyhow::bail!("OANDA_API_KEY must be set when FX_PROVIDER=oanda");
                }
                info!(
                    "ServiceFactory: Using OANDA market data at {}",
                    config.oanda.api_base_url
                );
                Ok(Arc::new(OandaMarketDataService::new(
                    config.oanda.api_base_url.clone(),
                    config.oanda.session(),
                    &config.http.client_settings(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_is_default() {
        let service = ServiceFactory::create_market_data(&ProviderEnvConfig::default(), 1).unwrap();
        assert_eq!(service.name(), "mock");
    }

    #[test]
    fn test_oanda_requires_key() {
        let mut config = ProviderEnvConfig {
            provider: Provider::Oanda,
            ..ProviderEnvConfig::default()
        };
        assert!(ServiceFactory::create_market_data(&config, 1).is_err());

        config.oanda.api_key = "token".to_string();
        config.oanda.api_base_url = "https://api-fxpractice.oanda.com".to_string();
        let service = ServiceFactory::create_market_data(&config, 1).unwrap();
        assert_eq!(service.name(), "oanda");
    }
}
