pub mod core;
pub mod factory;
pub mod mock;
pub mod oanda;

pub use factory::ServiceFactory;
pub use mock::MockMarketDataService;
pub use oanda::OandaMarketDataService;
