// Indicator, signal and forecast computation
pub mod analysis;

// Request orchestration
pub mod analysis_service;

// Market data caching
pub mod market_data;
