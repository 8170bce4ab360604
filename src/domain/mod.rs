// Indicator, signal and forecast types
pub mod analysis;

// Domain-specific error types
pub mod errors;

// Candles, pairs and timeframes
pub mod market;

// Port interfaces
pub mod ports;

// Provider credentials
pub mod session;
