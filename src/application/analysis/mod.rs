pub mod analysis_config;
pub mod forecaster;
pub mod indicators;
pub mod rsi;
pub mod signal_generator;
pub mod statistical_features;

pub use analysis_config::{IndicatorConfig, SignalConfig};
pub use forecaster::{Forecaster, Projection};
pub use indicators::compute_indicators;
pub use signal_generator::SignalGenerator;
