pub mod types;

pub use types::{
    Direction, Forecast, ForecastMethod, IndicatorSet, IndicatorSnapshot, MacdPoint, Signal,
};
