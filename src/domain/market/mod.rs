pub mod candle;
pub mod pair;
pub mod timeframe;

pub use candle::{Candle, CandleSeries};
pub use pair::CurrencyPair;
pub use timeframe::Timeframe;
