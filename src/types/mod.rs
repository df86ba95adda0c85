pub mod candle;
pub mod series;

pub use candle::*;
pub use series::*;
