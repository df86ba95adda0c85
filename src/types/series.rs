use serde::{Deserialize, Serialize};

use super::Candlestick;

/// One asset's candlestick history paired with the market-index candlesticks
/// covering the same time axis, aligned index-for-index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSeries {
    pub ticker: String,
    pub candles: Vec<Candlestick>,
    pub market_candles: Vec<Candlestick>,
}

impl AssetSeries {
    pub fn new(
        ticker: impl Into<String>,
        candles: Vec<Candlestick>,
        market_candles: Vec<Candlestick>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            candles,
            market_candles,
        }
    }
}
