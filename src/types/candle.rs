use serde::{Deserialize, Serialize};

/// OHLCV record for one time interval.
///
/// Feature flattening always uses `(open, close, high, low, volume)` order,
/// matching the compact array form of the input data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandleRepr")]
pub struct Candlestick {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Candlestick {
    pub const FIELDS: usize = 5;

    pub fn new(open: f64, close: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            open,
            close,
            high,
            low,
            volume,
        }
    }

    pub fn to_array(&self) -> [f64; Self::FIELDS] {
        [self.open, self.close, self.high, self.low, self.volume]
    }
}

/// Input candles come either as `[open, close, high, low, volume]` rows or
/// as named objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandleRepr {
    Array([f64; 5]),
    Object {
        open: f64,
        close: f64,
        high: f64,
        low: f64,
        volume: f64,
    },
}

impl From<CandleRepr> for Candlestick {
    fn from(repr: CandleRepr) -> Self {
        match repr {
            CandleRepr::Array([open, close, high, low, volume]) => {
                Self::new(open, close, high, low, volume)
            }
            CandleRepr::Object {
                open,
                close,
                high,
                low,
                volume,
            } => Self::new(open, close, high, low, volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_array_field_order() {
        let candle = Candlestick::new(1.0, 2.0, 3.0, 4.0, 5.0);
        assert_eq!(candle.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_deserialize_array_form() {
        let candle: Candlestick = serde_json::from_str("[1.1, 1.2, 1.3, 1.0, 1000.0]").unwrap();
        assert_eq!(candle, Candlestick::new(1.1, 1.2, 1.3, 1.0, 1000.0));
    }

    #[test]
    fn test_deserialize_object_form() {
        let json = r#"{"open": 1.1, "close": 1.2, "high": 1.3, "low": 1.0, "volume": 1000.0}"#;
        let candle: Candlestick = serde_json::from_str(json).unwrap();
        assert_eq!(candle, Candlestick::new(1.1, 1.2, 1.3, 1.0, 1000.0));
    }
}
