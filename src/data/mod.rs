use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::types::AssetSeries;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} contains no series")]
    Empty { path: String },
}

/// Load asset/market candlestick series from a JSON file.
pub fn load_series(path: impl AsRef<Path>) -> Result<Vec<AssetSeries>, DataError> {
    let path = path.as_ref().display().to_string();

    let raw = std::fs::read_to_string(&path).map_err(|source| DataError::Read {
        path: path.clone(),
        source,
    })?;
    let series: Vec<AssetSeries> =
        serde_json::from_str(&raw).map_err(|source| DataError::Parse {
            path: path.clone(),
            source,
        })?;

    if series.is_empty() {
        return Err(DataError::Empty { path });
    }

    debug!("Parsed {} series from {}", series.len(), path);
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_array_form_candles() {
        let file = write_temp(
            r#"[
                {
                    "ticker": "BTC",
                    "candles": [[1.1, 1.2, 1.3, 1.0, 1000.0]],
                    "market_candles": [[1.5, 1.6, 1.7, 1.4, 2000.0]]
                }
            ]"#,
        );

        let series = load_series(file.path()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ticker, "BTC");
        assert_eq!(series[0].candles[0].high, 1.3);
        assert_eq!(series[0].market_candles[0].volume, 2000.0);
    }

    #[test]
    fn test_load_object_form_candles() {
        let file = write_temp(
            r#"[
                {
                    "ticker": "ETH",
                    "candles": [{"open": 2.1, "close": 2.2, "high": 2.3, "low": 2.0, "volume": 500.0}],
                    "market_candles": []
                }
            ]"#,
        );

        let series = load_series(file.path()).unwrap();
        assert_eq!(series[0].candles[0].open, 2.1);
        assert!(series[0].market_candles.is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_series("/nonexistent/series.json").unwrap_err();
        assert!(matches!(err, DataError::Read { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let file = write_temp("{ not json");
        let err = load_series(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let file = write_temp("[]");
        let err = load_series(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Empty { .. }));
    }
}
