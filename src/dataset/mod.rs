use tracing::debug;

use crate::config::DatasetSettings;
use crate::types::{AssetSeries, Candlestick};

/// One flattened feature vector with its doubling label.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub features: Vec<f64>,
    pub label: f64,
}

/// Why a series contributed no windows at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AssetTooShort,
    MarketTooShort,
}

/// Per-series accounting for the built dataset.
#[derive(Debug, Clone)]
pub struct SeriesStats {
    pub ticker: String,
    pub asset_len: usize,
    pub market_len: usize,
    pub windows: usize,
    pub skipped: Option<SkipReason>,
}

/// Ordered training samples plus the per-series accounting that produced
/// them. Sample order follows (series, offset) order of the input.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub samples: Vec<TrainingSample>,
    pub series_stats: Vec<SeriesStats>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn features(&self, index: usize) -> Option<&[f64]> {
        self.samples.get(index).map(|s| s.features.as_slice())
    }

    pub fn positives(&self) -> usize {
        self.samples.iter().filter(|s| s.label >= 0.5).count()
    }
}

/// Slide a `window`-candle input across every series and label each window
/// by whether the asset's high reaches `doubling_multiplier` times the last
/// input candle's high within the next `lookahead` candles.
///
/// A series needs at least `window + lookahead` asset candles and `window`
/// market candles; shorter series are skipped without error. The offset
/// range is `0..asset_len - (window + lookahead)`, so a series of exactly
/// `window + lookahead` candles yields zero windows and each extra candle
/// adds one.
pub fn build_training_set(series: &[AssetSeries], settings: &DatasetSettings) -> TrainingSet {
    let w = settings.window;
    let h = settings.lookahead;

    let mut samples = Vec::new();
    let mut series_stats = Vec::with_capacity(series.len());

    for s in series {
        let asset_len = s.candles.len();
        let market_len = s.market_candles.len();

        let skipped = if asset_len < w + h {
            debug!(
                "Skipping {}: {} asset candles, need at least {}",
                s.ticker,
                asset_len,
                w + h
            );
            Some(SkipReason::AssetTooShort)
        } else if market_len < w {
            debug!(
                "Skipping {}: {} market candles, need at least {}",
                s.ticker, market_len, w
            );
            Some(SkipReason::MarketTooShort)
        } else {
            None
        };

        if skipped.is_some() {
            series_stats.push(SeriesStats {
                ticker: s.ticker.clone(),
                asset_len,
                market_len,
                windows: 0,
                skipped,
            });
            continue;
        }

        let mut windows = 0;
        for i in 0..asset_len - (w + h) {
            // A misaligned market series runs out before the asset does;
            // stop rather than index past its end.
            if i + w > market_len {
                debug!(
                    "{}: market series ends at {}, stopping after {} windows",
                    s.ticker, market_len, windows
                );
                break;
            }

            let features = flatten_windows(&s.candles[i..i + w], &s.market_candles[i..i + w]);
            let label = label_window(
                &s.candles[i + w - 1],
                &s.candles[i + w..i + w + h],
                settings.doubling_multiplier,
            );
            samples.push(TrainingSample { features, label });
            windows += 1;
        }

        series_stats.push(SeriesStats {
            ticker: s.ticker.clone(),
            asset_len,
            market_len,
            windows,
            skipped: None,
        });
    }

    TrainingSet {
        samples,
        series_stats,
    }
}

/// Concatenate asset window then market window, flattening each candle's
/// fields in (open, close, high, low, volume) order.
fn flatten_windows(asset: &[Candlestick], market: &[Candlestick]) -> Vec<f64> {
    let mut features = Vec::with_capacity((asset.len() + market.len()) * Candlestick::FIELDS);
    for candle in asset.iter().chain(market) {
        features.extend_from_slice(&candle.to_array());
    }
    features
}

/// 1 when the lookahead's peak high reaches the reference high times the
/// multiplier, else 0.
fn label_window(reference: &Candlestick, lookahead: &[Candlestick], multiplier: f64) -> f64 {
    let peak = lookahead.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    if peak >= reference.high * multiplier {
        1.0
    } else {
        0.0
    }
}
