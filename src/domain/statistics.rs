//! Descriptive statistics of a price series.

use serde::Serialize;

use super::metrics::{annualized_sharpe, mean_and_sample_stddev, BarInterval};
use super::ohlcv::OhlcvSeries;

/// Close-to-close return statistics. Returns are fractions; the price
/// change is in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub mean_return: f64,
    pub std_return: f64,
    pub sharpe_ratio: f64,
    pub max_gain: f64,
    pub max_loss: f64,
    pub volatility: f64,
    pub last_price: f64,
    pub price_change_pct: f64,
}

pub fn series_statistics(series: &OhlcvSeries, interval: BarInterval) -> SeriesStatistics {
    let closes = series.closes();
    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();

    let (mean_return, std_return) = match mean_and_sample_stddev(&returns) {
        Some(pair) => pair,
        None => (returns.first().copied().unwrap_or(0.0), 0.0),
    };

    let first = closes[0];
    let last_price = closes[closes.len() - 1];

    SeriesStatistics {
        mean_return,
        std_return,
        sharpe_ratio: annualized_sharpe(&returns, interval.periods_per_year()),
        max_gain: returns.iter().copied().reduce(f64::max).unwrap_or(0.0),
        max_loss: returns.iter().copied().reduce(f64::min).unwrap_or(0.0),
        volatility: std_return * interval.periods_per_year().sqrt(),
        last_price,
        price_change_pct: (last_price - first) / first * 100.0,
    }
}
