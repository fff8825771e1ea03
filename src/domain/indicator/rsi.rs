//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes to compute initial average).

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Rsi(period);
    indicator_type.validate()?;

    let mut values: Vec<Option<IndicatorValue>> = vec![None; bars.len()];
    if bars.len() <= period {
        return Ok(series_from(indicator_type, bars, values));
    }

    let n = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < period {
            avg_gain += gain;
            avg_loss += loss;
            continue;
        }

        if i == period {
            avg_gain = (avg_gain + gain) / n;
            avg_loss = (avg_loss + loss) / n;
        } else {
            avg_gain = (avg_gain * (n - 1.0) + gain) / n;
            avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        }

        values[i] = Some(IndicatorValue::Simple(rsi_from(avg_gain, avg_loss)));
    }

    Ok(series_from(indicator_type, bars, values))
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
