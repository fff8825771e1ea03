//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low; TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! Seed at index n-1 is the mean of the first n true ranges, then
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Atr(period);
    indicator_type.validate()?;

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let n = period as f64;
    let mut atr = 0.0;
    let mut values = Vec::with_capacity(bars.len());

    for (i, tr) in tr_values.iter().enumerate() {
        if i + 1 < period {
            values.push(None);
            continue;
        }
        atr = if i + 1 == period {
            tr_values[..=i].iter().sum::<f64>() / n
        } else {
            (atr * (n - 1.0) + tr) / n
        };
        values.push(Some(IndicatorValue::Simple(atr)));
    }

    Ok(series_from(indicator_type, bars, values))
}
