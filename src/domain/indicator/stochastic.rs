//! Stochastic oscillator.
//!
//! %K(n) = 100 * (C - LL(n)) / (HH(n) - LL(n)) over the last n highs/lows;
//! a flat window (HH == LL) yields %K = 50.
//! %D(d) = SMA(d) of %K.
//!
//! Default parameters: k_period=14, d_period=3
//! Warmup: %K is defined from index k_period - 1; %D joins d_period - 1
//! bars later.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    k_period: usize,
    d_period: usize,
) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Stochastic { k_period, d_period };
    indicator_type.validate()?;

    let k_values: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            if i + 1 < k_period {
                return None;
            }
            let window = &bars[i + 1 - k_period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                Some(50.0)
            } else {
                Some(100.0 * (bars[i].close - lowest) / range)
            }
        })
        .collect();

    // %D only averages defined %K values; the leading gap is skipped.
    let first_k = k_period.saturating_sub(1).min(k_values.len());
    let defined_k: Vec<f64> = k_values[first_k..].iter().flatten().copied().collect();
    let mut d_values = vec![None; first_k];
    d_values.extend(rolling_mean(&defined_k, d_period));

    let values = k_values
        .iter()
        .zip(&d_values)
        .map(|(k, d)| Some(IndicatorValue::Stochastic { k: (*k)?, d: *d }));

    Ok(series_from(indicator_type, bars, values))
}
