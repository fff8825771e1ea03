//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by N-1), so n ≥ 2.
//! The multiplier is carried as hundredths to keep `IndicatorType` hashable,
//! so only multipliers that are exact hundredths up to `MAX_STDDEV_MULT` are
//! accepted.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{
    sample_stddev, series_from, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT: f64 = 2.0;
pub const MAX_STDDEV_MULT: f64 = 10.0;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    indicator_type.validate()?;

    let mult = stddev_mult_x100 as f64 / 100.0;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let values = (0..bars.len()).map(|i| {
        if i + 1 < period {
            return None;
        }
        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period as f64;
        let stddev = sample_stddev(window);
        Some(IndicatorValue::Bollinger {
            upper: middle + mult * stddev,
            middle,
            lower: middle - mult * stddev,
        })
    });

    Ok(series_from(indicator_type, bars, values))
}

/// Convert a band multiplier to the hundredths carried by `IndicatorType`.
///
/// `None` when the multiplier is not positive, exceeds `MAX_STDDEV_MULT`, or
/// has precision finer than hundredths.
pub fn mult_to_x100(stddev_mult: f64) -> Option<u32> {
    if !stddev_mult.is_finite() || stddev_mult <= 0.0 || stddev_mult > MAX_STDDEV_MULT {
        return None;
    }
    let scaled = stddev_mult * 100.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-9 || rounded < 1.0 {
        return None;
    }
    Some(rounded as u32)
}
