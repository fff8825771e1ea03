//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: slow - 1 + signal - 1 bars (the signal EMA is seeded from the
//! first `signal` defined MACD values).

use crate::domain::error::FinbytesError;
use crate::domain::indicator::ema::{ema_over, ema_values};
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    indicator_type.validate()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_over(&macd_line, signal_period);

    let values = macd_line.iter().zip(&signal_line).map(|(line, signal)| {
        let (line, signal) = ((*line)?, (*signal)?);
        Some(IndicatorValue::Macd {
            line,
            signal,
            histogram: line - signal,
        })
    });

    Ok(series_from(indicator_type, bars, values))
}
