//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, aligned by index
//!   with the bars it was computed from
//!
//! A point whose lookback window is not yet full carries `None`. Consumers
//! must handle the missing case explicitly; nothing is coerced to zero.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod patterns;
pub mod pivots;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod wma;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, calculate_volume_sma};
pub use stddev::calculate_stddev;
pub use stochastic::calculate_stochastic;
pub use wma::calculate_wma;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::error::FinbytesError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

/// Serializes as a bare number for single-valued indicators and as an
/// object for the multi-line ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    /// `d` stays `None` until `d_period` values of %K exist.
    Stochastic {
        k: f64,
        d: Option<f64>,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Rsi(usize),
    Atr(usize),
    Stddev(usize),
    VolumeSma(usize),
    Obv,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorValue> {
        self.values.get(index).and_then(|p| p.value.as_ref())
    }

    /// The scalar at `index` for single-valued indicators.
    pub fn simple(&self, index: usize) -> Option<f64> {
        match self.get(index)? {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_defined(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Index of the first defined point, if any.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }
}

impl IndicatorType {
    /// Reject parameters no computation can honour.
    pub fn validate(&self) -> Result<(), FinbytesError> {
        let positive = |key: &str, period: usize| {
            if period < 1 {
                Err(FinbytesError::invalid(
                    "indicator",
                    key,
                    format!("{self} period must be at least 1"),
                ))
            } else {
                Ok(())
            }
        };

        match *self {
            IndicatorType::Sma(p)
            | IndicatorType::Ema(p)
            | IndicatorType::Wma(p)
            | IndicatorType::Rsi(p)
            | IndicatorType::Atr(p)
            | IndicatorType::VolumeSma(p) => positive("period", p),
            IndicatorType::Stddev(p) => {
                if p < 2 {
                    return Err(FinbytesError::invalid(
                        "indicator",
                        "period",
                        format!("{self} needs a period of at least 2 for a sample deviation"),
                    ));
                }
                Ok(())
            }
            IndicatorType::Obv => Ok(()),
            IndicatorType::Macd { fast, slow, signal } => {
                positive("fast", fast)?;
                positive("slow", slow)?;
                positive("signal", signal)?;
                if fast >= slow {
                    return Err(FinbytesError::invalid(
                        "indicator",
                        "fast",
                        format!("{self} fast period must be less than slow period"),
                    ));
                }
                Ok(())
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                positive("k_period", k_period)?;
                positive("d_period", d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                if period < 2 {
                    return Err(FinbytesError::invalid(
                        "indicator",
                        "period",
                        format!("{self} needs a period of at least 2 for a sample deviation"),
                    ));
                }
                let max_x100 = bollinger::MAX_STDDEV_MULT * 100.0;
                if stddev_mult_x100 == 0 || stddev_mult_x100 as f64 > max_x100 {
                    return Err(FinbytesError::invalid(
                        "indicator",
                        "stddev_mult",
                        format!(
                            "{self} band multiplier must be in (0, {}]",
                            bollinger::MAX_STDDEV_MULT
                        ),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Validate, then compute this indicator over `bars`.
    pub fn compute(&self, bars: &[OhlcvBar]) -> Result<IndicatorSeries, FinbytesError> {
        match *self {
            IndicatorType::Sma(p) => calculate_sma(bars, p),
            IndicatorType::Ema(p) => calculate_ema(bars, p),
            IndicatorType::Wma(p) => calculate_wma(bars, p),
            IndicatorType::Rsi(p) => calculate_rsi(bars, p),
            IndicatorType::Atr(p) => calculate_atr(bars, p),
            IndicatorType::Stddev(p) => calculate_stddev(bars, p),
            IndicatorType::VolumeSma(p) => calculate_volume_sma(bars, p),
            IndicatorType::Obv => Ok(calculate_obv(bars)),
            IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
            IndicatorType::Stochastic { k_period, d_period } => {
                calculate_stochastic(bars, k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => calculate_bollinger(bars, period, stddev_mult_x100),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Build a series from per-bar optional values.
pub(crate) fn series_from(
    indicator_type: IndicatorType,
    bars: &[OhlcvBar],
    values: impl IntoIterator<Item = Option<IndicatorValue>>,
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(values)
        .map(|(bar, value)| IndicatorPoint {
            date: bar.date,
            value,
        })
        .collect();
    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Rolling sample standard deviation (n-1 divisor) of a full window.
pub(crate) fn sample_stddev(window: &[f64]) -> f64 {
    let n = window.len();
    if n < 2 {
        return 0.0;
    }
    let mean = window.iter().sum::<f64>() / n as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
