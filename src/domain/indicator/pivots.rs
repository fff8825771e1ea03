//! Pivot detection and support/resistance levels.
//!
//! Bar i is a pivot high when its high is ≥ every high in [i-w, i+w], and a
//! pivot low when its low is ≤ every low in that window. Only bars with a
//! full window on both sides are considered. Unlike the other indicators
//! this yields a list of pivots rather than a per-bar series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::FinbytesError;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_MIN_TOUCHES: usize = 2;
/// Fractional band around a level within which a bar counts as a touch.
pub const TOUCH_TOLERANCE: f64 = 0.02;
pub const MAX_LEVELS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub index: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub kind: PivotKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportResistance {
    /// Ascending.
    pub support: Vec<f64>,
    /// Descending.
    pub resistance: Vec<f64>,
}

fn check_window(window: usize) -> Result<(), FinbytesError> {
    if window < 1 {
        return Err(FinbytesError::invalid(
            "indicator",
            "window",
            "pivot window must be at least 1",
        ));
    }
    Ok(())
}

/// Pivots in index order. A bar that is both a pivot high and a pivot low
/// (possible on a flat stretch) yields two entries, high first.
pub fn find_pivots(bars: &[OhlcvBar], window: usize) -> Result<Vec<Pivot>, FinbytesError> {
    check_window(window)?;

    let mut pivots = Vec::new();
    if bars.len() <= 2 * window {
        return Ok(pivots);
    }

    for i in window..bars.len() - window {
        let neighbourhood = &bars[i - window..=i + window];
        let bar = &bars[i];
        if neighbourhood.iter().all(|b| bar.high >= b.high) {
            pivots.push(Pivot {
                index: i,
                date: bar.date,
                price: bar.high,
                kind: PivotKind::High,
            });
        }
        if neighbourhood.iter().all(|b| bar.low <= b.low) {
            pivots.push(Pivot {
                index: i,
                date: bar.date,
                price: bar.low,
                kind: PivotKind::Low,
            });
        }
    }

    Ok(pivots)
}

/// Pivot prices touched by at least `min_touches` bars within ±2%.
pub fn support_resistance_levels(
    bars: &[OhlcvBar],
    window: usize,
    min_touches: usize,
) -> Result<SupportResistance, FinbytesError> {
    let pivots = find_pivots(bars, window)?;

    let touches = |level: f64, price: fn(&OhlcvBar) -> f64| {
        let lo = level * (1.0 - TOUCH_TOLERANCE);
        let hi = level * (1.0 + TOUCH_TOLERANCE);
        bars.iter()
            .map(price)
            .filter(|p| *p >= lo && *p <= hi)
            .count()
    };

    let mut resistance: Vec<f64> = pivots
        .iter()
        .filter(|p| p.kind == PivotKind::High)
        .map(|p| p.price)
        .filter(|&level| touches(level, |b| b.high) >= min_touches)
        .collect();
    let mut support: Vec<f64> = pivots
        .iter()
        .filter(|p| p.kind == PivotKind::Low)
        .map(|p| p.price)
        .filter(|&level| touches(level, |b| b.low) >= min_touches)
        .collect();

    resistance.sort_by(|a, b| b.total_cmp(a));
    resistance.dedup();
    resistance.truncate(MAX_LEVELS);

    support.sort_by(|a, b| a.total_cmp(b));
    support.dedup();
    support.truncate(MAX_LEVELS);

    Ok(SupportResistance {
        support,
        resistance,
    })
}
