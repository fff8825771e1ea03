//! Candlestick pattern flags.
//!
//! - Doji: range > 0 and body ≤ 10% of range
//! - Hammer: lower wick > 2 × body, upper wick < body, close > open
//! - Bullish engulfing: previous bar bearish, current bullish,
//!   open < previous close and close > previous open
//! - Bearish engulfing: the mirror image
//!
//! Engulfing needs a previous bar, so index 0 never engulfs.

use serde::Serialize;

use crate::domain::ohlcv::OhlcvBar;

pub const DOJI_BODY_RATIO: f64 = 0.1;
pub const HAMMER_WICK_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Doji,
    Hammer,
    BullishEngulfing,
    BearishEngulfing,
}

impl Pattern {
    /// Whether this pattern fires on `bars[index]`.
    pub fn matches(self, bars: &[OhlcvBar], index: usize) -> bool {
        let Some(bar) = bars.get(index) else {
            return false;
        };
        match self {
            Pattern::Doji => is_doji(bar),
            Pattern::Hammer => is_hammer(bar),
            Pattern::BullishEngulfing => index
                .checked_sub(1)
                .is_some_and(|p| is_bullish_engulfing(&bars[p], bar)),
            Pattern::BearishEngulfing => index
                .checked_sub(1)
                .is_some_and(|p| is_bearish_engulfing(&bars[p], bar)),
        }
    }
}

pub fn is_doji(bar: &OhlcvBar) -> bool {
    let range = bar.range();
    range > 0.0 && bar.body() <= DOJI_BODY_RATIO * range
}

pub fn is_hammer(bar: &OhlcvBar) -> bool {
    let body = bar.body();
    bar.lower_wick() > HAMMER_WICK_RATIO * body && bar.upper_wick() < body && bar.is_bullish()
}

pub fn is_bullish_engulfing(prev: &OhlcvBar, bar: &OhlcvBar) -> bool {
    prev.is_bearish() && bar.is_bullish() && bar.open < prev.close && bar.close > prev.open
}

pub fn is_bearish_engulfing(prev: &OhlcvBar, bar: &OhlcvBar) -> bool {
    prev.is_bullish() && bar.is_bearish() && bar.open > prev.close && bar.close < prev.open
}

/// Per-bar booleans, one vector per pattern, aligned with the source bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternFlags {
    pub doji: Vec<bool>,
    pub hammer: Vec<bool>,
    pub bullish_engulfing: Vec<bool>,
    pub bearish_engulfing: Vec<bool>,
}

/// Indices at which each pattern fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternIndices {
    pub doji: Vec<usize>,
    pub hammer: Vec<usize>,
    pub bullish_engulfing: Vec<usize>,
    pub bearish_engulfing: Vec<usize>,
}

pub fn detect_patterns(bars: &[OhlcvBar]) -> PatternFlags {
    let flags = |pattern: Pattern| -> Vec<bool> {
        (0..bars.len()).map(|i| pattern.matches(bars, i)).collect()
    };
    PatternFlags {
        doji: flags(Pattern::Doji),
        hammer: flags(Pattern::Hammer),
        bullish_engulfing: flags(Pattern::BullishEngulfing),
        bearish_engulfing: flags(Pattern::BearishEngulfing),
    }
}

impl PatternFlags {
    pub fn indices(&self) -> PatternIndices {
        fn hits(flags: &[bool]) -> Vec<usize> {
            flags
                .iter()
                .enumerate()
                .filter_map(|(i, &hit)| hit.then_some(i))
                .collect()
        }
        PatternIndices {
            doji: hits(&self.doji),
            hammer: hits(&self.hammer),
            bullish_engulfing: hits(&self.bullish_engulfing),
            bearish_engulfing: hits(&self.bearish_engulfing),
        }
    }
}
