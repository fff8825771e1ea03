//! OHLCV bar representation and validated series.

use chrono::NaiveDate;
use std::ops::Deref;

use crate::domain::error::FinbytesError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    fn validate(&self, index: usize) -> Result<(), FinbytesError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FinbytesError::bar(
                    index,
                    field,
                    format!("price must be positive and finite, got {value}"),
                ));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(FinbytesError::bar(
                index,
                "volume",
                format!("volume must be non-negative and finite, got {}", self.volume),
            ));
        }
        if self.high < self.low {
            return Err(FinbytesError::bar(index, "high", "high below low"));
        }
        if self.high < self.open.max(self.close) {
            return Err(FinbytesError::bar(index, "high", "high below open/close"));
        }
        if self.low > self.open.min(self.close) {
            return Err(FinbytesError::bar(index, "low", "low above open/close"));
        }
        Ok(())
    }
}

/// A non-empty, date-ordered sequence of validated bars.
///
/// Every stage downstream of ingestion borrows the series read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvSeries {
    bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, FinbytesError> {
        if bars.is_empty() {
            return Err(FinbytesError::EmptySeries);
        }
        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(FinbytesError::bar(
                    i,
                    "date",
                    format!(
                        "dates must be strictly increasing ({} follows {})",
                        bar.date,
                        bars[i - 1].date
                    ),
                ));
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl Deref for OhlcvSeries {
    type Target = [OhlcvBar];

    fn deref(&self) -> &[OhlcvBar] {
        &self.bars
    }
}
