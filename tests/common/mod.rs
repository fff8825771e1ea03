#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use finbytes::domain::error::FinbytesError;
use finbytes::domain::metrics::BarInterval;
pub use finbytes::domain::ohlcv::{OhlcvBar, OhlcvSeries};
use finbytes::ports::data_port::DataPort;
use std::cell::Cell;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch(
        &self,
        symbol: &str,
        _interval: BarInterval,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<OhlcvSeries, FinbytesError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FinbytesError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start.is_none_or(|s| b.date >= s) && end.is_none_or(|e| b.date <= e))
            .collect();
        OhlcvSeries::new(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per `step_days`, open = high = low = close.
pub fn bars_from_closes(start: NaiveDate, step_days: i64, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + Duration::days(i as i64 * step_days),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn daily_series(closes: &[f64]) -> OhlcvSeries {
    OhlcvSeries::new(bars_from_closes(date(2024, 1, 1), 1, closes)).unwrap()
}

/// 50 closes: a slow decline, a steep rally that takes SMA(10) above SMA(20)
/// at index 24, then a reversal that crosses back at index 48.
pub fn crossover_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..20).map(|i| 120.0 - 0.5 * i as f64).collect();
    closes.extend((0..18).map(|i| 110.5 + 4.0 * (i + 1) as f64));
    closes.extend((0..12).map(|i| 182.5 - 3.0 * (i + 1) as f64));
    closes
}

/// 13 weekly bars, 2024-01-01 through 2024-03-25.
pub fn weekly_q1_2024() -> OhlcvSeries {
    let closes: Vec<f64> = (0..13)
        .map(|i| 100.0 + if i % 2 == 0 { i as f64 } else { -(i as f64) })
        .collect();
    OhlcvSeries::new(bars_from_closes(date(2024, 1, 1), 7, &closes)).unwrap()
}

pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
