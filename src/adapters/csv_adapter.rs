//! CSV file data adapter.
//!
//! Reads `date,open,high,low,close,volume` files. The configured path is
//! either a single CSV file or a directory holding one `<SYMBOL>.csv` per
//! symbol.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::error::FinbytesError;
use crate::domain::metrics::BarInterval;
use crate::domain::ohlcv::{OhlcvBar, OhlcvSeries};
use crate::ports::data_port::DataPort;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.base_path.is_dir() {
            self.base_path.join(format!("{symbol}.csv"))
        } else {
            self.base_path.clone()
        }
    }

    fn read_bars(path: &Path) -> Result<Vec<OhlcvBar>, FinbytesError> {
        let content = fs::read_to_string(path).map_err(|e| FinbytesError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| FinbytesError::DataSource {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            bars.push(OhlcvBar {
                date: parse_date(&row.date).ok_or_else(|| FinbytesError::DataSource {
                    reason: format!(
                        "{}: invalid date '{}' on data row {}",
                        path.display(),
                        row.date,
                        line + 1
                    ),
                })?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part which is dropped.
/// Two rows on the same day then fail the strictly-increasing date check.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl DataPort for CsvAdapter {
    fn fetch(
        &self,
        symbol: &str,
        interval: BarInterval,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<OhlcvSeries, FinbytesError> {
        let path = self.csv_path(symbol);
        debug!(%symbol, %interval, path = %path.display(), "reading CSV bars");

        let mut bars = Self::read_bars(&path)?;
        let total = bars.len();
        bars.retain(|b| start.is_none_or(|s| b.date >= s) && end.is_none_or(|e| b.date <= e));
        if bars.is_empty() && total > 0 {
            warn!(%symbol, total, "no bars inside the requested date window");
        }

        bars.sort_by_key(|b| b.date);
        debug!(%symbol, bars = bars.len(), "loaded bars");
        OhlcvSeries::new(bars)
    }
}
