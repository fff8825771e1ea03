//! JSON report adapter.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::FinbytesError;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct ReportRecord<'a> {
    symbol: &'a str,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

/// Writes each result as one flat JSON object: symbol, strategy, every
/// performance field, trades and equity curve. Batches become an array.
#[derive(Debug, Clone, Copy)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, symbol: &str, result: &BacktestResult) -> Result<String, FinbytesError> {
        self.to_json(&ReportRecord { symbol, result })
    }

    pub fn render_batch(
        &self,
        symbol: &str,
        results: &[BacktestResult],
    ) -> Result<String, FinbytesError> {
        let records: Vec<ReportRecord<'_>> = results
            .iter()
            .map(|result| ReportRecord { symbol, result })
            .collect();
        self.to_json(&records)
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, FinbytesError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.map_err(|e| FinbytesError::Io(std::io::Error::other(e)))
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        symbol: &str,
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), FinbytesError> {
        fs::write(output_path, self.render(symbol, result)?)?;
        info!(path = %output_path.display(), %symbol, "report written");
        Ok(())
    }

    fn write_batch(
        &self,
        symbol: &str,
        results: &[BacktestResult],
        output_path: &Path,
    ) -> Result<(), FinbytesError> {
        fs::write(output_path, self.render_batch(symbol, results)?)?;
        info!(
            path = %output_path.display(),
            %symbol,
            strategies = results.len(),
            "batch report written"
        );
        Ok(())
    }
}
