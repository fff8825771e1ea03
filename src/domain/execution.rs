//! Order execution and fill simulation.
//!
//! Walks the bars once, in order, acting on each signal at either the close
//! of the signal bar or the open of the next one. Costs are charged per side
//! as a fraction of equity. A position still open after the last bar is
//! force-closed at the last close.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::cancel::CancelToken;
use super::error::FinbytesError;
use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;
use super::signal::{Signal, SignalSeries};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
const BPS_PER_UNIT: f64 = 10_000.0;

/// When a signal on bar i is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTiming {
    /// At the close of bar i.
    #[default]
    Close,
    /// At the open of bar i+1. A signal on the last bar is never filled.
    NextOpen,
}

impl FromStr for ExecutionTiming {
    type Err = FinbytesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(ExecutionTiming::Close),
            "next_open" => Ok(ExecutionTiming::NextOpen),
            other => Err(FinbytesError::invalid(
                "backtest",
                "execution_timing",
                format!("expected close or next_open, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for ExecutionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionTiming::Close => write!(f, "close"),
            ExecutionTiming::NextOpen => write!(f, "next_open"),
        }
    }
}

/// Configuration for backtest execution parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub initial_capital: f64,
    pub transaction_cost_bps: f64,
    pub timing: ExecutionTiming,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            transaction_cost_bps: 0.0,
            timing: ExecutionTiming::Close,
        }
    }
}

impl ExecutionConfig {
    /// Per-side cost as a fraction: bps / 10 000.
    pub fn cost_fraction(&self) -> f64 {
        bps_to_fraction(self.transaction_cost_bps)
    }

    pub fn validate(&self) -> Result<(), FinbytesError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(FinbytesError::invalid(
                "backtest",
                "initial_capital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if !self.transaction_cost_bps.is_finite()
            || self.transaction_cost_bps < 0.0
            || self.transaction_cost_bps >= BPS_PER_UNIT
        {
            return Err(FinbytesError::invalid(
                "backtest",
                "transaction_cost_bps",
                format!(
                    "must be within [0, 10000), got {}",
                    self.transaction_cost_bps
                ),
            ));
        }
        Ok(())
    }
}

pub fn bps_to_fraction(bps: f64) -> f64 {
    bps / BPS_PER_UNIT
}

/// Run the signal series through a fresh portfolio.
///
/// The token is checked before every bar; a cancelled run yields
/// `Cancelled` and discards everything simulated so far.
pub fn simulate(
    bars: &[OhlcvBar],
    signals: &SignalSeries,
    config: &ExecutionConfig,
    cancel: &CancelToken,
) -> Result<Portfolio, FinbytesError> {
    config.validate()?;
    if signals.len() != bars.len() {
        return Err(FinbytesError::DataSource {
            reason: format!(
                "signal series has {} entries for {} bars",
                signals.len(),
                bars.len()
            ),
        });
    }

    let cost = config.cost_fraction();
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut pending: Option<Signal> = None;
    let last = bars.len().saturating_sub(1);

    for (i, bar) in bars.iter().enumerate() {
        cancel.check()?;

        if let Some(order) = pending.take() {
            fill(&mut portfolio, order, i, bar.date, bar.open, cost);
        }

        portfolio.mark(bar.close);

        match config.timing {
            ExecutionTiming::Close => {
                fill(&mut portfolio, signals.signals[i], i, bar.date, bar.close, cost);
            }
            ExecutionTiming::NextOpen => {
                if i < last && signals.signals[i] != Signal::Hold {
                    pending = Some(signals.signals[i]);
                }
            }
        }

        if i == last && portfolio.is_long() {
            portfolio.close(i, bar.date, bar.close, cost, true);
        }

        portfolio.record_equity(bar.date);
    }

    Ok(portfolio)
}

fn fill(
    portfolio: &mut Portfolio,
    signal: Signal,
    index: usize,
    date: chrono::NaiveDate,
    price: f64,
    cost: f64,
) {
    match signal {
        Signal::Enter => portfolio.open(index, date, price, cost),
        Signal::Exit => {
            portfolio.close(index, date, price, cost, false);
        }
        Signal::Hold => {}
    }
}
