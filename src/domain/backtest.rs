//! Backtest engine: signals, execution and metrics for one strategy, plus a
//! parallel batch runner over many strategies sharing one series.

use rayon::prelude::*;
use serde::Serialize;

use super::cancel::CancelToken;
use super::error::FinbytesError;
use super::execution::{simulate, ExecutionConfig, ExecutionTiming, DEFAULT_INITIAL_CAPITAL};
use super::metrics::{BarInterval, MetricsOptions, PerformanceReport};
use super::ohlcv::OhlcvSeries;
use super::portfolio::EquityPoint;
use super::position::Trade;
use super::signal::{generate_signals, SignalSeries};
use super::strategy::StrategySpec;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub transaction_cost_bps: f64,
    pub execution_timing: ExecutionTiming,
    pub interval: BarInterval,
    pub exclude_forced: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            transaction_cost_bps: 0.0,
            execution_timing: ExecutionTiming::Close,
            interval: BarInterval::Daily,
            exclude_forced: false,
        }
    }
}

impl BacktestConfig {
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            initial_capital: self.initial_capital,
            transaction_cost_bps: self.transaction_cost_bps,
            timing: self.execution_timing,
        }
    }

    pub fn metrics_options(&self) -> MetricsOptions {
        MetricsOptions {
            interval: self.interval,
            exclude_forced: self.exclude_forced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: StrategySpec,
    #[serde(skip)]
    pub signals: SignalSeries,
    #[serde(flatten)]
    pub report: PerformanceReport,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

pub fn run_backtest(
    series: &OhlcvSeries,
    strategy: &StrategySpec,
    config: &BacktestConfig,
    cancel: &CancelToken,
) -> Result<BacktestResult, FinbytesError> {
    let execution = config.execution();
    execution.validate()?;

    let signals = generate_signals(strategy, series)?;
    let portfolio = simulate(series, &signals, &execution, cancel)?;
    let report = PerformanceReport::compute(
        &portfolio.closed_trades,
        &portfolio.equity_curve,
        portfolio.initial_capital,
        &config.metrics_options(),
    );

    Ok(BacktestResult {
        strategy: *strategy,
        signals,
        report,
        trades: portfolio.closed_trades,
        equity_curve: portfolio.equity_curve,
    })
}

/// Run independent backtests in parallel. Results keep the order of
/// `strategies`; one failing strategy does not affect the others.
pub fn run_batch(
    series: &OhlcvSeries,
    strategies: &[StrategySpec],
    config: &BacktestConfig,
    cancel: &CancelToken,
) -> Vec<Result<BacktestResult, FinbytesError>> {
    strategies
        .par_iter()
        .map(|strategy| run_backtest(series, strategy, config, cancel))
        .collect()
}
