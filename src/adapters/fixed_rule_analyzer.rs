//! Keyword-driven [`Analyzer`]: picks one of the built-in strategies from the
//! words in the query and backtests it with default parameters.

use tracing::{debug, info};

use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::cancel::CancelToken;
use crate::domain::error::FinbytesError;
use crate::domain::indicator::stochastic;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::strategy::{
    BollingerBreakoutParams, MaCrossoverParams, MacdCrossoverParams, MovingAverage, Oscillator,
    OscillatorThresholdParams, StrategySpec,
};
use crate::ports::analyzer::Analyzer;

#[derive(Debug, Clone, Default)]
pub struct FixedRuleAnalyzer {
    config: BacktestConfig,
    cancel: CancelToken,
}

impl FixedRuleAnalyzer {
    pub fn new(config: BacktestConfig, cancel: CancelToken) -> Self {
        Self { config, cancel }
    }

    /// Keywords are whole words matched case-insensitively, first match wins:
    /// `rsi`, `stoch*`, `macd`, `bollinger*`, `ema`, `sma`. Anything else runs
    /// the default SMA crossover. `rsi(N)` sets the RSI period and `sma(N)` /
    /// `ema(N)` the slow average.
    pub fn select_strategy(query: &str) -> StrategySpec {
        let query = query.to_lowercase();
        let words: Vec<&str> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |keyword: &str| words.iter().any(|w| *w == keyword);
        let has_stem = |stem: &str| words.iter().any(|w| w.starts_with(stem));

        if has_word("rsi") {
            let mut params = OscillatorThresholdParams::default();
            if let Some(period) = call_argument(&query, "rsi(") {
                params.oscillator = Oscillator::Rsi { period };
            }
            StrategySpec::OscillatorThreshold(params)
        } else if has_stem("stoch") {
            StrategySpec::OscillatorThreshold(OscillatorThresholdParams {
                oscillator: Oscillator::Stochastic {
                    k_period: stochastic::DEFAULT_K_PERIOD,
                    d_period: stochastic::DEFAULT_D_PERIOD,
                },
                oversold: 20.0,
                overbought: 80.0,
            })
        } else if has_word("macd") {
            StrategySpec::MacdCrossover(MacdCrossoverParams::default())
        } else if has_stem("bollinger") {
            StrategySpec::BollingerBreakout(BollingerBreakoutParams::default())
        } else {
            let mut params = MaCrossoverParams::default();
            if has_word("ema") {
                params.ma = MovingAverage::Ema;
            }
            let prefix = match params.ma {
                MovingAverage::Sma => "sma(",
                MovingAverage::Ema => "ema(",
            };
            if let Some(slow) = call_argument(&query, prefix) {
                params.slow = slow;
            }
            StrategySpec::MaCrossover(params)
        }
    }
}

/// The integer inside `prefix...)`, e.g. 21 for `rsi(21)`. The prefix must
/// start a word.
fn call_argument(query: &str, prefix: &str) -> Option<usize> {
    let (pos, _) = query.match_indices(prefix).find(|(i, _)| {
        query[..*i]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })?;
    let start = pos + prefix.len();
    let len = query[start..].find(')')?;
    query[start..start + len].trim().parse().ok()
}

impl Analyzer for FixedRuleAnalyzer {
    fn analyze(&self, query: &str, series: &OhlcvSeries) -> Result<BacktestResult, FinbytesError> {
        let strategy = Self::select_strategy(query);
        debug!(%query, strategy = %strategy, "selected strategy");
        strategy.validate()?;

        let result = run_backtest(series, &strategy, &self.config, &self.cancel)?;
        info!(
            strategy = %strategy,
            total_return_pct = result.report.total_return_pct,
            trades = result.report.trade_count,
            "analysis complete"
        );
        Ok(result)
    }
}
