//! Configuration validation.
//!
//! Reads the `[data]`, `[backtest]` and `[strategy]` sections, plus the
//! optional `[analyze]` and `[report]` sections, through a [`ConfigPort`]
//! into typed values. Every error names the section and key it came from.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::FinbytesError;
use crate::domain::execution::{ExecutionTiming, DEFAULT_INITIAL_CAPITAL};
use crate::domain::indicator::{pivots, stochastic};
use crate::domain::metrics::BarInterval;
use crate::domain::strategy::{
    BollingerBreakoutParams, MaCrossoverParams, MacdCrossoverParams, MovingAverage, Oscillator,
    OscillatorThresholdParams, StrategySpec,
};
use crate::ports::config_port::ConfigPort;

/// Where and what to load: the `[data]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: PathBuf,
    pub symbol: String,
    pub interval: BarInterval,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Support/resistance detection: the `[analyze]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeSettings {
    pub pivot_window: usize,
    pub min_touches: usize,
}

/// Output formatting: the `[report]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub pretty: bool,
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), FinbytesError> {
    parse_backtest_config(config).map(|_| ())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), FinbytesError> {
    parse_strategy(config).map(|_| ())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), FinbytesError> {
    parse_data_settings(config).map(|_| ())
}

pub fn parse_analyze_settings(
    config: &dyn ConfigPort,
) -> Result<AnalyzeSettings, FinbytesError> {
    let settings = AnalyzeSettings {
        pivot_window: read_count(config, "analyze", "pivot_window")?
            .unwrap_or(pivots::DEFAULT_WINDOW),
        min_touches: read_count(config, "analyze", "min_touches")?
            .unwrap_or(pivots::DEFAULT_MIN_TOUCHES),
    };
    for (key, value) in [
        ("pivot_window", settings.pivot_window),
        ("min_touches", settings.min_touches),
    ] {
        if value == 0 {
            return Err(FinbytesError::invalid("analyze", key, "must be at least 1"));
        }
    }
    Ok(settings)
}

pub fn parse_report_settings(config: &dyn ConfigPort) -> Result<ReportSettings, FinbytesError> {
    Ok(ReportSettings {
        pretty: read_bool(config, "report", "pretty")?.unwrap_or(true),
    })
}

pub fn parse_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, FinbytesError> {
    let path = required(config, "data", "path")?;
    let symbol = required(config, "data", "symbol")?;
    let interval = read_parsed(config, "data", "interval")?.unwrap_or_default();
    let start_date = read_date(config, "data", "start_date")?;
    let end_date = read_date(config, "data", "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(FinbytesError::invalid(
                "data",
                "start_date",
                format!("start_date ({start}) must not be after end_date ({end})"),
            ));
        }
    }

    Ok(DataSettings {
        path: PathBuf::from(path),
        symbol,
        interval,
        start_date,
        end_date,
    })
}

/// The `[backtest]` section, with the bar interval taken from `[data]`.
pub fn parse_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, FinbytesError> {
    let backtest = BacktestConfig {
        initial_capital: read_double(config, "backtest", "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CAPITAL),
        transaction_cost_bps: read_double(config, "backtest", "transaction_cost_bps")?
            .unwrap_or(0.0),
        execution_timing: read_parsed::<ExecutionTiming>(config, "backtest", "execution_timing")?
            .unwrap_or_default(),
        interval: read_parsed(config, "data", "interval")?.unwrap_or_default(),
        exclude_forced: read_bool(config, "backtest", "exclude_forced")?.unwrap_or(false),
    };
    backtest.execution().validate()?;
    Ok(backtest)
}

pub fn parse_strategy(config: &dyn ConfigPort) -> Result<StrategySpec, FinbytesError> {
    let kind = required(config, "strategy", "kind")?;

    let spec = match kind.trim().to_lowercase().as_str() {
        "ma_crossover" => {
            let defaults = MaCrossoverParams::default();
            let ma = match config.get_string("strategy", "ma") {
                None => defaults.ma,
                Some(value) => match value.trim().to_lowercase().as_str() {
                    "sma" => MovingAverage::Sma,
                    "ema" => MovingAverage::Ema,
                    _ => {
                        return Err(FinbytesError::invalid(
                            "strategy",
                            "ma",
                            format!("expected sma or ema, got '{value}'"),
                        ));
                    }
                },
            };
            StrategySpec::MaCrossover(MaCrossoverParams {
                ma,
                fast: read_count(config, "strategy", "fast")?.unwrap_or(defaults.fast),
                slow: read_count(config, "strategy", "slow")?.unwrap_or(defaults.slow),
            })
        }
        "oscillator_threshold" => {
            let defaults = OscillatorThresholdParams::default();
            let name = config
                .get_string("strategy", "oscillator")
                .unwrap_or_else(|| "rsi".to_string());
            let oscillator = match name.trim().to_lowercase().as_str() {
                "rsi" => Oscillator::Rsi {
                    period: read_count(config, "strategy", "period")?.unwrap_or(14),
                },
                "stochastic" | "stoch" => Oscillator::Stochastic {
                    k_period: read_count(config, "strategy", "k_period")?
                        .unwrap_or(stochastic::DEFAULT_K_PERIOD),
                    d_period: read_count(config, "strategy", "d_period")?
                        .unwrap_or(stochastic::DEFAULT_D_PERIOD),
                },
                _ => {
                    return Err(FinbytesError::invalid(
                        "strategy",
                        "oscillator",
                        format!("expected rsi or stochastic, got '{name}'"),
                    ));
                }
            };
            StrategySpec::OscillatorThreshold(OscillatorThresholdParams {
                oscillator,
                oversold: read_double(config, "strategy", "oversold")?
                    .unwrap_or(defaults.oversold),
                overbought: read_double(config, "strategy", "overbought")?
                    .unwrap_or(defaults.overbought),
            })
        }
        "macd_crossover" => {
            let defaults = MacdCrossoverParams::default();
            StrategySpec::MacdCrossover(MacdCrossoverParams {
                fast: read_count(config, "strategy", "fast")?.unwrap_or(defaults.fast),
                slow: read_count(config, "strategy", "slow")?.unwrap_or(defaults.slow),
                signal: read_count(config, "strategy", "signal")?.unwrap_or(defaults.signal),
            })
        }
        "bollinger_breakout" => {
            let defaults = BollingerBreakoutParams::default();
            StrategySpec::BollingerBreakout(BollingerBreakoutParams {
                period: read_count(config, "strategy", "period")?.unwrap_or(defaults.period),
                stddev_mult: read_double(config, "strategy", "stddev_mult")?
                    .unwrap_or(defaults.stddev_mult),
            })
        }
        other => {
            return Err(FinbytesError::invalid(
                "strategy",
                "kind",
                format!("unknown strategy kind '{other}'"),
            ));
        }
    };

    spec.validate()?;
    Ok(spec)
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, FinbytesError> {
    match config.get_string(section, key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(FinbytesError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

// Present-but-malformed values are errors, never defaults.
fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, FinbytesError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FinbytesError::invalid(
            section,
            key,
            format!("expected a number, got '{raw}'"),
        )),
    }
}

fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, FinbytesError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    raw.trim().parse::<usize>().map(Some).map_err(|_| {
        FinbytesError::invalid(
            section,
            key,
            format!("expected a whole number, got '{raw}'"),
        )
    })
}

fn read_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, FinbytesError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        _ => Err(FinbytesError::invalid(
            section,
            key,
            format!("expected true or false, got '{raw}'"),
        )),
    }
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, FinbytesError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            FinbytesError::invalid(
                section,
                key,
                format!("invalid date '{raw}', expected YYYY-MM-DD"),
            )
        })
}

fn read_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, FinbytesError>
where
    T: FromStr<Err = FinbytesError>,
{
    config
        .get_string(section, key)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
}
