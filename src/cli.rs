//! CLI definition and dispatch.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fixed_rule_analyzer::FixedRuleAnalyzer;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{run_batch, BacktestConfig, BacktestResult};
use crate::domain::cancel::CancelToken;
use crate::domain::config_validation::{
    parse_analyze_settings, parse_backtest_config, parse_data_settings, parse_report_settings,
    parse_strategy, AnalyzeSettings, DataSettings,
};
use crate::domain::error::FinbytesError;
use crate::domain::indicator::patterns::{detect_patterns, PatternIndices};
use crate::domain::indicator::pivots::{self, SupportResistance};
use crate::domain::indicator::{IndicatorType, IndicatorValue};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::metrics::BarInterval;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::signal::Signal;
use crate::domain::statistics::{series_statistics, SeriesStatistics};
use crate::domain::strategy::StrategySpec;
use crate::ports::analyzer::Analyzer;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "finbytes", about = "Technical indicator and strategy backtester")]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one or more strategies over a symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy files; each needs a [strategy] section. Defaults to the
        /// [strategy] section of --config.
        #[arg(short, long)]
        strategy: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: Vec<PathBuf>,
    },
    /// Indicator snapshot, patterns, support/resistance and statistics
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Also backtest the strategy these keywords select
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn execute(command: Command) -> Result<(), FinbytesError> {
    match command {
        Command::Backtest {
            config,
            strategy,
            output,
            symbol,
            dry_run,
        } => run_backtest(&config, &strategy, output.as_deref(), symbol, dry_run),
        Command::Validate { config, strategy } => run_validate(&config, &strategy),
        Command::Analyze {
            config,
            symbol,
            query,
            output,
        } => run_analyze(&config, symbol, query.as_deref(), output.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FinbytesError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// One strategy per file, or the main config's `[strategy]` when no files
/// are given.
pub fn load_strategies(
    config: &dyn ConfigPort,
    strategy_paths: &[PathBuf],
) -> Result<Vec<StrategySpec>, FinbytesError> {
    if strategy_paths.is_empty() {
        return Ok(vec![parse_strategy(config)?]);
    }
    strategy_paths
        .iter()
        .map(|path| {
            let file = load_config(path)?;
            parse_strategy(&file)
        })
        .collect()
}

fn data_settings(
    config: &dyn ConfigPort,
    symbol_override: Option<String>,
) -> Result<DataSettings, FinbytesError> {
    let mut settings = parse_data_settings(config)?;
    if let Some(symbol) = symbol_override {
        settings.symbol = symbol;
    }
    Ok(settings)
}

fn fetch_series(
    data_port: &dyn DataPort,
    settings: &DataSettings,
) -> Result<OhlcvSeries, FinbytesError> {
    let series = data_port.fetch(
        &settings.symbol,
        settings.interval,
        settings.start_date,
        settings.end_date,
    )?;
    info!(
        symbol = %settings.symbol,
        bars = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        "fetched series"
    );
    Ok(series)
}

fn run_validate(config_path: &Path, strategy_paths: &[PathBuf]) -> Result<(), FinbytesError> {
    let config = load_config(config_path)?;
    let settings = parse_data_settings(&config)?;
    let backtest = parse_backtest_config(&config)?;
    let strategies = load_strategies(&config, strategy_paths)?;
    parse_analyze_settings(&config)?;
    parse_report_settings(&config)?;

    println!("Configuration is valid");
    print_plan(&settings, &backtest, &strategies);
    Ok(())
}

fn print_plan(settings: &DataSettings, backtest: &BacktestConfig, strategies: &[StrategySpec]) {
    let bound = |d: Option<NaiveDate>| d.map_or_else(|| "open".to_string(), |d| d.to_string());
    println!("  data:       {} ({})", settings.path.display(), settings.symbol);
    println!(
        "  window:     {} .. {} @ {}",
        bound(settings.start_date),
        bound(settings.end_date),
        settings.interval
    );
    println!(
        "  capital:    {:.2}, cost {} bps, fills at {}",
        backtest.initial_capital, backtest.transaction_cost_bps, backtest.execution_timing
    );
    for strategy in strategies {
        println!("  strategy:   {} {}", strategy.name(), strategy);
        println!("    entry:    {}", strategy.entry_rule());
        println!("    exit:     {}", strategy.exit_rule());
    }
}

fn run_backtest(
    config_path: &Path,
    strategy_paths: &[PathBuf],
    output_path: Option<&Path>,
    symbol: Option<String>,
    dry_run: bool,
) -> Result<(), FinbytesError> {
    // Every section is validated before any data is read.
    let config = load_config(config_path)?;
    let settings = data_settings(&config, symbol)?;
    let backtest = parse_backtest_config(&config)?;
    let strategies = load_strategies(&config, strategy_paths)?;
    let report_settings = parse_report_settings(&config)?;

    if dry_run {
        print_plan(&settings, &backtest, &strategies);
        println!("Dry run complete: configuration is valid");
        return Ok(());
    }

    let data_port = CsvAdapter::new(settings.path.clone());
    let results = run_backtest_pipeline(
        &data_port,
        &settings,
        &strategies,
        &backtest,
        &CancelToken::new(),
    )?;

    if let Some(path) = output_path {
        let report = JsonReportAdapter::new(report_settings.pretty);
        match results.as_slice() {
            [single] => report.write(&settings.symbol, single, path)?,
            many => report.write_batch(&settings.symbol, many, path)?,
        }
        println!("\nReport written to: {}", path.display());
    }
    Ok(())
}

/// Fetch once, run every strategy in parallel, print a summary per result.
/// Strategies that fail are reported and skipped; the call fails only when
/// none succeeded.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    settings: &DataSettings,
    strategies: &[StrategySpec],
    backtest: &BacktestConfig,
    cancel: &CancelToken,
) -> Result<Vec<BacktestResult>, FinbytesError> {
    let series = fetch_series(data_port, settings)?;

    info!(strategies = strategies.len(), "running backtests");
    let mut succeeded = Vec::with_capacity(strategies.len());
    let mut first_error = None;
    for (strategy, outcome) in strategies
        .iter()
        .zip(run_batch(&series, strategies, backtest, cancel))
    {
        match outcome {
            Ok(result) => {
                print_summary(&settings.symbol, &result);
                succeeded.push(result);
            }
            Err(e) => {
                warn!(strategy = %strategy, "backtest failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if succeeded.is_empty() => Err(e),
        _ => Ok(succeeded),
    }
}

pub fn print_summary(symbol: &str, result: &BacktestResult) {
    let r = &result.report;
    println!("\n=== {} {} ===", symbol, result.strategy);
    println!("Total Return:     {:.2}%", r.total_return_pct);
    println!("Final Equity:     {:.2}", r.final_equity);
    println!("Sharpe Ratio:     {:.2}", r.sharpe_ratio);
    println!("Max Drawdown:     {:.2}%", r.max_drawdown_pct);
    println!(
        "Trades:           {} ({} won, {} lost)",
        r.trade_count, r.winning_trades, r.losing_trades
    );
    println!("Win Rate:         {:.1}%", r.win_rate_pct);
    println!("Avg Trade:        {:.2}%", r.avg_trade_return_pct);
    debug!(
        entries = result.signals.count(Signal::Enter),
        exits = result.signals.count(Signal::Exit),
        "signal counts"
    );
}

/// Indicators reported by `analyze`, latest value only.
pub const SNAPSHOT_INDICATORS: [IndicatorType; 12] = [
    IndicatorType::Sma(20),
    IndicatorType::Sma(50),
    IndicatorType::Ema(20),
    IndicatorType::Wma(20),
    IndicatorType::Rsi(14),
    IndicatorType::Macd {
        fast: 12,
        slow: 26,
        signal: 9,
    },
    IndicatorType::Bollinger {
        period: 20,
        stddev_mult_x100: 200,
    },
    IndicatorType::Stochastic {
        k_period: 14,
        d_period: 3,
    },
    IndicatorType::Atr(14),
    IndicatorType::Stddev(20),
    IndicatorType::VolumeSma(20),
    IndicatorType::Obv,
];

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub interval: BarInterval,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Keyed by indicator name; `null` while the lookback is not yet full.
    pub indicators: BTreeMap<String, Option<IndicatorValue>>,
    pub patterns: PatternIndices,
    pub support_resistance: SupportResistance,
    pub statistics: SeriesStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtest: Option<BacktestResult>,
}

pub fn build_analysis(
    symbol: &str,
    series: &OhlcvSeries,
    interval: BarInterval,
    analyze: &AnalyzeSettings,
) -> Result<AnalysisReport, FinbytesError> {
    let computed = compute_indicators(series, &SNAPSHOT_INDICATORS)?;
    let indicators = computed
        .into_iter()
        .map(|(indicator_type, s)| {
            let latest = s.values.last().and_then(|p| p.value);
            (indicator_type.to_string(), latest)
        })
        .collect();

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        interval,
        bars: series.len(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        indicators,
        patterns: detect_patterns(series).indices(),
        support_resistance: pivots::support_resistance_levels(
            series,
            analyze.pivot_window,
            analyze.min_touches,
        )?,
        statistics: series_statistics(series, interval),
        backtest: None,
    })
}

fn run_analyze(
    config_path: &Path,
    symbol: Option<String>,
    query: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), FinbytesError> {
    let config = load_config(config_path)?;
    let settings = data_settings(&config, symbol)?;
    let backtest = parse_backtest_config(&config)?;
    let analyze = parse_analyze_settings(&config)?;
    let report_settings = parse_report_settings(&config)?;

    let series = fetch_series(&CsvAdapter::new(settings.path.clone()), &settings)?;
    let mut report = build_analysis(&settings.symbol, &series, settings.interval, &analyze)?;

    if let Some(query) = query {
        let analyzer = FixedRuleAnalyzer::new(backtest, CancelToken::new());
        let result = analyzer.analyze(query, &series)?;
        print_summary(&settings.symbol, &result);
        report.backtest = Some(result);
    }

    let json = if report_settings.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| FinbytesError::Io(std::io::Error::other(e)))?;

    match output_path {
        Some(path) => {
            fs::write(path, json)?;
            println!("Analysis written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
