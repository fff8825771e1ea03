//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for each subcommand
//! - Strategy loading from the main config and from separate files
//! - The backtest pipeline against a mock data port
//! - `validate`, `backtest` and `analyze` end to end with real files on disk

mod common;

use clap::Parser;
use common::*;
use finbytes::adapters::file_config_adapter::FileConfigAdapter;
use finbytes::cli::{self, Cli, Command};
use finbytes::domain::backtest::BacktestConfig;
use finbytes::domain::cancel::CancelToken;
use finbytes::domain::config_validation::{parse_data_settings, DataSettings};
use finbytes::domain::error::FinbytesError;
use finbytes::domain::metrics::BarInterval;
use finbytes::domain::strategy::{MacdCrossoverParams, MaCrossoverParams, StrategySpec};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn main_ini(data_path: &Path) -> String {
    format!(
        r#"
[data]
path = {}
symbol = ACME
interval = 1d
start_date = 2024-01-01
end_date = 2024-12-31

[backtest]
initial_capital = 10000
transaction_cost_bps = 0
execution_timing = close

[strategy]
kind = ma_crossover
ma = sma
fast = 10
slow = 20

[report]
pretty = false
"#,
        data_path.display()
    )
}

/// A data directory holding ACME.csv with the single-crossover series.
fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let bars = bars_from_closes(date(2024, 1, 1), 1, &crossover_closes());
    fs::write(dir.path().join("ACME.csv"), bars_to_csv(&bars)).unwrap();
    dir
}

fn settings() -> DataSettings {
    DataSettings {
        path: PathBuf::from("unused"),
        symbol: "ACME".to_string(),
        interval: BarInterval::Daily,
        start_date: None,
        end_date: None,
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_accepts_many_strategies() {
        let cli = Cli::try_parse_from([
            "finbytes", "backtest", "-c", "main.ini", "-s", "a.ini", "-s", "b.ini", "-o",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                strategy,
                output,
                dry_run,
                ..
            } => {
                assert_eq!(config, PathBuf::from("main.ini"));
                assert_eq!(strategy, vec![PathBuf::from("a.ini"), PathBuf::from("b.ini")]);
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["finbytes", "validate", "-c", "main.ini", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn analyze_takes_query() {
        let cli = Cli::try_parse_from([
            "finbytes", "analyze", "-c", "main.ini", "--symbol", "XYZ", "-q", "rsi strategy",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze { symbol, query, .. } => {
                assert_eq!(symbol.as_deref(), Some("XYZ"));
                assert_eq!(query.as_deref(), Some("rsi strategy"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["finbytes", "backtest"]).is_err());
    }
}

mod strategy_loading {
    use super::*;

    #[test]
    fn falls_back_to_main_config() {
        let config = FileConfigAdapter::from_string(&main_ini(Path::new("data"))).unwrap();
        let strategies = cli::load_strategies(&config, &[]).unwrap();
        assert_eq!(
            strategies,
            vec![StrategySpec::MaCrossover(MaCrossoverParams::default())]
        );
    }

    #[test]
    fn reads_each_strategy_file() {
        let config = FileConfigAdapter::from_string(&main_ini(Path::new("data"))).unwrap();
        let macd = write_temp_file("[strategy]\nkind = macd_crossover\n", ".ini");
        let rsi = write_temp_file(
            "[strategy]\nkind = oscillator_threshold\nperiod = 10\n",
            ".ini",
        );

        let strategies = cli::load_strategies(
            &config,
            &[macd.path().to_path_buf(), rsi.path().to_path_buf()],
        )
        .unwrap();

        assert_eq!(strategies.len(), 2);
        assert_eq!(
            strategies[0],
            StrategySpec::MacdCrossover(MacdCrossoverParams::default())
        );
        assert_eq!(strategies[1].name(), "oscillator_threshold");
    }

    #[test]
    fn invalid_strategy_file_fails() {
        let config = FileConfigAdapter::from_string(&main_ini(Path::new("data"))).unwrap();
        let bad = write_temp_file("[strategy]\nkind = ma_crossover\nfast = 50\n", ".ini");
        let err = cli::load_strategies(&config, &[bad.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, FinbytesError::ConfigInvalid { ref key, .. } if key == "fast"));
    }

    #[test]
    fn data_section_parsed_from_file() {
        let config = FileConfigAdapter::from_string(&main_ini(Path::new("/srv/prices"))).unwrap();
        let settings = parse_data_settings(&config).unwrap();
        assert_eq!(settings.path, PathBuf::from("/srv/prices"));
        assert_eq!(settings.symbol, "ACME");
        assert_eq!(settings.start_date, Some(date(2024, 1, 1)));
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn runs_every_strategy_against_one_fetch() {
        let port = MockDataPort::new().with_bars(
            "ACME",
            bars_from_closes(date(2024, 1, 1), 1, &crossover_closes()),
        );
        let strategies = vec![
            StrategySpec::MaCrossover(MaCrossoverParams::default()),
            StrategySpec::MacdCrossover(MacdCrossoverParams::default()),
        ];

        let results = cli::run_backtest_pipeline(
            &port,
            &settings(),
            &strategies,
            &BacktestConfig::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(port.fetches.get(), 1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].trades.len(), 1);
        assert_eq!(results[1].strategy, strategies[1]);
    }

    #[test]
    fn fetch_failure_aborts() {
        let port = MockDataPort::new().with_error("ACME", "connection refused");
        let err = cli::run_backtest_pipeline(
            &port,
            &settings(),
            &[StrategySpec::MaCrossover(MaCrossoverParams::default())],
            &BacktestConfig::default(),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, FinbytesError::DataSource { .. }));
    }

    #[test]
    fn cancelled_pipeline_reports_cancelled() {
        let port = MockDataPort::new().with_bars(
            "ACME",
            bars_from_closes(date(2024, 1, 1), 1, &crossover_closes()),
        );
        let token = CancelToken::new();
        token.cancel();
        let err = cli::run_backtest_pipeline(
            &port,
            &settings(),
            &[StrategySpec::MaCrossover(MaCrossoverParams::default())],
            &BacktestConfig::default(),
            &token,
        )
        .unwrap_err();
        assert!(matches!(err, FinbytesError::Cancelled));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let data = data_dir();
        let ini = write_temp_file(&main_ini(data.path()), ".ini");
        let result = cli::execute(Command::Validate {
            config: ini.path().to_path_buf(),
            strategy: vec![],
        });
        assert!(result.is_ok());
    }

    #[test]
    fn validate_rejects_bad_timing() {
        let data = data_dir();
        let ini = write_temp_file(
            &main_ini(data.path()).replace("execution_timing = close", "execution_timing = noon"),
            ".ini",
        );
        let err = cli::execute(Command::Validate {
            config: ini.path().to_path_buf(),
            strategy: vec![],
        })
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = cli::execute(Command::Validate {
            config: PathBuf::from("/nonexistent/finbytes.ini"),
            strategy: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, FinbytesError::ConfigParse { .. }));
    }

    #[test]
    fn backtest_writes_flat_report() {
        let data = data_dir();
        let ini = write_temp_file(&main_ini(data.path()), ".ini");
        let out = data.path().join("report.json");

        cli::execute(Command::Backtest {
            config: ini.path().to_path_buf(),
            strategy: vec![],
            output: Some(out.clone()),
            symbol: None,
            dry_run: false,
        })
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["symbol"], "ACME");
        assert_eq!(report["strategy"]["kind"], "ma_crossover");
        assert_eq!(report["trade_count"], 1);
        assert_eq!(report["trades"][0]["forced"], false);
        assert!(report["total_return_pct"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn batch_backtest_writes_array() {
        let data = data_dir();
        let ini = write_temp_file(&main_ini(data.path()), ".ini");
        let ema = write_temp_file(
            "[strategy]\nkind = ma_crossover\nma = ema\nfast = 5\nslow = 15\n",
            ".ini",
        );
        let bands = write_temp_file("[strategy]\nkind = bollinger_breakout\n", ".ini");
        let out = data.path().join("batch.json");

        cli::execute(Command::Backtest {
            config: ini.path().to_path_buf(),
            strategy: vec![ema.path().to_path_buf(), bands.path().to_path_buf()],
            output: Some(out.clone()),
            symbol: None,
            dry_run: false,
        })
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let records = report.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["strategy"]["ma"], "ema");
        assert_eq!(records[1]["strategy"]["kind"], "bollinger_breakout");
    }

    #[test]
    fn dry_run_reads_no_data() {
        let ini = write_temp_file(&main_ini(Path::new("/nonexistent/prices")), ".ini");
        let result = cli::execute(Command::Backtest {
            config: ini.path().to_path_buf(),
            strategy: vec![],
            output: None,
            symbol: None,
            dry_run: true,
        });
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_symbol_is_data_error() {
        let data = data_dir();
        let ini = write_temp_file(&main_ini(data.path()), ".ini");
        let err = cli::execute(Command::Backtest {
            config: ini.path().to_path_buf(),
            strategy: vec![],
            output: None,
            symbol: Some("NOPE".to_string()),
            dry_run: false,
        })
        .unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn analyze_rejects_malformed_pivot_window() {
        let data = data_dir();
        let ini = write_temp_file(
            &format!("{}\n[analyze]\npivot_window = abc\n", main_ini(data.path())),
            ".ini",
        );
        let out = data.path().join("analysis.json");

        let err = cli::execute(Command::Analyze {
            config: ini.path().to_path_buf(),
            symbol: None,
            query: None,
            output: Some(out.clone()),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            FinbytesError::ConfigInvalid { ref section, ref key, .. }
                if section == "analyze" && key == "pivot_window"
        ));
        assert!(!out.exists());
    }

    #[test]
    fn backtest_rejects_malformed_pretty_flag() {
        let data = data_dir();
        let ini = write_temp_file(
            &main_ini(data.path()).replace("pretty = false", "pretty = sometimes"),
            ".ini",
        );
        let err = cli::execute(Command::Backtest {
            config: ini.path().to_path_buf(),
            strategy: vec![],
            output: Some(data.path().join("report.json")),
            symbol: None,
            dry_run: false,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            FinbytesError::ConfigInvalid { ref section, ref key, .. }
                if section == "report" && key == "pretty"
        ));
    }

    #[test]
    fn analyze_writes_snapshot() {
        let data = data_dir();
        let ini = write_temp_file(&main_ini(data.path()), ".ini");
        let out = data.path().join("analysis.json");

        cli::execute(Command::Analyze {
            config: ini.path().to_path_buf(),
            symbol: None,
            query: Some("macd please".to_string()),
            output: Some(out.clone()),
        })
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["symbol"], "ACME");
        assert_eq!(report["bars"], 50);
        assert!(report["indicators"]["SMA(20)"].is_number());
        assert!(report["indicators"]["SMA(50)"].is_number());
        assert!(report["indicators"]["MACD(12,26,9)"].is_object());
        assert!(report["support_resistance"]["support"].is_array());
        assert!(report["patterns"]["doji"].is_array());
        assert!(report["statistics"]["volatility"].is_number());
        assert_eq!(report["backtest"]["strategy"]["kind"], "macd_crossover");
    }
}
