//! Performance metrics and statistics.
//!
//! All percentages are expressed in percent (10.0 means 10%). Any statistic
//! that would come out NaN or infinite is reported as 0.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::FinbytesError;
use super::portfolio::EquityPoint;
use super::position::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Bar spacing of the input series, used to annualize.
///
/// Bars are dated by day, so nothing finer than daily is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BarInterval {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl BarInterval {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            BarInterval::Daily => TRADING_DAYS_PER_YEAR,
            BarInterval::Weekly => 52.0,
            BarInterval::Monthly => 12.0,
        }
    }
}

impl FromStr for BarInterval {
    type Err = FinbytesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1d" => Ok(BarInterval::Daily),
            "1w" => Ok(BarInterval::Weekly),
            "1mo" => Ok(BarInterval::Monthly),
            other => Err(FinbytesError::invalid(
                "data",
                "interval",
                format!("expected 1d, 1w or 1mo, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BarInterval::Daily => "1d",
            BarInterval::Weekly => "1w",
            BarInterval::Monthly => "1mo",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricsOptions {
    pub interval: BarInterval,
    /// Leave force-closed trades out of the trade statistics.
    pub exclude_forced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trade_count: usize,
    pub avg_trade_return_pct: f64,
    pub avg_trade_duration_bars: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_win_pct: f64,
    /// Mean return of losing trades; ≤ 0.
    pub avg_loss_pct: f64,
    pub largest_win_pct: f64,
    /// Most negative trade return; ≤ 0.
    pub largest_loss_pct: f64,
    pub final_equity: f64,
}

impl PerformanceReport {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        options: &MetricsOptions,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return_pct = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let sharpe_ratio = compute_sharpe(equity_curve, options.interval.periods_per_year());
        let max_drawdown_pct = compute_max_drawdown(equity_curve);

        let counted: Vec<&Trade> = trades
            .iter()
            .filter(|t| !(options.exclude_forced && t.forced))
            .collect();

        let trade_count = counted.len();
        let pct = |t: &&Trade| t.realized_return * 100.0;
        let returns: Vec<f64> = counted.iter().map(pct).collect();
        let wins: Vec<f64> = counted.iter().filter(|t| t.is_win()).map(pct).collect();
        let losses: Vec<f64> = counted.iter().filter(|t| t.is_loss()).map(pct).collect();

        let win_rate_pct = if trade_count > 0 {
            wins.len() as f64 / trade_count as f64 * 100.0
        } else {
            0.0
        };

        let durations: Vec<f64> = counted.iter().map(|t| t.duration_bars as f64).collect();

        PerformanceReport {
            total_return_pct: finite_or_zero(total_return_pct),
            sharpe_ratio: finite_or_zero(sharpe_ratio),
            max_drawdown_pct: finite_or_zero(max_drawdown_pct),
            win_rate_pct: finite_or_zero(win_rate_pct),
            trade_count,
            avg_trade_return_pct: finite_or_zero(mean(&returns)),
            avg_trade_duration_bars: finite_or_zero(mean(&durations)),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            avg_win_pct: finite_or_zero(mean(&wins)),
            avg_loss_pct: finite_or_zero(mean(&losses)),
            largest_win_pct: finite_or_zero(wins.iter().copied().fold(0.0, f64::max)),
            largest_loss_pct: finite_or_zero(losses.iter().copied().fold(0.0, f64::min)),
            final_equity: finite_or_zero(final_equity),
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Bar-over-bar simple returns of the equity curve.
pub fn bar_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// Mean and sample standard deviation (n-1 divisor); `None` below 2 values.
pub fn mean_and_sample_stddev(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, variance.sqrt()))
}

/// mean / sample stddev × √periods_per_year; 0 on fewer than two returns or
/// zero variance.
pub fn annualized_sharpe(returns: &[f64], periods_per_year: f64) -> f64 {
    match mean_and_sample_stddev(returns) {
        Some((mean, stddev)) if stddev > 0.0 => mean / stddev * periods_per_year.sqrt(),
        _ => 0.0,
    }
}

fn compute_sharpe(equity_curve: &[EquityPoint], periods_per_year: f64) -> f64 {
    annualized_sharpe(&bar_returns(equity_curve), periods_per_year)
}

/// Worst peak-to-trough decline in percent, ≤ 0.
fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (point.equity - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    fn make_trade(ret: f64, bars: usize, forced: bool) -> Trade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Trade {
            entry_index: 0,
            entry_date,
            entry_price: 100.0,
            exit_index: bars,
            exit_date: entry_date + chrono::Duration::days(bars as i64),
            exit_price: 100.0 * (1.0 + ret),
            size: 1.0,
            realized_return: ret,
            duration_bars: bars,
            forced,
        }
    }

    fn report(trades: &[Trade], equity: &[f64]) -> PerformanceReport {
        PerformanceReport::compute(
            trades,
            &make_equity_curve(equity),
            equity.first().copied().unwrap_or(10_000.0),
            &MetricsOptions::default(),
        )
    }

    #[test]
    fn interval_periods() {
        assert_eq!(BarInterval::Daily.periods_per_year(), 252.0);
        assert_eq!(BarInterval::Weekly.periods_per_year(), 52.0);
        assert_eq!(BarInterval::Monthly.periods_per_year(), 12.0);
        assert_eq!("1mo".parse::<BarInterval>().unwrap(), BarInterval::Monthly);
        assert!("5m".parse::<BarInterval>().is_err());
        assert!("1h".parse::<BarInterval>().is_err());
        assert_eq!(BarInterval::Weekly.to_string(), "1w");
    }

    #[test]
    fn metrics_empty_run() {
        let r = PerformanceReport::compute(&[], &[], 10_000.0, &MetricsOptions::default());
        assert_eq!(r.total_return_pct, 0.0);
        assert_eq!(r.sharpe_ratio, 0.0);
        assert_eq!(r.max_drawdown_pct, 0.0);
        assert_eq!(r.trade_count, 0);
        assert_eq!(r.final_equity, 10_000.0);
    }

    #[test]
    fn metrics_total_return() {
        let r = report(&[], &[100_000.0, 110_000.0]);
        assert!((r.total_return_pct - 10.0).abs() < 1e-9);
        let r = report(&[], &[100_000.0, 90_000.0]);
        assert!((r.total_return_pct + 10.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_flat_curve() {
        let r = report(&[], &[100.0; 20]);
        assert_eq!(r.total_return_pct, 0.0);
        assert_eq!(r.sharpe_ratio, 0.0);
        assert_eq!(r.max_drawdown_pct, 0.0);
    }

    #[test]
    fn metrics_max_drawdown() {
        let equity = [100.0, 110.0, 90.0, 95.0, 80.0, 100.0];
        let dd = compute_max_drawdown(&make_equity_curve(&equity));
        assert!((dd - (80.0 - 110.0) / 110.0 * 100.0).abs() < 1e-9);
        assert!(dd < 0.0);
    }

    #[test]
    fn metrics_drawdown_zero_when_non_decreasing() {
        let dd = compute_max_drawdown(&make_equity_curve(&[100.0, 100.0, 105.0, 110.0]));
        assert_eq!(dd, 0.0);
    }

    #[test]
    fn metrics_sharpe_uses_sample_stddev() {
        let equity = [100.0, 101.0, 100.0, 102.0];
        let returns = bar_returns(&make_equity_curve(&equity));
        let n = returns.len() as f64;
        let m = returns.iter().sum::<f64>() / n;
        let var = returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (n - 1.0);
        let expected = m / var.sqrt() * 252.0_f64.sqrt();

        let r = report(&[], &equity);
        assert!((r.sharpe_ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn metrics_sharpe_annualizes_by_interval() {
        let equity = make_equity_curve(&[100.0, 101.0, 100.0, 102.0]);
        let daily = PerformanceReport::compute(&[], &equity, 100.0, &MetricsOptions::default());
        let weekly = PerformanceReport::compute(
            &[],
            &equity,
            100.0,
            &MetricsOptions {
                interval: BarInterval::Weekly,
                ..Default::default()
            },
        );
        let ratio = daily.sharpe_ratio / weekly.sharpe_ratio;
        assert!((ratio - (252.0_f64 / 52.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn metrics_sharpe_needs_two_returns() {
        let r = report(&[], &[100.0, 110.0]);
        assert_eq!(r.sharpe_ratio, 0.0);
    }

    #[test]
    fn metrics_trade_stats() {
        let trades = [
            make_trade(0.10, 5, false),
            make_trade(-0.05, 3, false),
            make_trade(0.20, 10, false),
            make_trade(0.0, 2, false),
        ];
        let r = report(&trades, &[100.0, 125.0]);

        assert_eq!(r.trade_count, 4);
        assert_eq!(r.winning_trades, 2);
        assert_eq!(r.losing_trades, 1);
        assert!((r.win_rate_pct - 50.0).abs() < 1e-9);
        assert!((r.avg_trade_return_pct - 6.25).abs() < 1e-9);
        assert!((r.avg_trade_duration_bars - 5.0).abs() < 1e-9);
        assert!((r.avg_win_pct - 15.0).abs() < 1e-9);
        assert!((r.avg_loss_pct + 5.0).abs() < 1e-9);
        assert!((r.largest_win_pct - 20.0).abs() < 1e-9);
        assert!((r.largest_loss_pct + 5.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_exclude_forced() {
        let trades = [make_trade(0.10, 5, false), make_trade(-0.30, 2, true)];
        let equity = make_equity_curve(&[100.0, 77.0]);
        let with_forced =
            PerformanceReport::compute(&trades, &equity, 100.0, &MetricsOptions::default());
        let without = PerformanceReport::compute(
            &trades,
            &equity,
            100.0,
            &MetricsOptions {
                exclude_forced: true,
                ..Default::default()
            },
        );

        assert_eq!(with_forced.trade_count, 2);
        assert_eq!(without.trade_count, 1);
        assert!((without.win_rate_pct - 100.0).abs() < 1e-9);
        assert_eq!(without.total_return_pct, with_forced.total_return_pct);
    }

    #[test]
    fn metrics_no_trades() {
        let r = report(&[], &[100_000.0, 110_000.0]);
        assert_eq!(r.trade_count, 0);
        assert_eq!(r.win_rate_pct, 0.0);
        assert_eq!(r.avg_trade_return_pct, 0.0);
        assert_eq!(r.avg_win_pct, 0.0);
        assert_eq!(r.avg_loss_pct, 0.0);
        assert_eq!(r.largest_win_pct, 0.0);
        assert_eq!(r.largest_loss_pct, 0.0);
        assert_eq!(r.avg_trade_duration_bars, 0.0);
    }

    #[test]
    fn metrics_non_finite_degrade_to_zero() {
        let r = report(&[], &[100.0, f64::INFINITY]);
        assert_eq!(r.total_return_pct, 0.0);
        assert_eq!(r.final_equity, 0.0);
        assert!(r.sharpe_ratio.is_finite());
    }

    #[test]
    fn metrics_idempotent() {
        let trades = [make_trade(0.10, 5, false), make_trade(-0.05, 3, true)];
        let equity = make_equity_curve(&[100.0, 104.0, 99.0, 104.5]);
        let options = MetricsOptions::default();
        let a = PerformanceReport::compute(&trades, &equity, 100.0, &options);
        let b = PerformanceReport::compute(&trades, &equity, 100.0, &options);
        assert_eq!(a, b);
    }
}
