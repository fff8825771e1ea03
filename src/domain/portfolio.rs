//! Single-asset portfolio state and equity tracking.
//!
//! Equity compounds bar over bar while long: each mark multiplies it by
//! `price / last_mark`. Each fill multiplies it by `(1 - cost)`.

use chrono::NaiveDate;
use serde::Serialize;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub equity: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    last_mark: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            equity: initial_capital,
            position: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            last_mark: 0.0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    /// Open a unit position. Ignored if already long.
    pub fn open(&mut self, index: usize, date: NaiveDate, price: f64, cost: f64) {
        if self.is_long() {
            return;
        }
        self.position = Some(Position::open(index, date, price));
        self.last_mark = price;
        self.equity *= 1.0 - cost;
    }

    /// Revalue the open position at `price`.
    pub fn mark(&mut self, price: f64) {
        if self.is_long() && self.last_mark > 0.0 {
            self.equity *= price / self.last_mark;
            self.last_mark = price;
        }
    }

    /// Close the open position, if any, and record the trade.
    pub fn close(
        &mut self,
        index: usize,
        date: NaiveDate,
        price: f64,
        cost: f64,
        forced: bool,
    ) -> Option<&Trade> {
        self.mark(price);
        let position = self.position.take()?;
        self.equity *= 1.0 - cost;
        self.closed_trades
            .push(position.close(index, date, price, cost, forced));
        self.closed_trades.last()
    }

    pub fn record_equity(&mut self, date: NaiveDate) {
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.equity,
        });
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn new_portfolio() {
        let portfolio = Portfolio::new(10_000.0);
        assert!((portfolio.equity - 10_000.0).abs() < f64::EPSILON);
        assert!(!portfolio.is_long());
        assert!(portfolio.closed_trades.is_empty());
        assert!(portfolio.equity_curve.is_empty());
        assert!((portfolio.final_equity() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mark_compounds_while_long() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.open(0, day(1), 100.0, 0.0);
        portfolio.mark(110.0);
        portfolio.mark(99.0);
        assert!((portfolio.equity - 990.0).abs() < 1e-9);
    }

    #[test]
    fn mark_ignored_while_flat() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.mark(110.0);
        assert!((portfolio.equity - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn round_trip_records_trade() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.open(1, day(2), 100.0, 0.0);
        let trade = portfolio.close(4, day(5), 120.0, 0.0, false).cloned().unwrap();

        assert!((trade.realized_return - 0.2).abs() < 1e-12);
        assert_eq!(trade.duration_bars, 3);
        assert!(!portfolio.is_long());
        assert!((portfolio.equity - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn fills_charge_cost() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.open(0, day(1), 100.0, 0.01);
        assert!((portfolio.equity - 990.0).abs() < 1e-9);
        portfolio.close(1, day(2), 100.0, 0.01, false);
        assert!((portfolio.equity - 980.1).abs() < 1e-9);
    }

    #[test]
    fn close_while_flat_is_none() {
        let mut portfolio = Portfolio::new(1000.0);
        assert!(portfolio.close(0, day(1), 100.0, 0.0, false).is_none());
        assert!(portfolio.closed_trades.is_empty());
    }

    #[test]
    fn double_open_ignored() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.open(0, day(1), 100.0, 0.0);
        portfolio.open(1, day(2), 200.0, 0.0);
        assert_eq!(portfolio.position.as_ref().unwrap().entry_index, 0);
    }

    #[test]
    fn record_equity_appends() {
        let mut portfolio = Portfolio::new(500.0);
        portfolio.record_equity(day(1));
        portfolio.record_equity(day(2));
        assert_eq!(portfolio.equity_curve.len(), 2);
        assert_eq!(portfolio.equity_curve[1].date, day(2));
    }
}
