//! Open positions and closed trades.

use chrono::NaiveDate;
use serde::Serialize;

/// Every position is a single unit; returns are tracked as fractions.
pub const UNIT_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub size: f64,
}

impl Position {
    pub fn open(entry_index: usize, entry_date: NaiveDate, entry_price: f64) -> Self {
        Position {
            entry_index,
            entry_date,
            entry_price,
            size: UNIT_SIZE,
        }
    }

    pub fn unrealized_return(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    /// Close at `exit_price`, charging `cost` (a fraction) on each side.
    pub fn close(
        &self,
        exit_index: usize,
        exit_date: NaiveDate,
        exit_price: f64,
        cost: f64,
        forced: bool,
    ) -> Trade {
        Trade {
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_index,
            exit_date,
            exit_price,
            size: self.size,
            realized_return: self.unrealized_return(exit_price) - 2.0 * cost,
            duration_bars: exit_index.saturating_sub(self.entry_index),
            forced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub size: f64,
    /// Net of costs, as a fraction.
    pub realized_return: f64,
    pub duration_bars: usize,
    /// Closed by the end of the series rather than by an exit signal.
    pub forced: bool,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.realized_return > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.realized_return < 0.0
    }
}
