//! Core domain types and logic. Pure computation: no I/O and no logging.

pub mod error;
pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod rule;
pub mod rule_eval;
pub mod strategy;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod cancel;
pub mod execution;
pub mod metrics;
pub mod statistics;
pub mod backtest;
pub mod config_validation;
