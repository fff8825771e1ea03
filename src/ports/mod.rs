//! Port traits for the collaborators around the backtest core.

pub mod analyzer;
pub mod config_port;
pub mod data_port;
pub mod report_port;
