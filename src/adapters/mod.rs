//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod fixed_rule_analyzer;
pub mod json_report_adapter;
