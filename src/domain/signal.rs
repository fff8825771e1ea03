//! Signal generation: strategy rules plus a Flat/Long state machine.
//!
//! Flat + entry true → Enter (becomes Long); Long + exit true → Exit
//! (becomes Flat); anything else, including an undefined rule, is Hold.
//! `states[i]` is the state after bar i.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule::Rule;
use crate::domain::rule_eval::evaluate;
use crate::domain::strategy::StrategySpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Enter,
    Exit,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalSeries {
    pub signals: Vec<Signal>,
    pub states: Vec<PositionState>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.signals.iter().filter(|s| **s == signal).count()
    }
}

/// Validate the strategy, compute its indicators, and derive signals.
pub fn generate_signals(
    spec: &StrategySpec,
    bars: &[OhlcvBar],
) -> Result<SignalSeries, FinbytesError> {
    spec.validate()?;
    let indicators = compute_indicators(bars, &spec.required_indicators())?;
    Ok(signals_from_rules(
        &spec.entry_rule(),
        &spec.exit_rule(),
        bars,
        &indicators,
    ))
}

pub fn signals_from_rules(
    entry: &Rule,
    exit: &Rule,
    bars: &[OhlcvBar],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
) -> SignalSeries {
    let mut signals = Vec::with_capacity(bars.len());
    let mut states = Vec::with_capacity(bars.len());
    let mut state = PositionState::Flat;

    for i in 0..bars.len() {
        let signal = match state {
            PositionState::Flat if evaluate(entry, bars, indicators, i) == Some(true) => {
                state = PositionState::Long;
                Signal::Enter
            }
            PositionState::Long if evaluate(exit, bars, indicators, i) == Some(true) => {
                state = PositionState::Flat;
                Signal::Exit
            }
            _ => Signal::Hold,
        };
        signals.push(signal);
        states.push(state);
    }

    SignalSeries { signals, states }
}
