//! Rule evaluation engine.
//!
//! Evaluates rules against OHLCV data and pre-computed indicator values.
//!
//! # Evaluation Semantics
//!
//! - `CROSS_ABOVE`: `left[i-1] - right[i-1] <= 0` and `left[i] - right[i] > 0`
//! - `CROSS_BELOW`: `left[i-1] - right[i-1] >= 0` and `left[i] - right[i] < 0`
//! - The result is `None` (undefined) unless both operands resolve at both
//!   `i-1` and `i`. Index 0 is always undefined.

use std::collections::HashMap;

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule::{IndicatorField, IndicatorRef, Operand, Rule};

pub fn evaluate(
    rule: &Rule,
    ohlcv: &[OhlcvBar],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> Option<bool> {
    let prev_index = bar_index.checked_sub(1)?;
    let (left, right) = rule.operands();

    let diff = |i: usize| -> Option<f64> {
        let l = resolve_operand(left, ohlcv, indicators, i)?;
        let r = resolve_operand(right, ohlcv, indicators, i)?;
        Some(l - r)
    };
    let prev = diff(prev_index)?;
    let curr = diff(bar_index)?;

    Some(match rule {
        Rule::CrossAbove { .. } => prev <= 0.0 && curr > 0.0,
        Rule::CrossBelow { .. } => prev >= 0.0 && curr < 0.0,
    })
}

pub fn resolve_operand(
    operand: &Operand,
    ohlcv: &[OhlcvBar],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> Option<f64> {
    let bar = ohlcv.get(bar_index)?;
    match operand {
        Operand::Open => Some(bar.open),
        Operand::High => Some(bar.high),
        Operand::Low => Some(bar.low),
        Operand::Close => Some(bar.close),
        Operand::Volume => Some(bar.volume),
        Operand::Constant(v) => Some(*v),
        Operand::Indicator(ind_ref) => resolve_indicator(ind_ref, indicators, bar_index),
    }
}

fn resolve_indicator(
    ind_ref: &IndicatorRef,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> Option<f64> {
    let series = indicators.get(&ind_ref.indicator_type)?;
    extract_field(series.get(bar_index)?, ind_ref.field)
}

fn extract_field(value: &IndicatorValue, field: IndicatorField) -> Option<f64> {
    let v = match (value, field) {
        (IndicatorValue::Simple(v), IndicatorField::Value) => *v,
        (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => *line,
        (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => *signal,
        (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => *histogram,
        (IndicatorValue::Stochastic { k, .. }, IndicatorField::StochasticK) => *k,
        (IndicatorValue::Stochastic { d, .. }, IndicatorField::StochasticD) => (*d)?,
        (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => *upper,
        (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => *middle,
        (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => *lower,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
