//! Crossing rules that strategies compile to.
//!
//! - `Operand`: what can be compared (price fields, constants, indicators)
//! - `IndicatorRef`: reference to an indicator with a specific field
//! - `IndicatorField`: which field of a multi-value indicator to use
//! - `Rule`: an edge-triggered crossing of two operands

use std::fmt;

use crate::domain::indicator::IndicatorType;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Open,
    High,
    Low,
    Close,
    Volume,
    Constant(f64),
    Indicator(IndicatorRef),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRef {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    StochasticK,
    StochasticD,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    CrossAbove { left: Operand, right: Operand },
    CrossBelow { left: Operand, right: Operand },
}

impl Operand {
    pub fn indicator(indicator_type: IndicatorType, field: IndicatorField) -> Self {
        Operand::Indicator(IndicatorRef {
            indicator_type,
            field,
        })
    }

    /// Shorthand for the scalar output of a single-valued indicator.
    pub fn value_of(indicator_type: IndicatorType) -> Self {
        Self::indicator(indicator_type, IndicatorField::Value)
    }
}

impl Rule {
    pub fn operands(&self) -> (&Operand, &Operand) {
        match self {
            Rule::CrossAbove { left, right } | Rule::CrossBelow { left, right } => (left, right),
        }
    }

    /// Indicators this rule reads, in operand order.
    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        let (left, right) = self.operands();
        [left, right]
            .into_iter()
            .filter_map(|op| match op {
                Operand::Indicator(r) => Some(r.indicator_type),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Open => write!(f, "open"),
            Operand::High => write!(f, "high"),
            Operand::Low => write!(f, "low"),
            Operand::Close => write!(f, "close"),
            Operand::Volume => write!(f, "volume"),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Indicator(r) => match r.field {
                IndicatorField::Value => write!(f, "{}", r.indicator_type),
                field => write!(f, "{}.{:?}", r.indicator_type, field),
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::CrossAbove { left, right } => write!(f, "CROSS_ABOVE({}, {})", left, right),
            Rule::CrossBelow { left, right } => write!(f, "CROSS_BELOW({}, {})", left, right),
        }
    }
}
