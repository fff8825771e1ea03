//! Strategy specifications and the rules they compile to.
//!
//! A `StrategySpec` is a closed set of strategy kinds, each with its own
//! parameter struct. Every kind compiles to one entry rule and one exit rule
//! over the indicators it declares in `required_indicators`.

use serde::Serialize;
use std::fmt;

use crate::domain::error::FinbytesError;
use crate::domain::indicator::bollinger::{self, mult_to_x100, MAX_STDDEV_MULT};
use crate::domain::indicator::macd;
use crate::domain::indicator::IndicatorType;
use crate::domain::rule::{IndicatorField, Operand, Rule};

const SECTION: &str = "strategy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverage {
    Sma,
    Ema,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaCrossoverParams {
    pub ma: MovingAverage,
    pub fast: usize,
    pub slow: usize,
}

impl Default for MaCrossoverParams {
    fn default() -> Self {
        MaCrossoverParams {
            ma: MovingAverage::Sma,
            fast: 10,
            slow: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Oscillator {
    Rsi { period: usize },
    Stochastic { k_period: usize, d_period: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OscillatorThresholdParams {
    pub oscillator: Oscillator,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for OscillatorThresholdParams {
    fn default() -> Self {
        OscillatorThresholdParams {
            oscillator: Oscillator::Rsi { period: 14 },
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdCrossoverParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdCrossoverParams {
    fn default() -> Self {
        MacdCrossoverParams {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBreakoutParams {
    pub period: usize,
    pub stddev_mult: f64,
}

impl Default for BollingerBreakoutParams {
    fn default() -> Self {
        BollingerBreakoutParams {
            period: bollinger::DEFAULT_PERIOD,
            stddev_mult: bollinger::DEFAULT_STDDEV_MULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    MaCrossover(MaCrossoverParams),
    OscillatorThreshold(OscillatorThresholdParams),
    MacdCrossover(MacdCrossoverParams),
    BollingerBreakout(BollingerBreakoutParams),
}

fn positive(key: &str, value: usize) -> Result<(), FinbytesError> {
    if value < 1 {
        return Err(FinbytesError::invalid(
            SECTION,
            key,
            format!("must be at least 1, got {value}"),
        ));
    }
    Ok(())
}

impl StrategySpec {
    /// The config-file name of this strategy kind.
    pub fn name(&self) -> &'static str {
        match self {
            StrategySpec::MaCrossover(_) => "ma_crossover",
            StrategySpec::OscillatorThreshold(_) => "oscillator_threshold",
            StrategySpec::MacdCrossover(_) => "macd_crossover",
            StrategySpec::BollingerBreakout(_) => "bollinger_breakout",
        }
    }

    pub fn validate(&self) -> Result<(), FinbytesError> {
        match self {
            StrategySpec::MaCrossover(p) => {
                positive("fast", p.fast)?;
                positive("slow", p.slow)?;
                if p.fast >= p.slow {
                    return Err(FinbytesError::invalid(
                        SECTION,
                        "fast",
                        format!("fast ({}) must be less than slow ({})", p.fast, p.slow),
                    ));
                }
            }
            StrategySpec::OscillatorThreshold(p) => {
                match p.oscillator {
                    Oscillator::Rsi { period } => positive("period", period)?,
                    Oscillator::Stochastic { k_period, d_period } => {
                        positive("k_period", k_period)?;
                        positive("d_period", d_period)?;
                    }
                }
                for (key, value) in [("oversold", p.oversold), ("overbought", p.overbought)] {
                    if !(0.0..=100.0).contains(&value) {
                        return Err(FinbytesError::invalid(
                            SECTION,
                            key,
                            format!("threshold must be within [0, 100], got {value}"),
                        ));
                    }
                }
                if p.oversold >= p.overbought {
                    return Err(FinbytesError::invalid(
                        SECTION,
                        "oversold",
                        format!(
                            "oversold ({}) must be below overbought ({})",
                            p.oversold, p.overbought
                        ),
                    ));
                }
            }
            StrategySpec::MacdCrossover(p) => {
                positive("fast", p.fast)?;
                positive("slow", p.slow)?;
                positive("signal", p.signal)?;
                if p.fast >= p.slow {
                    return Err(FinbytesError::invalid(
                        SECTION,
                        "fast",
                        format!("fast ({}) must be less than slow ({})", p.fast, p.slow),
                    ));
                }
            }
            StrategySpec::BollingerBreakout(p) => {
                if p.period < 2 {
                    return Err(FinbytesError::invalid(
                        SECTION,
                        "period",
                        format!("band period must be at least 2, got {}", p.period),
                    ));
                }
                if mult_to_x100(p.stddev_mult).is_none() {
                    return Err(FinbytesError::invalid(
                        SECTION,
                        "stddev_mult",
                        format!(
                            "must be a positive multiple of 0.01 no greater than {}, got {}",
                            MAX_STDDEV_MULT, p.stddev_mult
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match self {
            StrategySpec::MaCrossover(p) => vec![p.fast_ma(), p.slow_ma()],
            StrategySpec::OscillatorThreshold(p) => vec![p.indicator()],
            StrategySpec::MacdCrossover(p) => vec![p.indicator()],
            StrategySpec::BollingerBreakout(p) => vec![p.indicator()],
        }
    }

    pub fn entry_rule(&self) -> Rule {
        match self {
            StrategySpec::MaCrossover(p) => Rule::CrossAbove {
                left: Operand::value_of(p.fast_ma()),
                right: Operand::value_of(p.slow_ma()),
            },
            StrategySpec::OscillatorThreshold(p) => Rule::CrossBelow {
                left: p.operand(),
                right: Operand::Constant(p.oversold),
            },
            StrategySpec::MacdCrossover(p) => Rule::CrossAbove {
                left: Operand::indicator(p.indicator(), IndicatorField::MacdLine),
                right: Operand::indicator(p.indicator(), IndicatorField::MacdSignal),
            },
            StrategySpec::BollingerBreakout(p) => Rule::CrossAbove {
                left: Operand::Close,
                right: Operand::indicator(p.indicator(), IndicatorField::BollingerUpper),
            },
        }
    }

    pub fn exit_rule(&self) -> Rule {
        match self {
            StrategySpec::MaCrossover(p) => Rule::CrossBelow {
                left: Operand::value_of(p.fast_ma()),
                right: Operand::value_of(p.slow_ma()),
            },
            StrategySpec::OscillatorThreshold(p) => Rule::CrossAbove {
                left: p.operand(),
                right: Operand::Constant(p.overbought),
            },
            StrategySpec::MacdCrossover(p) => Rule::CrossBelow {
                left: Operand::indicator(p.indicator(), IndicatorField::MacdLine),
                right: Operand::indicator(p.indicator(), IndicatorField::MacdSignal),
            },
            StrategySpec::BollingerBreakout(p) => Rule::CrossBelow {
                left: Operand::Close,
                right: Operand::indicator(p.indicator(), IndicatorField::BollingerMiddle),
            },
        }
    }
}

impl MaCrossoverParams {
    fn with_period(&self, period: usize) -> IndicatorType {
        match self.ma {
            MovingAverage::Sma => IndicatorType::Sma(period),
            MovingAverage::Ema => IndicatorType::Ema(period),
        }
    }

    pub fn fast_ma(&self) -> IndicatorType {
        self.with_period(self.fast)
    }

    pub fn slow_ma(&self) -> IndicatorType {
        self.with_period(self.slow)
    }
}

impl OscillatorThresholdParams {
    pub fn indicator(&self) -> IndicatorType {
        match self.oscillator {
            Oscillator::Rsi { period } => IndicatorType::Rsi(period),
            Oscillator::Stochastic { k_period, d_period } => {
                IndicatorType::Stochastic { k_period, d_period }
            }
        }
    }

    /// RSI value or stochastic %K.
    fn operand(&self) -> Operand {
        let field = match self.oscillator {
            Oscillator::Rsi { .. } => IndicatorField::Value,
            Oscillator::Stochastic { .. } => IndicatorField::StochasticK,
        };
        Operand::indicator(self.indicator(), field)
    }
}

impl MacdCrossoverParams {
    pub fn indicator(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }
}

impl BollingerBreakoutParams {
    pub fn indicator(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.period,
            stddev_mult_x100: mult_to_x100(self.stddev_mult).unwrap_or(0),
        }
    }
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySpec::MaCrossover(p) => {
                write!(f, "{} x {}", p.fast_ma(), p.slow_ma())
            }
            StrategySpec::OscillatorThreshold(p) => {
                write!(f, "{} {}/{}", p.indicator(), p.oversold, p.overbought)
            }
            StrategySpec::MacdCrossover(p) => write!(f, "{} crossover", p.indicator()),
            StrategySpec::BollingerBreakout(p) => write!(f, "{} breakout", p.indicator()),
        }
    }
}
