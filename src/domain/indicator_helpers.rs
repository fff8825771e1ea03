//! Batch indicator computation keyed by `IndicatorType`.

use std::collections::HashMap;

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Compute every requested indicator once. Duplicate types are computed a
/// single time; the first invalid parameter set aborts the whole batch.
pub fn compute_indicators(
    bars: &[OhlcvBar],
    types: &[IndicatorType],
) -> Result<HashMap<IndicatorType, IndicatorSeries>, FinbytesError> {
    let mut out = HashMap::with_capacity(types.len());
    for indicator_type in types {
        if out.contains_key(indicator_type) {
            continue;
        }
        let series = indicator_type.compute(bars)?;
        out.insert(*indicator_type, series);
    }
    Ok(out)
}
