//! Rolling-window metrics over daily closes.

use crate::{DerivedRow, DerivedSeries, PriceSeries, ValidationError};

/// Simple moving average with standard rolling boundaries.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]` once `window`
/// values are available and `None` before that. Each mean is summed directly
/// from its window so no drift accumulates over long series.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(index, _)| {
            if index + 1 < window {
                return None;
            }
            let slice = &values[index + 1 - window..=index];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Append an SMA-of-close column to `series`.
///
/// A window longer than the series yields an all-`None` column.
pub fn derive(series: &PriceSeries, window: usize) -> Result<DerivedSeries, ValidationError> {
    if window == 0 {
        return Err(ValidationError::InvalidWindow);
    }

    let averages = rolling_mean(&series.closes(), window);
    let rows = series
        .bars
        .iter()
        .cloned()
        .zip(averages)
        .map(|(bar, sma)| DerivedRow { bar, sma })
        .collect();

    Ok(DerivedSeries {
        ticker: series.ticker.clone(),
        window,
        rows,
    })
}
