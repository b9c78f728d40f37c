use common::Result;

use super::sma::check_period;

/// Smoothing factor used when none is given
pub const DEFAULT_SMOOTHING: f64 = 2.0;

/// Calculate Exponential Moving Average with the default smoothing of 2
pub fn calculate_ema(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    calculate_ema_with_smoothing(prices, period, DEFAULT_SMOOTHING)
}

/// Calculate EMA seeded with the SMA of the first `period` prices
///
/// The first `period - 1` entries are None. From `period` onwards
/// `ema[i] = (prices[i] - ema[i - 1]) * multiplier + ema[i - 1]`
/// with `multiplier = smoothing / (period + 1)`.
pub fn calculate_ema_with_smoothing(
    prices: &[f64],
    period: usize,
    smoothing: f64,
) -> Result<Vec<Option<f64>>> {
    check_period(prices, period)?;

    let n = prices.len();
    let mut ema = vec![None; n];
    let multiplier = smoothing / (period as f64 + 1.0);

    // Use SMA as initial seed
    let mut prev = prices[..period].iter().sum::<f64>() / period as f64;
    ema[period - 1] = Some(prev);

    for i in period..n {
        prev = (prices[i] - prev) * multiplier + prev;
        ema[i] = Some(prev);
    }

    Ok(ema)
}
