use common::{BacktestError, Result};

/// Calculate Simple Moving Average
///
/// # Arguments
/// * `prices` - Slice of prices
/// * `period` - SMA period, `1..=prices.len()`
///
/// # Returns
/// Vector aligned with `prices`, None for the first `period - 1` entries
pub fn calculate_sma(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    check_period(prices, period)?;

    let mut sma = vec![None; period - 1];
    sma.reserve(prices.len() + 1 - period);

    // Each window is summed from scratch so equal windows give bit-equal averages
    sma.extend(
        prices
            .windows(period)
            .map(|w| Some(w.iter().sum::<f64>() / period as f64)),
    );

    Ok(sma)
}

pub(crate) fn check_period(prices: &[f64], period: usize) -> Result<()> {
    if period == 0 {
        return Err(BacktestError::invalid("moving average period must be at least 1"));
    }
    if period > prices.len() {
        return Err(BacktestError::invalid(format!(
            "moving average period {} exceeds {} prices",
            period,
            prices.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_basic() {
        let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let sma = calculate_sma(&prices, 3).unwrap();

        assert_eq!(sma.len(), prices.len());
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        assert_eq!(sma[2], Some(2.0)); // (1+2+3)/3
        assert_eq!(sma[3], Some(3.0)); // (2+3+4)/3
        assert_eq!(sma[9], Some(9.0)); // (8+9+10)/3
    }

    #[test]
    fn test_sma_warmup_count() {
        let prices: Vec<f64> = (0..25).map(|i| 50.0 + i as f64).collect();

        for period in 1..=prices.len() {
            let sma = calculate_sma(&prices, period).unwrap();
            assert_eq!(sma.len(), prices.len());
            assert_eq!(sma.iter().filter(|v| v.is_none()).count(), period - 1);
            assert_eq!(
                sma.iter().filter(|v| v.is_some()).count(),
                prices.len() - period + 1
            );
        }
    }

    #[test]
    fn test_sma_constant_series() {
        let prices = vec![42.5; 30];
        let sma = calculate_sma(&prices, 7).unwrap();

        assert!(sma.iter().flatten().all(|&v| v == 42.5));
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let prices = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        let sma = calculate_sma(&prices, 1).unwrap();

        assert_eq!(sma, prices.iter().map(|&p| Some(p)).collect::<Vec<_>>());
    }

    #[test]
    fn test_sma_invalid_period() {
        let prices = vec![1.0, 2.0, 3.0];

        assert!(calculate_sma(&prices, 0).is_err());
        assert!(calculate_sma(&prices, 5).is_err());
        assert!(calculate_sma(&prices, 3).is_ok());
    }
}
