pub mod ema;
pub mod sma;

pub use ema::{calculate_ema, calculate_ema_with_smoothing, DEFAULT_SMOOTHING};
pub use sma::calculate_sma;

use common::{BacktestError, BacktestParameters, MaKind, Result};

/// Source of a moving-average line
///
/// Implementations must return a vector aligned with `prices`, holding
/// None for every day the average is not yet available.
pub trait MovingAverage {
    fn calculate(&self, prices: &[f64], period: usize) -> Result<Vec<Option<f64>>>;
}

impl<F> MovingAverage for F
where
    F: Fn(&[f64], usize) -> Result<Vec<Option<f64>>>,
{
    fn calculate(&self, prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
        self(prices, period)
    }
}

/// The built-in SMA / EMA calculators
#[derive(Debug, Clone, Copy)]
pub struct StandardAverage {
    pub kind: MaKind,
    pub smoothing: f64,
}

impl StandardAverage {
    pub fn from_params(params: &BacktestParameters) -> Self {
        Self {
            kind: params.ma_kind,
            smoothing: params.ema_smoothing,
        }
    }
}

impl MovingAverage for StandardAverage {
    fn calculate(&self, prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
        match self.kind {
            MaKind::Sma => calculate_sma(prices, period),
            MaKind::Ema => calculate_ema_with_smoothing(prices, period, self.smoothing),
        }
    }
}

/// Short and long lines at a specific day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverValues {
    pub short: f64,
    pub long: f64,
}

/// Pre-computed short and long moving averages for all days
#[derive(Debug)]
pub struct IndicatorSeries {
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Calculate both lines from price data
    pub fn calculate<M: MovingAverage + ?Sized>(
        prices: &[f64],
        short_period: usize,
        long_period: usize,
        ma: &M,
    ) -> Result<Self> {
        let short = ma.calculate(prices, short_period)?;
        let long = ma.calculate(prices, long_period)?;

        for (name, line) in [("short", &short), ("long", &long)] {
            if line.len() != prices.len() {
                return Err(BacktestError::invalid(format!(
                    "{} moving average has {} values for {} prices",
                    name,
                    line.len(),
                    prices.len()
                )));
            }
        }

        Ok(Self { short, long })
    }

    /// Both values at `idx`, None while either line is warming up
    pub fn get(&self, idx: usize) -> Option<CrossoverValues> {
        let short = self.short.get(idx).copied().flatten()?;
        let long = self.long.get(idx).copied().flatten()?;
        Some(CrossoverValues { short, long })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_series_alignment() {
        let prices: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let ma = StandardAverage {
            kind: MaKind::Sma,
            smoothing: DEFAULT_SMOOTHING,
        };
        let series = IndicatorSeries::calculate(&prices, 2, 4, &ma).unwrap();

        assert!(series.get(2).is_none());
        assert_eq!(
            series.get(3),
            Some(CrossoverValues {
                short: 3.5,
                long: 2.5
            })
        );
    }

    #[test]
    fn test_closure_as_moving_average() {
        let prices = vec![1.0, 2.0, 3.0];
        let last_price = |p: &[f64], _period: usize| -> Result<Vec<Option<f64>>> {
            Ok(p.iter().map(|&v| Some(v)).collect())
        };
        let series = IndicatorSeries::calculate(&prices, 1, 2, &last_price).unwrap();

        assert_eq!(series.get(0).map(|v| v.long), Some(1.0));
    }

    #[test]
    fn test_misaligned_custom_average_rejected() {
        let prices = vec![1.0, 2.0, 3.0];
        let truncated = |p: &[f64], _period: usize| -> Result<Vec<Option<f64>>> {
            Ok(p[1..].iter().map(|&v| Some(v)).collect())
        };

        assert!(IndicatorSeries::calculate(&prices, 1, 2, &truncated).is_err());
    }
}
