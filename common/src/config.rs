use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};
use crate::types::MaKind;

/// Synthetic price path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticDataConfig {
    /// First price of the series
    pub start_price: f64,
    /// Number of daily prices to generate
    pub days: usize,
    /// Standard deviation of the daily return
    pub volatility: f64,
    /// Mean of the daily return
    pub upward_drift: f64,
    /// Fixed RNG seed for reproducible paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SyntheticDataConfig {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            days: 100,
            volatility: 0.015,
            upward_drift: 0.0001,
            seed: None,
        }
    }
}

impl SyntheticDataConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.start_price.is_finite() && self.start_price > 0.0) {
            return Err(BacktestError::invalid(format!(
                "start_price must be positive, got {}",
                self.start_price
            )));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(BacktestError::invalid(format!(
                "volatility must be non-negative, got {}",
                self.volatility
            )));
        }
        if !self.upward_drift.is_finite() {
            return Err(BacktestError::invalid("upward_drift must be finite"));
        }
        Ok(())
    }
}

/// Crossover strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParameters {
    // Moving averages
    pub short_period: usize,
    pub long_period: usize,
    pub ma_kind: MaKind,
    /// EMA smoothing factor, multiplier = smoothing / (period + 1)
    pub ema_smoothing: f64,
    // Risk management
    /// Stop distance below entry, in percent (5.0 = 5%)
    pub stop_loss_pct: f64,
    // Backtest settings
    pub initial_capital: f64,
}

impl Default for BacktestParameters {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 30,
            ma_kind: MaKind::Sma,
            ema_smoothing: 2.0,
            stop_loss_pct: 5.0,
            initial_capital: 10000.0,
        }
    }
}

impl BacktestParameters {
    pub fn with_periods(mut self, short_period: usize, long_period: usize) -> Self {
        self.short_period = short_period;
        self.long_period = long_period;
        self
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    pub fn with_stop_loss(mut self, stop_loss_pct: f64) -> Self {
        self.stop_loss_pct = stop_loss_pct;
        self
    }

    pub fn with_ma_kind(mut self, ma_kind: MaKind) -> Self {
        self.ma_kind = ma_kind;
        self
    }

    /// First day on which both moving averages are defined
    pub fn warmup(&self) -> usize {
        self.short_period.max(self.long_period).saturating_sub(1)
    }

    /// Check the parameters against a price series of `n_prices` days
    pub fn validate(&self, n_prices: usize) -> Result<()> {
        if self.short_period == 0 || self.long_period == 0 {
            return Err(BacktestError::invalid(format!(
                "periods must be positive, got short={} long={}",
                self.short_period, self.long_period
            )));
        }
        let longest = self.short_period.max(self.long_period);
        if longest > n_prices {
            return Err(BacktestError::invalid(format!(
                "period {} exceeds price series length {}",
                longest, n_prices
            )));
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(BacktestError::invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.stop_loss_pct.is_finite() && self.stop_loss_pct >= 0.0) {
            return Err(BacktestError::invalid(format!(
                "stop_loss_pct must be non-negative, got {}",
                self.stop_loss_pct
            )));
        }
        if !(self.ema_smoothing.is_finite() && self.ema_smoothing > 0.0) {
            return Err(BacktestError::invalid(format!(
                "ema_smoothing must be positive, got {}",
                self.ema_smoothing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = BacktestParameters::default();
        assert!(params.validate(100).is_ok());
        assert_eq!(params.warmup(), 29);
        assert!(SyntheticDataConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let base = BacktestParameters::default();

        assert!(base.clone().with_periods(0, 20).validate(100).is_err());
        assert!(base.clone().with_periods(5, 0).validate(100).is_err());
        assert!(base.clone().with_periods(5, 120).validate(100).is_err());
        assert!(base.clone().with_capital(0.0).validate(100).is_err());
        assert!(base.clone().with_capital(-1.0).validate(100).is_err());
        assert!(base.with_stop_loss(-1.0).validate(100).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: BacktestParameters =
            serde_json::from_str(r#"{"short_period": 5, "ma_kind": "ema"}"#).unwrap();

        assert_eq!(params.short_period, 5);
        assert_eq!(params.long_period, 30);
        assert_eq!(params.ma_kind, MaKind::Ema);
    }
}
