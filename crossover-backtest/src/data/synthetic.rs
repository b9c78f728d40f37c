use chrono::{Duration, NaiveDate, Utc};
use common::{BacktestError, Result, SyntheticDataConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::PriceSeries;

/// Prices never fall below this floor
pub const MIN_PRICE: f64 = 1.0;

/// Generate a random-walk price series with drift, dated up to today
pub fn generate_synthetic_series(config: &SyntheticDataConfig) -> Result<PriceSeries> {
    let closes = generate_synthetic_prices(config)?;
    let dates = trailing_dates(closes.len(), Utc::now().date_naive());
    Ok(PriceSeries { dates, closes })
}

/// Generate daily prices, seeded from `config.seed` when present
pub fn generate_synthetic_prices(config: &SyntheticDataConfig) -> Result<Vec<f64>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_prices_with_rng(config, &mut rng)
}

/// Generate daily prices from an explicit RNG
///
/// Each daily return is drawn from N(upward_drift, volatility) and the
/// price is floored at [`MIN_PRICE`]. The first price is `start_price`.
pub fn generate_prices_with_rng<R: Rng + ?Sized>(
    config: &SyntheticDataConfig,
    rng: &mut R,
) -> Result<Vec<f64>> {
    config.validate()?;

    if config.days == 0 {
        return Ok(vec![]);
    }

    let returns = Normal::new(config.upward_drift, config.volatility)
        .map_err(|e| BacktestError::invalid(format!("daily return distribution: {e}")))?;

    let mut prices = Vec::with_capacity(config.days);
    let mut price = config.start_price;
    prices.push(price);

    for _ in 1..config.days {
        let change: f64 = returns.sample(rng);
        price = (price * (1.0 + change)).max(MIN_PRICE);
        prices.push(price);
    }

    Ok(prices)
}

/// Consecutive calendar days ending at `end`
pub fn trailing_dates(n: usize, end: NaiveDate) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| end - Duration::days((n - 1 - i) as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_synthetic_prices() {
        let config = SyntheticDataConfig::default().with_days(250).with_seed(7);
        let prices = generate_synthetic_prices(&config).unwrap();

        assert_eq!(prices.len(), 250);
        assert_eq!(prices[0], 100.0);
        assert!(prices.iter().all(|&p| p >= MIN_PRICE));
    }

    #[test]
    fn test_seeded_paths_repeat() {
        let config = SyntheticDataConfig::default().with_days(60).with_seed(42);

        let a = generate_synthetic_prices(&config).unwrap();
        let b = generate_synthetic_prices(&config).unwrap();
        let c = generate_synthetic_prices(&config.clone().with_seed(43)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_price_floor() {
        let config = SyntheticDataConfig {
            start_price: 1.5,
            days: 200,
            volatility: 0.5,
            upward_drift: -0.2,
            seed: Some(1),
        };
        let prices = generate_synthetic_prices(&config).unwrap();

        assert!(prices.iter().all(|&p| p >= MIN_PRICE));
        assert!(prices.iter().any(|&p| p == MIN_PRICE));
    }

    #[test]
    fn test_zero_volatility_is_pure_drift() {
        let config = SyntheticDataConfig {
            start_price: 100.0,
            days: 3,
            volatility: 0.0,
            upward_drift: 0.01,
            seed: Some(3),
        };
        let prices = generate_synthetic_prices(&config).unwrap();

        assert_eq!(prices, vec![100.0, 100.0 * 1.01, 100.0 * 1.01 * 1.01]);
    }

    #[test]
    fn test_invalid_config() {
        let config = SyntheticDataConfig {
            volatility: -0.1,
            ..Default::default()
        };
        assert!(generate_synthetic_prices(&config).is_err());
    }

    #[test]
    fn test_trailing_dates() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let dates = trailing_dates(3, end);

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end,
            ]
        );
    }
}
