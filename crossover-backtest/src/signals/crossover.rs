use common::SignalType;

use crate::indicators::{CrossoverValues, IndicatorSeries};

/// Classify the move from `prev` to `curr`
///
/// Buy when the short line goes from at-or-below the long line to strictly
/// above it, Sell on the mirror move, Hold otherwise. Lines that stay equal
/// never cross.
pub fn detect_crossover(prev: CrossoverValues, curr: CrossoverValues) -> SignalType {
    if prev.short <= prev.long && curr.short > curr.long {
        SignalType::Buy
    } else if prev.short >= prev.long && curr.short < curr.long {
        SignalType::Sell
    } else {
        SignalType::Hold
    }
}

/// Crossover signal generator over pre-computed moving averages
pub struct SignalGenerator<'a> {
    indicators: &'a IndicatorSeries,
}

impl<'a> SignalGenerator<'a> {
    pub fn new(indicators: &'a IndicatorSeries) -> Self {
        Self { indicators }
    }

    /// Signal observed at the close of `day`
    ///
    /// None when either line is undefined on `day` or the day before.
    pub fn generate(&self, day: usize) -> Option<SignalType> {
        let prev = self.indicators.get(day.checked_sub(1)?)?;
        let curr = self.indicators.get(day)?;
        Some(detect_crossover(prev, curr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(short: f64, long: f64) -> CrossoverValues {
        CrossoverValues { short, long }
    }

    #[test]
    fn test_buy_on_upward_cross() {
        assert_eq!(detect_crossover(values(9.0, 10.0), values(11.0, 10.0)), SignalType::Buy);
        // touching from below still counts
        assert_eq!(detect_crossover(values(10.0, 10.0), values(10.5, 10.0)), SignalType::Buy);
    }

    #[test]
    fn test_sell_on_downward_cross() {
        assert_eq!(detect_crossover(values(11.0, 10.0), values(9.0, 10.0)), SignalType::Sell);
        assert_eq!(detect_crossover(values(10.0, 10.0), values(9.5, 10.0)), SignalType::Sell);
    }

    #[test]
    fn test_hold_without_cross() {
        assert_eq!(detect_crossover(values(10.0, 10.0), values(10.0, 10.0)), SignalType::Hold);
        assert_eq!(detect_crossover(values(11.0, 10.0), values(12.0, 10.0)), SignalType::Hold);
        assert_eq!(detect_crossover(values(9.0, 10.0), values(8.0, 10.0)), SignalType::Hold);
    }

    #[test]
    fn test_generator_needs_previous_day() {
        let indicators = IndicatorSeries {
            short: vec![None, Some(1.0), Some(3.0)],
            long: vec![None, Some(2.0), Some(2.0)],
        };
        let generator = SignalGenerator::new(&indicators);

        assert_eq!(generator.generate(0), None);
        assert_eq!(generator.generate(1), None);
        assert_eq!(generator.generate(2), Some(SignalType::Buy));
    }
}
