use std::cmp::Ordering;

use common::{BacktestParameters, BacktestResult};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::BacktestEngine;

/// One evaluated (short, long) combination
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub short_period: usize,
    pub long_period: usize,
    pub result: BacktestResult,
}

/// Grid search over moving-average periods
///
/// Every pair runs as its own backtest on the rayon pool. Runs share only
/// the immutable price slice.
pub struct ParameterSweep {
    base: BacktestParameters,
}

impl ParameterSweep {
    /// `base` supplies everything except the two periods
    pub fn new(base: BacktestParameters) -> Self {
        Self { base }
    }

    /// Evaluate every pair with `short < long`, best total return first
    ///
    /// Pairs the engine rejects are logged and left out.
    pub fn run(&self, prices: &[f64], shorts: &[usize], longs: &[usize]) -> Vec<SweepEntry> {
        let pairs: Vec<(usize, usize)> = shorts
            .iter()
            .flat_map(|&s| longs.iter().map(move |&l| (s, l)))
            .filter(|(s, l)| s < l)
            .collect();

        let mut entries: Vec<SweepEntry> = pairs
            .par_iter()
            .filter_map(|&(short_period, long_period)| {
                let params = self.base.clone().with_periods(short_period, long_period);
                match BacktestEngine::new(params).run(prices) {
                    Ok(result) => Some(SweepEntry {
                        short_period,
                        long_period,
                        result,
                    }),
                    Err(e) => {
                        warn!(short_period, long_period, error = %e, "skipping sweep pair");
                        None
                    }
                }
            })
            .collect();

        entries.sort_by(compare_entries);

        info!(
            pairs = pairs.len(),
            evaluated = entries.len(),
            "parameter sweep complete"
        );

        entries
    }
}

fn compare_entries(a: &SweepEntry, b: &SweepEntry) -> Ordering {
    b.result
        .metrics
        .total_return_pct
        .total_cmp(&a.result.metrics.total_return_pct)
        .then(a.short_period.cmp(&b.short_period))
        .then(a.long_period.cmp(&b.long_period))
}
