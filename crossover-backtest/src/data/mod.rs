pub mod loader;
pub mod synthetic;

pub use loader::{load_csv, load_json};
pub use synthetic::{
    generate_prices_with_rng, generate_synthetic_prices, generate_synthetic_series,
    trailing_dates,
};

use std::path::Path;

use chrono::NaiveDate;
use common::{BacktestError, Result};
use serde::{Deserialize, Serialize};

/// Daily closing prices with the calendar date of each close
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Date label for `day`, if the series carries one
    pub fn date(&self, day: usize) -> Option<NaiveDate> {
        self.dates.get(day).copied()
    }
}

/// Load prices from file, detecting format from extension
pub fn load_file(path: &Path) -> Result<PriceSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(BacktestError::DataLoadError(format!(
            "Unsupported file format: {}",
            ext
        ))),
    }
}
