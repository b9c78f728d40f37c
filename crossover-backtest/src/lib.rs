pub mod data;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod portfolio;
pub mod signals;
pub mod sweep;

pub use data::{generate_synthetic_prices, generate_synthetic_series, load_file, PriceSeries};
pub use engine::{run_backtest, BacktestEngine};
pub use indicators::{calculate_ema, calculate_sma, MovingAverage, StandardAverage};
pub use metrics::MetricsCalculator;
pub use portfolio::Portfolio;
pub use signals::SignalGenerator;
pub use sweep::{ParameterSweep, SweepEntry};

// Re-export common types
pub use common::{
    BacktestError, BacktestParameters, BacktestResult, ExitReason, MaKind, PerformanceMetrics,
    PortfolioSnapshot, Position, Result, SignalType, SyntheticDataConfig, Trade,
};
