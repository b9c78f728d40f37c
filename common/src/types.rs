use serde::{Deserialize, Serialize};

use crate::config::BacktestParameters;

/// Moving average flavour used for both the short and the long line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaKind {
    #[default]
    Sma,
    Ema,
}

impl std::str::FromStr for MaKind {
    type Err = crate::BacktestError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sma" => Ok(MaKind::Sma),
            "ema" => Ok(MaKind::Ema),
            other => Err(crate::BacktestError::invalid(format!(
                "unknown moving average type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for MaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaKind::Sma => write!(f, "SMA"),
            MaKind::Ema => write!(f, "EMA"),
        }
    }
}

/// Crossover signal observed on a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    SellSignal,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "Stop Loss"),
            ExitReason::SellSignal => write!(f, "Sell Signal"),
        }
    }
}

/// Holding state of the single long-only position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_day: usize,
        entry_price: f64,
        shares: u64,
        stop_loss_price: f64,
    },
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    /// Market value of the holding at `price`
    pub fn market_value(&self, price: f64) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long { shares, .. } => *shares as f64 * price,
        }
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long {
                shares,
                entry_price,
                ..
            } => (price - entry_price) * *shares as f64,
        }
    }
}

/// Closed round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_day: usize,
    pub entry_price: f64,
    pub exit_day: usize,
    pub exit_price: f64,
    pub shares: u64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub duration_days: usize,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }
}

/// End-of-day portfolio state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub day: usize,
    pub portfolio_value: f64,
    pub drawdown_pct: f64,
    pub in_position: bool,
}

/// Aggregate performance statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    // Returns
    pub total_return: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    // Risk
    pub max_drawdown_pct: f64,
    // Trade statistics
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate_pct: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// `f64::INFINITY` when there are wins but no losses; serialized as `null`.
    pub profit_factor: f64,
}

/// Backtest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub parameters: BacktestParameters,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    /// One snapshot per input day
    pub history: Vec<PortfolioSnapshot>,
    pub initial_capital: f64,
    pub final_value: f64,
}

impl BacktestResult {
    pub fn portfolio_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.portfolio_value).collect()
    }

    pub fn drawdown_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.drawdown_pct).collect()
    }

    /// 1 while holding shares at the end of the day, 0 otherwise
    pub fn position_history(&self) -> Vec<u8> {
        self.history.iter().map(|s| u8::from(s.in_position)).collect()
    }
}
