use common::{PerformanceMetrics, PortfolioSnapshot, Trade};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Reduce a finished run to performance metrics
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate all performance metrics
    ///
    /// `trading_days` is the length of the price series the run covered.
    pub fn calculate(
        history: &[PortfolioSnapshot],
        trades: &[Trade],
        initial_capital: f64,
        final_value: f64,
        trading_days: usize,
    ) -> PerformanceMetrics {
        let total_return = final_value - initial_capital;
        let total_return_pct = (final_value / initial_capital - 1.0) * 100.0;
        let annualized_return_pct =
            Self::annualized_return(initial_capital, final_value, trading_days);
        let max_drawdown_pct = Self::max_drawdown(history);

        let stats = Self::calculate_trade_stats(trades);

        PerformanceMetrics {
            total_return,
            total_return_pct,
            annualized_return_pct,
            max_drawdown_pct,
            total_trades: trades.len() as u32,
            winning_trades: stats.winning,
            losing_trades: trades.len() as u32 - stats.winning,
            win_rate_pct: stats.win_rate,
            avg_win: stats.avg_win,
            avg_loss: stats.avg_loss,
            profit_factor: stats.profit_factor,
        }
    }

    /// Compound the total return over `trading_days / 252` years
    pub fn annualized_return(initial_capital: f64, final_value: f64, trading_days: usize) -> f64 {
        if trading_days == 0 || initial_capital <= 0.0 {
            return 0.0;
        }

        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        ((final_value / initial_capital).powf(1.0 / years) - 1.0) * 100.0
    }

    /// Largest drawdown seen in the history
    pub fn max_drawdown(history: &[PortfolioSnapshot]) -> f64 {
        history
            .iter()
            .map(|s| s.drawdown_pct)
            .fold(0.0, f64::max)
    }

    /// Gross profit over gross loss
    ///
    /// Infinite when there are profits and no losses, zero when both are zero.
    pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
        if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Calculate trade statistics
    fn calculate_trade_stats(trades: &[Trade]) -> TradeStats {
        if trades.is_empty() {
            return TradeStats::default();
        }

        let mut winning = 0u32;
        let mut losing = 0u32;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;

        for trade in trades {
            if trade.profit_loss > 0.0 {
                winning += 1;
                gross_profit += trade.profit_loss;
            } else if trade.profit_loss < 0.0 {
                losing += 1;
                gross_loss += trade.profit_loss;
            }
        }

        let win_rate = winning as f64 / trades.len() as f64 * 100.0;

        let avg_win = if winning > 0 {
            gross_profit / winning as f64
        } else {
            0.0
        };

        // Negative, as the losses themselves
        let avg_loss = if losing > 0 {
            gross_loss / losing as f64
        } else {
            0.0
        };

        TradeStats {
            winning,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor: Self::profit_factor(gross_profit, gross_loss.abs()),
        }
    }
}

#[derive(Debug, Default)]
struct TradeStats {
    winning: u32,
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use common::ExitReason;

    fn make_history(values: &[f64]) -> Vec<PortfolioSnapshot> {
        let mut peak = f64::MIN;
        values
            .iter()
            .enumerate()
            .map(|(day, &v)| {
                peak = peak.max(v);
                PortfolioSnapshot {
                    day,
                    portfolio_value: v,
                    drawdown_pct: (peak - v) / peak * 100.0,
                    in_position: false,
                }
            })
            .collect()
    }

    fn make_trade(profit_loss: f64) -> Trade {
        Trade {
            entry_day: 1,
            entry_price: 100.0,
            exit_day: 4,
            exit_price: 100.0 + profit_loss / 10.0,
            shares: 10,
            profit_loss,
            profit_loss_pct: profit_loss / 10.0,
            duration_days: 3,
            exit_reason: ExitReason::SellSignal,
        }
    }

    #[test]
    fn test_basic_metrics() {
        let history = make_history(&[10000.0, 10100.0, 10200.0, 10300.0, 10400.0]);
        let metrics = MetricsCalculator::calculate(&history, &[], 10000.0, 10400.0, 5);

        assert_eq!(metrics.total_return, 400.0);
        assert_relative_eq!(metrics.total_return_pct, 4.0, epsilon = 1e-9);
        assert_eq!(metrics.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_no_trades_degrades_to_zero() {
        let metrics = MetricsCalculator::calculate(&[], &[], 10000.0, 10000.0, 40);

        assert_eq!(metrics.total_trades, 0);
        assert_eq!(metrics.win_rate_pct, 0.0);
        assert_eq!(metrics.avg_win, 0.0);
        assert_eq!(metrics.avg_loss, 0.0);
        assert_eq!(metrics.profit_factor, 0.0);
        assert_eq!(metrics.annualized_return_pct, 0.0);
    }

    #[test]
    fn test_trade_statistics() {
        let trades = vec![
            make_trade(300.0),
            make_trade(-100.0),
            make_trade(100.0),
            make_trade(-300.0),
        ];
        let metrics = MetricsCalculator::calculate(&[], &trades, 10000.0, 10000.0, 100);

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.winning_trades, 2);
        assert_eq!(metrics.losing_trades, 2);
        assert_eq!(metrics.win_rate_pct, 50.0);
        assert_eq!(metrics.avg_win, 200.0);
        assert_eq!(metrics.avg_loss, -200.0);
        assert_eq!(metrics.profit_factor, 1.0);
    }

    #[test]
    fn test_break_even_counts_as_losing() {
        let trades = vec![make_trade(50.0), make_trade(0.0)];
        let metrics = MetricsCalculator::calculate(&[], &trades, 1000.0, 1050.0, 10);

        assert_eq!(metrics.winning_trades, 1);
        assert_eq!(metrics.losing_trades, 1);
        assert_eq!(metrics.avg_loss, 0.0);
    }

    #[test]
    fn test_profit_factor_sentinels() {
        assert_eq!(MetricsCalculator::profit_factor(500.0, 0.0), f64::INFINITY);
        assert_eq!(MetricsCalculator::profit_factor(0.0, 0.0), 0.0);
        assert_eq!(MetricsCalculator::profit_factor(0.0, 100.0), 0.0);
        assert_eq!(MetricsCalculator::profit_factor(300.0, 100.0), 3.0);

        let metrics = MetricsCalculator::calculate(&[], &[make_trade(10.0)], 100.0, 110.0, 10);
        assert!(metrics.profit_factor.is_infinite() && metrics.profit_factor > 0.0);
    }

    #[test]
    fn test_annualized_return() {
        // A full year of trading compounds to the total return
        assert_relative_eq!(
            MetricsCalculator::annualized_return(10000.0, 11000.0, 252),
            10.0,
            epsilon = 1e-9
        );
        // Half a year doubles in compounding terms
        assert_relative_eq!(
            MetricsCalculator::annualized_return(100.0, 110.0, 126),
            21.0,
            epsilon = 1e-9
        );
        assert_eq!(MetricsCalculator::annualized_return(100.0, 110.0, 0), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let history = make_history(&[10000.0, 11000.0, 9000.0, 9500.0, 10500.0]);

        // Peak was 11000, trough was 9000 = 18.18% drawdown
        assert!((MetricsCalculator::max_drawdown(&history) - 18.18).abs() < 0.1);
    }
}
