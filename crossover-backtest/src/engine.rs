use std::time::Instant;

use common::{
    BacktestError, BacktestParameters, BacktestResult, ExitReason, MaKind, PortfolioSnapshot,
    Result, SignalType,
};
use tracing::{debug, info};

use crate::indicators::{IndicatorSeries, MovingAverage, StandardAverage};
use crate::metrics::MetricsCalculator;
use crate::portfolio::Portfolio;
use crate::signals::SignalGenerator;

/// Run a crossover backtest with the built-in SMA or EMA
pub fn run_backtest(
    prices: &[f64],
    short_period: usize,
    long_period: usize,
    initial_capital: f64,
    stop_loss_pct: f64,
    ma_kind: MaKind,
) -> Result<BacktestResult> {
    let params = BacktestParameters::default()
        .with_periods(short_period, long_period)
        .with_capital(initial_capital)
        .with_stop_loss(stop_loss_pct)
        .with_ma_kind(ma_kind);

    BacktestEngine::new(params).run(prices)
}

/// Long-only moving-average crossover backtest engine
///
/// Signals are read from the close of day `d` and filled at the price of day
/// `d + 1`. Only one position is held at a time and the run owns all of its
/// state, so one engine can serve any number of independent runs.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    params: BacktestParameters,
}

impl BacktestEngine {
    pub fn new(params: BacktestParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BacktestParameters {
        &self.params
    }

    /// Run backtest on a daily price series
    pub fn run(&self, prices: &[f64]) -> Result<BacktestResult> {
        self.run_with(prices, &StandardAverage::from_params(&self.params))
    }

    /// Run backtest with a caller-supplied moving average
    pub fn run_with<M: MovingAverage + ?Sized>(
        &self,
        prices: &[f64],
        ma: &M,
    ) -> Result<BacktestResult> {
        let start_time = Instant::now();

        validate_prices(prices)?;
        self.params.validate(prices.len())?;

        let indicators = IndicatorSeries::calculate(
            prices,
            self.params.short_period,
            self.params.long_period,
            ma,
        )?;
        let signal_generator = SignalGenerator::new(&indicators);

        let mut portfolio = Portfolio::new(self.params.initial_capital);
        let mut history: Vec<PortfolioSnapshot> = Vec::with_capacity(prices.len());

        let last_day = prices.len() - 1;
        let warmup = self.params.warmup();

        // Nothing can trade before both averages exist
        for (day, &price) in prices.iter().enumerate().take(warmup) {
            history.push(portfolio.mark(day, price));
        }

        // The last day only serves as the fill price for the day before it
        for day in warmup..last_day {
            let mut snapshot = portfolio.mark(day, prices[day]);

            if let Some(signal) = signal_generator.generate(day) {
                self.process_signal(&mut portfolio, signal, day + 1, prices[day + 1]);
            }

            snapshot.in_position = portfolio.has_position();
            history.push(snapshot);
        }

        // Open positions are marked to market, not closed
        let final_snapshot = portfolio.mark(last_day, prices[last_day]);
        let final_value = final_snapshot.portfolio_value;
        history.push(final_snapshot);

        let trades = portfolio.into_trades();
        let metrics = MetricsCalculator::calculate(
            &history,
            &trades,
            self.params.initial_capital,
            final_value,
            prices.len(),
        );

        info!(
            days = prices.len(),
            trades = trades.len(),
            final_value,
            total_return_pct = metrics.total_return_pct,
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "backtest complete"
        );

        Ok(BacktestResult {
            parameters: self.params.clone(),
            metrics,
            trades,
            history,
            initial_capital: self.params.initial_capital,
            final_value,
        })
    }

    /// Act on the signal of the previous close at `fill_price`
    fn process_signal(
        &self,
        portfolio: &mut Portfolio,
        signal: SignalType,
        fill_day: usize,
        fill_price: f64,
    ) {
        if !portfolio.has_position() {
            if signal == SignalType::Buy {
                if let Some(shares) =
                    portfolio.open_position(fill_day, fill_price, self.params.stop_loss_pct)
                {
                    debug!(day = fill_day, price = fill_price, shares, "opened long");
                }
            }
            return;
        }

        // A stop hit labels the exit even when a sell signal fired as well
        let reason = if portfolio.check_stop_loss(fill_price) {
            ExitReason::StopLoss
        } else if signal == SignalType::Sell {
            ExitReason::SellSignal
        } else {
            return;
        };

        if let Some(trade) = portfolio.close_position(fill_day, fill_price, reason) {
            debug!(
                day = fill_day,
                price = fill_price,
                profit_loss = trade.profit_loss,
                reason = %trade.exit_reason,
                "closed long"
            );
        }
    }
}

fn validate_prices(prices: &[f64]) -> Result<()> {
    if let Some((day, price)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        return Err(BacktestError::invalid(format!(
            "price on day {} must be positive, got {}",
            day, price
        )));
    }
    Ok(())
}
