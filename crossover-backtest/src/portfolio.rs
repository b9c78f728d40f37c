use common::{ExitReason, PortfolioSnapshot, Position, Trade};

/// Cash, the single long position and the running peak of one backtest run
#[derive(Debug)]
pub struct Portfolio {
    cash: f64,
    position: Position,
    peak_value: f64,
    trades: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position: Position::Flat,
            peak_value: initial_capital,
            trades: Vec::new(),
        }
    }

    /// Get current equity (cash + position value at `price`)
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }

    /// Get available cash
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Check if there's an open position
    pub fn has_position(&self) -> bool {
        self.position.is_long()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Get all closed trades
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// Value the portfolio at `price`, raise the peak and record the day
    pub fn mark(&mut self, day: usize, price: f64) -> PortfolioSnapshot {
        let portfolio_value = self.equity(price);
        if portfolio_value > self.peak_value {
            self.peak_value = portfolio_value;
        }

        let drawdown_pct = if self.peak_value > 0.0 {
            (self.peak_value - portfolio_value) / self.peak_value * 100.0
        } else {
            0.0
        };

        PortfolioSnapshot {
            day,
            portfolio_value,
            drawdown_pct,
            in_position: self.has_position(),
        }
    }

    /// Whole shares affordable with all available cash
    pub fn calculate_position_size(&self, price: f64) -> u64 {
        (self.cash / price).floor() as u64
    }

    /// Buy as many shares as cash allows
    ///
    /// Returns the share count, or None when already long or when not even
    /// one share is affordable.
    pub fn open_position(&mut self, day: usize, price: f64, stop_loss_pct: f64) -> Option<u64> {
        if self.has_position() {
            return None;
        }

        let shares = self.calculate_position_size(price);
        if shares == 0 {
            return None;
        }

        self.cash -= shares as f64 * price;
        self.position = Position::Long {
            entry_day: day,
            entry_price: price,
            shares,
            stop_loss_price: price * (1.0 - stop_loss_pct / 100.0),
        };

        Some(shares)
    }

    /// Sell the whole position and record the round trip
    pub fn close_position(&mut self, day: usize, price: f64, reason: ExitReason) -> Option<Trade> {
        let Position::Long {
            entry_day,
            entry_price,
            shares,
            ..
        } = std::mem::take(&mut self.position)
        else {
            return None;
        };

        self.cash += shares as f64 * price;

        let trade = Trade {
            entry_day,
            entry_price,
            exit_day: day,
            exit_price: price,
            shares,
            profit_loss: (price - entry_price) * shares as f64,
            profit_loss_pct: (price / entry_price - 1.0) * 100.0,
            duration_days: day - entry_day,
            exit_reason: reason,
        };

        self.trades.push(trade.clone());
        Some(trade)
    }

    /// Check if stop loss is triggered
    pub fn check_stop_loss(&self, price: f64) -> bool {
        match self.position {
            Position::Long {
                stop_loss_price, ..
            } => price <= stop_loss_price,
            Position::Flat => false,
        }
    }
}
