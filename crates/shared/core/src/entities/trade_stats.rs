use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::Money;

/// Win/loss bookkeeping over closing and reducing fills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total: u64,
    pub winning: u64,
    pub losing: u64,
    pub breakeven: u64,
    pub consecutive_wins: u64,
    pub consecutive_losses: u64,
    pub max_consecutive_wins: u64,
    pub max_consecutive_losses: u64,
    pub gross_profit: Money,
    /// Sum of losing P&L, stored as a positive amount
    pub gross_loss: Money,
}

impl TradeStats {
    /// Classify one reducing fill by its realized P&L
    pub fn record(&mut self, realized_pnl: Money) {
        self.total += 1;
        if realized_pnl > Decimal::ZERO {
            self.winning += 1;
            self.gross_profit += realized_pnl;
            self.consecutive_wins += 1;
            self.consecutive_losses = 0;
            self.max_consecutive_wins = self.max_consecutive_wins.max(self.consecutive_wins);
        } else if realized_pnl < Decimal::ZERO {
            self.losing += 1;
            self.gross_loss += realized_pnl.abs();
            self.consecutive_losses += 1;
            self.consecutive_wins = 0;
            self.max_consecutive_losses = self.max_consecutive_losses.max(self.consecutive_losses);
        } else {
            self.breakeven += 1;
        }
    }

    /// Winning share of closed trades, in percent
    pub fn win_rate(&self) -> Decimal {
        if self.total == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.winning) / Decimal::from(self.total) * Decimal::ONE_HUNDRED
    }

    /// Gross profit over gross loss; `None` when nothing was lost
    pub fn profit_factor(&self) -> Option<Decimal> {
        if self.gross_loss.is_zero() {
            None
        } else {
            Some(self.gross_profit / self.gross_loss)
        }
    }
}
