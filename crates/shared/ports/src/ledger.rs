use holodeck_core::{
    AccountStatus, BalanceSnapshot, Execution, FillOutcome, Money, Position, Tick,
};
use rust_decimal::Decimal;

/// Result of posting one execution to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    pub outcome: FillOutcome,
    pub balance_before: Money,
    pub balance_after: Money,
    pub status_before: AccountStatus,
    pub status_after: AccountStatus,
}

impl LedgerUpdate {
    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
}

/// Narrow capability the executor and risk checks use to read and mutate
/// the account
///
/// The simulation owns the concrete ledger; the executor only ever sees
/// it through this trait.
pub trait Ledger {
    /// Cash balance
    fn balance(&self) -> Money;

    /// Cash plus unrealized P&L
    fn equity(&self) -> Money;

    fn leverage(&self) -> Decimal;

    /// Buying power minus used margin
    fn available_margin(&self) -> Money;

    fn status(&self) -> AccountStatus;

    fn position(&self) -> &Position;

    /// Number of non-flat positions
    fn open_positions(&self) -> usize {
        usize::from(!self.position().is_flat())
    }

    /// Copy of the full account state
    fn snapshot(&self) -> BalanceSnapshot;

    /// Post a fill: position, cash, margin, watermarks, status, audit trail
    fn apply_execution(&mut self, execution: &Execution) -> LedgerUpdate;

    /// Revalue the open position without touching cash
    fn mark_to_market(&mut self, tick: &Tick) -> AccountStatus;
}
