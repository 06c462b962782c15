use holodeck_core::{AssetClass, Instrument};
use std::fmt;

use crate::metrics::SimulationMetrics;
use crate::simulation::SimulationStatus;

/// Plain-text end-of-run summary printed by the CLI
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub currency: String,
    pub status: SimulationStatus,
    pub metrics: SimulationMetrics,
}

impl SimulationReport {
    pub fn new(
        instrument: &Instrument,
        currency: &str,
        status: SimulationStatus,
        metrics: SimulationMetrics,
    ) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            asset_class: instrument.asset_class,
            currency: currency.to_string(),
            status,
            metrics,
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(f, "=== {} ({}) ===", self.symbol, self.asset_class)?;
        writeln!(f, "{:<24}{}", "Status", self.status)?;
        writeln!(f, "{:<24}{}", "Ticks processed", m.ticks_processed)?;
        writeln!(f, "{:<24}{:.1}s", "Simulated span", m.simulated_span_ms as f64 / 1000.0)?;
        writeln!(f, "{:<24}{:.1}s", "Session duration", m.session_duration_ms as f64 / 1000.0)?;
        writeln!(f)?;
        writeln!(f, "{:<24}{}", "Orders submitted", m.orders_submitted)?;
        writeln!(f, "{:<24}{}", "Trades executed", m.trades)?;
        writeln!(f, "{:<24}{}", "Rejections", m.rejections)?;
        writeln!(
            f,
            "{:<24}{} ({} won, {} lost, {} even)",
            "Closed trades", m.closed_trades, m.winning_trades, m.losing_trades, m.breakeven_trades
        )?;
        writeln!(f, "{:<24}{}%", "Win rate", m.win_rate.round_dp(2))?;
        match m.profit_factor {
            Some(pf) => writeln!(f, "{:<24}{}", "Profit factor", pf.round_dp(2))?,
            None => writeln!(f, "{:<24}n/a", "Profit factor")?,
        }
        writeln!(
            f,
            "{:<24}{} / {}",
            "Max streak (win/loss)", m.max_consecutive_wins, m.max_consecutive_losses
        )?;
        writeln!(f)?;
        writeln!(f, "{:<24}{} {}", "Final balance", m.final_balance.round_dp(2), self.currency)?;
        writeln!(f, "{:<24}{} {}", "Final equity", m.final_equity.round_dp(2), self.currency)?;
        writeln!(f, "{:<24}{}%", "Return", m.return_percent.round_dp(2))?;
        writeln!(f, "{:<24}{}%", "Max drawdown", m.max_drawdown_percent.round_dp(2))?;
        writeln!(f, "{:<24}{} {}", "Commission", m.total_commission.round_dp(2), self.currency)?;
        writeln!(f, "{:<24}{} {}", "Slippage cost", m.slippage_cost.round_dp(2), self.currency)?;
        for (class, totals) in &m.commission_by_asset_class {
            writeln!(
                f,
                "  {:<22}{} over {} fills",
                class,
                totals.commission.round_dp(2),
                totals.count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_lists_headline_figures() {
        let metrics = SimulationMetrics {
            ticks_processed: 2,
            final_balance: dec!(10094.4975),
            ..SimulationMetrics::default()
        };
        let report = SimulationReport::new(
            &Instrument::forex("EUR/USD"),
            "USD",
            SimulationStatus::Stopped,
            metrics,
        );
        let text = report.to_string();
        assert!(text.starts_with("=== EUR/USD (FOREX) ==="));
        assert!(text.contains("STOPPED"));
        assert!(text.contains("10094.50 USD"));
        assert!(text.contains("n/a"));
    }
}
