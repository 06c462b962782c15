use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{AssetClass, InstrumentSpec, TradingSession};
use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Static market parameters of the single instrument a simulation trades
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub asset_class: AssetClass,
    /// Decimal places quoted by the venue
    pub decimal_places: u32,
    /// Price distance of one pip (0.0001 for most FX pairs)
    pub pip_value: Price,
    pub tick_size: Price,
    /// Units of the underlying per lot (100 000 for FX)
    pub contract_size: Decimal,
    pub min_lot: Quantity,
    pub min_volume: Quantity,
    pub max_volume: Quantity,
    /// Spread quoted in normal conditions, in price units
    pub typical_spread: Price,
    /// Annualised volatility, informational
    pub volatility: Decimal,
    pub session: TradingSession,
    pub allow_short: bool,
}

impl Instrument {
    /// Preset for the given asset class
    pub fn for_asset_class(symbol: impl Into<Symbol>, asset_class: AssetClass) -> Self {
        match asset_class {
            AssetClass::Forex => Self::forex(symbol),
            AssetClass::Stocks => Self::stock(symbol),
            AssetClass::Commodities => Self::commodity(symbol),
            AssetClass::Crypto => Self::crypto(symbol),
        }
    }

    /// Spot FX pair: 5 decimals, 100 000 units per lot
    pub fn forex(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            asset_class: AssetClass::Forex,
            decimal_places: 5,
            pip_value: dec!(0.0001),
            tick_size: dec!(0.00001),
            contract_size: dec!(100000),
            min_lot: dec!(0.01),
            min_volume: dec!(0.01),
            max_volume: dec!(100),
            typical_spread: dec!(0.0001),
            volatility: dec!(0.08),
            session: TradingSession::around_the_clock(),
            allow_short: true,
        }
    }

    /// Cash equity: sizes are shares, one share per lot
    pub fn stock(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            asset_class: AssetClass::Stocks,
            decimal_places: 2,
            pip_value: dec!(0.01),
            tick_size: dec!(0.01),
            contract_size: Decimal::ONE,
            min_lot: Decimal::ONE,
            min_volume: Decimal::ONE,
            max_volume: dec!(100000),
            typical_spread: dec!(0.02),
            volatility: dec!(0.25),
            session: TradingSession::new(14, 21),
            allow_short: true,
        }
    }

    /// Exchange-traded commodity contract (100 units per lot)
    pub fn commodity(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            asset_class: AssetClass::Commodities,
            decimal_places: 2,
            pip_value: dec!(0.01),
            tick_size: dec!(0.01),
            contract_size: dec!(100),
            min_lot: dec!(0.01),
            min_volume: dec!(0.01),
            max_volume: dec!(50),
            typical_spread: dec!(0.30),
            volatility: dec!(0.18),
            session: TradingSession::new(1, 23),
            allow_short: true,
        }
    }

    /// Crypto spot: sizes are coins, traded around the clock
    pub fn crypto(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            asset_class: AssetClass::Crypto,
            decimal_places: 2,
            pip_value: dec!(0.01),
            tick_size: dec!(0.01),
            contract_size: Decimal::ONE,
            min_lot: dec!(0.0001),
            min_volume: dec!(0.0001),
            max_volume: dec!(1000),
            typical_spread: dec!(1.00),
            volatility: dec!(0.65),
            session: TradingSession::around_the_clock(),
            allow_short: true,
        }
    }

    pub fn with_contract_size(mut self, contract_size: Decimal) -> Self {
        self.contract_size = contract_size;
        self
    }

    pub fn with_volume_limits(mut self, min_volume: Quantity, max_volume: Quantity) -> Self {
        self.min_volume = min_volume;
        self.max_volume = max_volume;
        self
    }

    pub fn with_session(mut self, session: TradingSession) -> Self {
        self.session = session;
        self
    }

    pub fn with_short_selling(mut self, allow_short: bool) -> Self {
        self.allow_short = allow_short;
        self
    }

    /// Instant a DAY order submitted at `ts` expires
    pub fn session_close_after(&self, ts: Timestamp) -> Timestamp {
        self.session.close_after(ts)
    }
}

impl InstrumentSpec for Instrument {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    fn tick_size(&self) -> Price {
        self.tick_size
    }

    fn pip_value(&self) -> Price {
        self.pip_value
    }

    fn contract_size(&self) -> Decimal {
        self.contract_size
    }

    fn min_volume(&self) -> Quantity {
        self.min_volume
    }

    fn max_volume(&self) -> Quantity {
        self.max_volume
    }

    fn is_shortable(&self) -> bool {
        self.allow_short
    }
}
