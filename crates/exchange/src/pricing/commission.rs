use holodeck_core::{AssetClass, Instrument, Money, Price, Quantity};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// Fee formula names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionKind {
    PerMillion,
    PerShare,
    PerLot,
    Percentage,
}

impl fmt::Display for CommissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommissionKind::PerMillion => "per_million",
            CommissionKind::PerShare => "per_share",
            CommissionKind::PerLot => "per_lot",
            CommissionKind::Percentage => "percentage",
        };
        f.write_str(s)
    }
}

/// Fee formula with its rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rate", rename_all = "snake_case")]
pub enum CommissionModel {
    /// Dollars per million of notional
    PerMillion(Decimal),
    /// Dollars per share (lots x contract size)
    PerShare(Decimal),
    /// Dollars per lot
    PerLot(Decimal),
    /// Fraction of notional (0.002 = 0.2 %)
    Percentage(Decimal),
}

impl CommissionModel {
    /// Default schedule of an asset class
    ///
    /// | class | formula |
    /// |---|---|
    /// | FOREX | notional / 1e6 x $25 |
    /// | STOCKS | shares x $0.01 |
    /// | COMMODITIES | lots x $5.00 |
    /// | CRYPTO | notional x 0.002 |
    pub fn for_asset_class(asset_class: AssetClass) -> Self {
        match asset_class {
            AssetClass::Forex => CommissionModel::PerMillion(dec!(25)),
            AssetClass::Stocks => CommissionModel::PerShare(dec!(0.01)),
            AssetClass::Commodities => CommissionModel::PerLot(dec!(5.00)),
            AssetClass::Crypto => CommissionModel::Percentage(dec!(0.002)),
        }
    }

    /// Default schedule for an asset-class name
    pub fn for_asset_class_name(name: &str) -> Result<Self> {
        let asset_class: AssetClass = name.parse()?;
        Ok(Self::for_asset_class(asset_class))
    }

    /// Build from a configured kind and value
    ///
    /// `percentage` values are given in percent and stored as a fraction.
    pub fn from_kind(kind: CommissionKind, value: Decimal) -> Self {
        match kind {
            CommissionKind::PerMillion => CommissionModel::PerMillion(value),
            CommissionKind::PerShare => CommissionModel::PerShare(value),
            CommissionKind::PerLot => CommissionModel::PerLot(value),
            CommissionKind::Percentage => CommissionModel::Percentage(value / Decimal::ONE_HUNDRED),
        }
    }

    pub fn kind(&self) -> CommissionKind {
        match self {
            CommissionModel::PerMillion(_) => CommissionKind::PerMillion,
            CommissionModel::PerShare(_) => CommissionKind::PerShare,
            CommissionModel::PerLot(_) => CommissionKind::PerLot,
            CommissionModel::Percentage(_) => CommissionKind::Percentage,
        }
    }

    /// Commission for `size` lots at `price`; never negative
    pub fn compute(&self, price: Price, size: Quantity, contract_size: Decimal) -> Money {
        if size <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let fee = match *self {
            CommissionModel::PerMillion(rate) => {
                price * size * contract_size / dec!(1000000) * rate
            }
            CommissionModel::PerShare(rate) => size * contract_size * rate,
            CommissionModel::PerLot(rate) => size * rate,
            CommissionModel::Percentage(rate) => price * size * contract_size * rate,
        };
        fee.max(Decimal::ZERO)
    }
}

/// Commission calculator bound to one instrument
///
/// Pure: running totals live in `CommissionStats`, kept by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionCalculator {
    model: Option<CommissionModel>,
    asset_class: AssetClass,
    contract_size: Decimal,
}

impl CommissionCalculator {
    /// Asset-class default schedule for `instrument`
    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self {
            model: Some(CommissionModel::for_asset_class(instrument.asset_class)),
            asset_class: instrument.asset_class,
            contract_size: instrument.contract_size,
        }
    }

    /// Charges nothing
    pub fn disabled(instrument: &Instrument) -> Self {
        Self {
            model: None,
            ..Self::for_instrument(instrument)
        }
    }

    pub fn with_model(mut self, model: CommissionModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn model(&self) -> Option<CommissionModel> {
        self.model
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn compute(&self, price: Price, size: Quantity) -> Money {
        self.model
            .map(|model| model.compute(price, size, self.contract_size))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Cumulative commission of one asset class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTotals {
    pub commission: Money,
    pub count: u64,
    pub notional: Money,
    /// Underlying units traded (lots x contract size)
    pub units: Quantity,
}

/// Running commission totals per asset class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionStats {
    by_asset_class: BTreeMap<AssetClass, CommissionTotals>,
}

impl CommissionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        asset_class: AssetClass,
        commission: Money,
        price: Price,
        size: Quantity,
        contract_size: Decimal,
    ) {
        let totals = self.by_asset_class.entry(asset_class).or_default();
        totals.commission += commission;
        totals.count += 1;
        totals.notional += price * size * contract_size;
        totals.units += size * contract_size;
    }

    pub fn get(&self, asset_class: AssetClass) -> Option<&CommissionTotals> {
        self.by_asset_class.get(&asset_class)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetClass, &CommissionTotals)> {
        self.by_asset_class.iter()
    }

    pub fn total(&self) -> Money {
        self.by_asset_class.values().map(|t| t.commission).sum()
    }
}
