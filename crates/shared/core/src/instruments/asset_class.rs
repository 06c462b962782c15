use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while describing an instrument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstrumentError {
    #[error("Unsupported instrument type: {0}")]
    UnsupportedInstrument(String),
}

/// Broad market an instrument trades in
///
/// The asset class selects the commission formula and the preset
/// contract parameters of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetClass {
    Forex,
    Stocks,
    Commodities,
    Crypto,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Forex,
        AssetClass::Stocks,
        AssetClass::Commodities,
        AssetClass::Crypto,
    ];

    /// Canonical upper-case name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Forex => "FOREX",
            AssetClass::Stocks => "STOCKS",
            AssetClass::Commodities => "COMMODITIES",
            AssetClass::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FOREX" | "FX" => Ok(AssetClass::Forex),
            "STOCKS" | "STOCK" | "EQUITY" => Ok(AssetClass::Stocks),
            "COMMODITIES" | "COMMODITY" => Ok(AssetClass::Commodities),
            "CRYPTO" => Ok(AssetClass::Crypto),
            other => Err(InstrumentError::UnsupportedInstrument(other.to_string())),
        }
    }
}
