//! JSON configuration for a simulation run
//!
//! Field names are snake_case; unknown fields are rejected by serde with a
//! message naming the field. `validate` checks the value constraints and
//! reports the dotted path of the first offending field.

use holodeck_clock::TimeScale;
use holodeck_core::{
    AssetClass, DrawdownPolicy, Instrument, InstrumentSpec, Quantity, TradingSession,
};
use holodeck_exchange::{
    CommissionKind, CommissionModel, ExecutorConfig, PartialFillPolicy, SlippageModel,
};
use holodeck_ledger::AccountConfig;
use holodeck_ports::RiskConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Longest accepted simulated network latency (one day)
pub const MAX_LATENCY_MS: u64 = 86_400_000;

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub instrument: InstrumentSettings,
    pub account: AccountSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub speed: SpeedSettings,
    pub csv: CsvSettings,
}

/// Traded instrument; optional fields override the asset-class preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentSettings {
    /// FOREX, STOCKS, COMMODITIES or CRYPTO
    #[serde(rename = "type")]
    pub instrument_type: String,
    pub symbol: String,
    #[serde(default)]
    pub contract_size: Option<Decimal>,
    #[serde(default)]
    pub min_volume: Option<Quantity>,
    #[serde(default)]
    pub max_volume: Option<Quantity>,
    #[serde(default)]
    pub open_hour: Option<u32>,
    #[serde(default)]
    pub close_hour: Option<u32>,
    #[serde(default)]
    pub allow_short: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSettings {
    pub initial_balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
    /// Percent, 20.0 = 20 %
    #[serde(default = "default_max_drawdown_percent")]
    pub max_drawdown_percent: Decimal,
    /// Lots; zero derives the limit from the balance
    #[serde(default)]
    pub max_position_size: Quantity,
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: usize,
    #[serde(default)]
    pub drawdown_policy: DrawdownPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippageKind {
    #[default]
    Fixed,
    DepthBased,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFillMode {
    #[default]
    None,
    DepthBased,
    VolumeAdjusted,
}

/// Execution friction switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionSettings {
    #[serde(default)]
    pub commission: bool,
    /// Absent: the asset-class default schedule
    #[serde(default)]
    pub commission_type: Option<CommissionKind>,
    /// Units follow `commission_type`; percentage is in percent
    #[serde(default)]
    pub commission_value: Option<Decimal>,
    #[serde(default)]
    pub slippage: bool,
    #[serde(default)]
    pub slippage_model: SlippageKind,
    #[serde(default = "default_fixed_slippage_pips")]
    pub fixed_slippage_pips: Decimal,
    #[serde(default)]
    pub latency: bool,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub partial_fills: bool,
    #[serde(default)]
    pub partial_fill_mode: PartialFillMode,
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    #[serde(default = "default_volume_fraction")]
    pub volume_fraction: Decimal,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            commission: false,
            commission_type: None,
            commission_value: None,
            slippage: false,
            slippage_model: SlippageKind::default(),
            fixed_slippage_pips: default_fixed_slippage_pips(),
            latency: false,
            latency_ms: 0,
            partial_fills: false,
            partial_fill_mode: PartialFillMode::default(),
            depth_levels: default_depth_levels(),
            volume_fraction: default_volume_fraction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedSettings {
    /// 1.0 is real time; values at or above the unthrottled threshold run flat out
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvSettings {
    pub filepath: PathBuf,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}

fn default_max_drawdown_percent() -> Decimal {
    dec!(20)
}

fn default_max_open_positions() -> usize {
    1
}

fn default_fixed_slippage_pips() -> Decimal {
    dec!(0.5)
}

fn default_depth_levels() -> usize {
    5
}

fn default_volume_fraction() -> Decimal {
    dec!(0.1)
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_has_header() -> bool {
    true
}

impl SimulationConfig {
    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.asset_class()?;

        let instrument = &self.instrument;
        if instrument.symbol.trim().is_empty() {
            return Err(ConfigError::invalid("instrument.symbol", "must not be empty"));
        }
        if let Some(contract_size) = instrument.contract_size {
            if contract_size <= Decimal::ZERO {
                return Err(ConfigError::invalid("instrument.contract_size", "must be > 0"));
            }
        }
        if let Some(min_volume) = instrument.min_volume {
            if min_volume <= Decimal::ZERO {
                return Err(ConfigError::invalid("instrument.min_volume", "must be > 0"));
            }
        }
        for (field, hour) in [
            ("instrument.open_hour", instrument.open_hour),
            ("instrument.close_hour", instrument.close_hour),
        ] {
            if hour.is_some_and(|hour| hour > 24) {
                return Err(ConfigError::invalid(field, "must be within 0..=24"));
            }
        }

        let account = &self.account;
        if account.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::invalid("account.initial_balance", "must be > 0"));
        }
        if account.currency.len() != 3 || !account.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::invalid(
                "account.currency",
                format!("'{}' is not a three-letter code", account.currency),
            ));
        }
        if account.leverage < Decimal::ONE {
            return Err(ConfigError::invalid("account.leverage", "must be >= 1"));
        }
        if account.max_drawdown_percent <= Decimal::ZERO {
            return Err(ConfigError::invalid("account.max_drawdown_percent", "must be > 0"));
        }
        if account.max_position_size < Decimal::ZERO {
            return Err(ConfigError::invalid("account.max_position_size", "must be >= 0"));
        }
        if account.max_open_positions == 0 {
            return Err(ConfigError::invalid("account.max_open_positions", "must be >= 1"));
        }

        let execution = &self.execution;
        if execution.commission_value.is_some_and(|value| value < Decimal::ZERO) {
            return Err(ConfigError::invalid("execution.commission_value", "must be >= 0"));
        }
        if execution.fixed_slippage_pips < Decimal::ZERO {
            return Err(ConfigError::invalid("execution.fixed_slippage_pips", "must be >= 0"));
        }
        if execution.depth_levels == 0 {
            return Err(ConfigError::invalid("execution.depth_levels", "must be >= 1"));
        }
        if execution.volume_fraction <= Decimal::ZERO || execution.volume_fraction > Decimal::ONE {
            return Err(ConfigError::invalid(
                "execution.volume_fraction",
                "must be within (0, 1]",
            ));
        }

        if execution.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::invalid(
                "execution.latency_ms",
                format!("must be <= {}", MAX_LATENCY_MS),
            ));
        }

        let multiplier = self.speed.multiplier;
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(ConfigError::invalid("speed.multiplier", "must be > 0"));
        }

        if self.csv.filepath.as_os_str().is_empty() {
            return Err(ConfigError::invalid("csv.filepath", "must not be empty"));
        }

        self.instrument()?;
        self.commission_model()?;
        Ok(())
    }

    pub fn asset_class(&self) -> Result<AssetClass, ConfigError> {
        self.instrument
            .instrument_type
            .parse()
            .map_err(|_| ConfigError::UnsupportedInstrument(self.instrument.instrument_type.clone()))
    }

    /// Asset-class preset with the configured overrides applied
    pub fn instrument(&self) -> Result<Instrument, ConfigError> {
        let settings = &self.instrument;
        let mut instrument =
            Instrument::for_asset_class(settings.symbol.trim(), self.asset_class()?);

        if let Some(contract_size) = settings.contract_size {
            instrument = instrument.with_contract_size(contract_size);
        }
        if settings.min_volume.is_some() || settings.max_volume.is_some() {
            let min_volume = settings.min_volume.unwrap_or(instrument.min_volume());
            let max_volume = settings.max_volume.unwrap_or(instrument.max_volume());
            if max_volume < min_volume {
                return Err(ConfigError::invalid(
                    "instrument.max_volume",
                    format!("{} is below min_volume {}", max_volume, min_volume),
                ));
            }
            instrument = instrument.with_volume_limits(min_volume, max_volume);
        }
        if settings.open_hour.is_some() || settings.close_hour.is_some() {
            let session = TradingSession::new(
                settings.open_hour.unwrap_or(instrument.session.open_hour),
                settings.close_hour.unwrap_or(instrument.session.close_hour),
            );
            instrument = instrument.with_session(session);
        }
        if let Some(allow_short) = settings.allow_short {
            instrument = instrument.with_short_selling(allow_short);
        }
        Ok(instrument)
    }

    pub fn account_config(&self) -> AccountConfig {
        AccountConfig {
            initial_balance: self.account.initial_balance,
            currency: self.account.currency.to_ascii_uppercase(),
            leverage: self.account.leverage,
            max_drawdown_percent: self.account.max_drawdown_percent,
            drawdown_policy: self.account.drawdown_policy,
        }
    }

    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig::default()
            .with_max_position_size(self.account.max_position_size)
            .with_max_open_positions(self.account.max_open_positions)
    }

    /// Commission schedule, or `None` with commission switched off
    pub fn commission_model(&self) -> Result<Option<CommissionModel>, ConfigError> {
        let execution = &self.execution;
        if !execution.commission {
            return Ok(None);
        }
        let default = CommissionModel::for_asset_class(self.asset_class()?);
        let model = match (execution.commission_type, execution.commission_value) {
            (None, None) => default,
            (None, Some(value)) => CommissionModel::from_kind(default.kind(), value),
            (Some(kind), Some(value)) => CommissionModel::from_kind(kind, value),
            (Some(kind), None) if kind == default.kind() => default,
            (Some(kind), None) => {
                return Err(ConfigError::invalid(
                    "execution.commission_value",
                    format!("required for {:?} on {}", kind, self.asset_class()?),
                ));
            }
        };
        Ok(Some(model))
    }

    pub fn slippage_model(&self) -> SlippageModel {
        let execution = &self.execution;
        if !execution.slippage {
            return SlippageModel::None;
        }
        match execution.slippage_model {
            SlippageKind::Fixed => SlippageModel::Fixed {
                pips: execution.fixed_slippage_pips,
            },
            SlippageKind::DepthBased => SlippageModel::DepthBased {
                fallback_pips: execution.fixed_slippage_pips,
            },
        }
    }

    pub fn partial_fill_policy(&self) -> PartialFillPolicy {
        let execution = &self.execution;
        if !execution.partial_fills {
            return PartialFillPolicy::None;
        }
        match execution.partial_fill_mode {
            PartialFillMode::None => PartialFillPolicy::None,
            PartialFillMode::DepthBased => PartialFillPolicy::DepthBased {
                levels: execution.depth_levels,
            },
            PartialFillMode::VolumeAdjusted => PartialFillPolicy::VolumeAdjusted {
                fraction: execution.volume_fraction,
            },
        }
    }

    pub fn executor_config(&self) -> Result<ExecutorConfig, ConfigError> {
        Ok(ExecutorConfig {
            commission: self.commission_model()?,
            slippage: self.slippage_model(),
            partial_fill: self.partial_fill_policy(),
            latency_ms: if self.execution.latency {
                self.execution.latency_ms
            } else {
                0
            },
            risk: self.risk_config(),
        })
    }

    pub fn time_scale(&self) -> TimeScale {
        TimeScale::from_multiplier(self.speed.multiplier)
    }
}
