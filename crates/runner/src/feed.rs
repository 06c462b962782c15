//! Tick sources: in-memory vectors and CSV files
//!
//! CSV layout: `timestamp,bid,ask,volume[,bid_depth,ask_depth]`.
//! `timestamp` is epoch milliseconds or RFC 3339. Depth columns list
//! levels best first as `price@volume|price@volume`.

use chrono::{DateTime, TimeZone, Utc};
use holodeck_core::{DepthLevel, DepthProfile, Tick, Timestamp};
use holodeck_ports::{TickSource, TickSourceError, TickSourceResult};
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Ticks held in memory, replayed front to back
#[derive(Debug, Clone, Default)]
pub struct MemoryTickSource {
    ticks: VecDeque<Tick>,
}

impl MemoryTickSource {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self {
            ticks: ticks.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

impl TickSource for MemoryTickSource {
    fn next_tick(&mut self) -> TickSourceResult<Option<Tick>> {
        Ok(self.ticks.pop_front())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[derive(Debug, Deserialize)]
struct TickRow {
    timestamp: String,
    bid: String,
    ask: String,
    #[serde(default)]
    volume: Option<String>,
    #[serde(default)]
    bid_depth: Option<String>,
    #[serde(default)]
    ask_depth: Option<String>,
}

/// Streams ticks from CSV, one row at a time
pub struct CsvTickReader<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, TickRow>,
    line: u64,
    name: String,
}

impl CsvTickReader<File> {
    pub fn from_path(path: impl AsRef<Path>, has_header: bool) -> TickSourceResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = Self::from_reader(file, has_header);
        reader.name = path.display().to_string();
        debug!("Reading ticks from {}", reader.name);
        Ok(reader)
    }
}

impl<R: Read> CsvTickReader<R> {
    pub fn from_reader(reader: R, has_header: bool) -> Self {
        let rows = csv::ReaderBuilder::new()
            .has_headers(has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self {
            rows,
            line: u64::from(has_header),
            name: "csv".to_string(),
        }
    }

    fn csv_error(&self, err: csv::Error) -> TickSourceError {
        let line = err.position().map(|p| p.line()).unwrap_or(self.line);
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => TickSourceError::Io(io),
            _ => TickSourceError::Parse { line, reason },
        }
    }
}

impl<R: Read> TickSource for CsvTickReader<R> {
    fn next_tick(&mut self) -> TickSourceResult<Option<Tick>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };
        self.line += 1;
        let row = row.map_err(|err| self.csv_error(err))?;
        let line = self.line;

        let tick = parse_row(&row).map_err(|reason| TickSourceError::Parse { line, reason })?;
        if !tick.is_valid() {
            return Err(TickSourceError::InvalidTick {
                line,
                reason: format!(
                    "bid {} ask {} volume {} (need 0 < bid <= ask, volume >= 0)",
                    tick.bid, tick.ask, tick.volume
                ),
            });
        }
        Ok(Some(tick))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn parse_row(row: &TickRow) -> Result<Tick, String> {
    let timestamp = parse_timestamp(&row.timestamp)?;
    let bid = parse_decimal("bid", &row.bid)?;
    let ask = parse_decimal("ask", &row.ask)?;
    let volume = match row.volume.as_deref() {
        Some(raw) if !raw.is_empty() => parse_decimal("volume", raw)?,
        _ => Decimal::ZERO,
    };

    let tick = Tick::new(timestamp, bid, ask, volume);
    let bids = parse_levels("bid_depth", row.bid_depth.as_deref())?;
    let asks = parse_levels("ask_depth", row.ask_depth.as_deref())?;
    if bids.is_empty() && asks.is_empty() {
        Ok(tick)
    } else {
        Ok(tick.with_depth(DepthProfile::new(bids, asks)))
    }
}

/// Epoch milliseconds or RFC 3339
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| format!("timestamp {} out of range", millis));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| format!("timestamp '{}': {}", raw, err))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|err| format!("{} '{}': {}", field, raw, err))
}

fn parse_levels(field: &str, raw: Option<&str>) -> Result<Vec<DepthLevel>, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };
    raw.split('|')
        .map(|level| {
            let (price, volume) = level
                .split_once('@')
                .ok_or_else(|| format!("{} level '{}' is not price@volume", field, level))?;
            Ok(DepthLevel::new(
                parse_decimal(field, price.trim())?,
                parse_decimal(field, volume.trim())?,
            ))
        })
        .collect()
}
