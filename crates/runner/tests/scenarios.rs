//! End-to-end replay scenarios
//!
//! Each test builds a simulation from a JSON configuration and an in-memory
//! (or CSV) tick stream, then checks balances, positions, statuses and
//! metrics after driving it:
//! 1. Literal scenarios: flat run, round trip, margin rejection, drawdown
//!    breach, resting partial fill, stream exhaustion
//! 2. Boundary behaviour of limits, drawdown and partial fills
//! 3. Ledger invariants over a scheduled run

use chrono::{DateTime, Duration, TimeZone, Utc};
use holodeck_core::{
    AccountStatus, DepthLevel, DepthProfile, ExecutionStatus, Order, OrderStatus, PositionSide,
    RejectReason, Side, Tick,
};
use holodeck_ports::Ledger;
use holodeck_runner::{
    MemoryTickSource, ScheduledAgent, Simulation, SimulationConfig, SimulationError,
    SimulationStatus,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn at(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap() + Duration::milliseconds(ms)
}

fn tick(ms: i64, bid: Decimal, ask: Decimal) -> Tick {
    Tick::new(at(ms), bid, ask, dec!(10))
}

fn config(balance: u32, leverage: u32, execution: serde_json::Value) -> SimulationConfig {
    let value = serde_json::json!({
        "instrument": { "type": "FOREX", "symbol": "EUR/USD" },
        "account": {
            "initial_balance": balance,
            "currency": "USD",
            "leverage": leverage,
            "max_drawdown_percent": 20.0,
            "max_position_size": 0
        },
        "execution": execution,
        "speed": { "multiplier": 1.0e9 },
        "csv": { "filepath": "unused.csv" }
    });
    SimulationConfig::from_json(&value.to_string()).unwrap()
}

fn frictionless(balance: u32, leverage: u32) -> SimulationConfig {
    config(balance, leverage, serde_json::json!({}))
}

fn simulation(config: &SimulationConfig, ticks: Vec<Tick>) -> Simulation<MemoryTickSource> {
    init_logging();
    let mut sim = Simulation::from_config(config, MemoryTickSource::new(ticks)).unwrap();
    sim.start().unwrap();
    sim
}

#[test]
fn test_flat_run() {
    let mut sim = simulation(
        &frictionless(10_000, 1),
        vec![
            tick(0, dec!(1.1000), dec!(1.1000)),
            tick(1000, dec!(1.1000), dec!(1.1000)),
        ],
    );
    sim.next_tick().unwrap();
    sim.next_tick().unwrap();

    assert_eq!(sim.balance(), dec!(10000));
    let metrics = sim.metrics();
    assert_eq!(metrics.ticks_processed, 2);
    assert_eq!(metrics.trades, 0);
    assert_eq!(metrics.simulated_span_ms, 1000);
}

#[test]
fn test_round_trip_with_commission() {
    let config = config(10_000, 100, serde_json::json!({ "commission": true }));
    let mut sim = simulation(
        &config,
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(1000, dec!(1.1010), dec!(1.1011)),
        ],
    );

    sim.next_tick().unwrap();
    let buy = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    assert_eq!(buy.fill_price, Some(dec!(1.1000)));
    assert_eq!(buy.commission, dec!(2.75));

    sim.next_tick().unwrap();
    let sell = sim.submit_order(Order::market(Side::Sell, dec!(1))).unwrap();
    assert_eq!(sell.fill_price, Some(dec!(1.1010)));
    assert_eq!(sell.commission, dec!(2.7525));

    assert!(sim.position().is_flat());
    assert_eq!(sim.account().realized_pnl(), dec!(100));
    assert_eq!(sim.account().commission_paid(), dec!(5.5025));
    assert_eq!(sim.balance(), dec!(10094.4975));

    let metrics = sim.metrics();
    assert_eq!(metrics.trades, 2);
    assert_eq!(metrics.closed_trades, 1);
    assert_eq!(metrics.winning_trades, 1);
    assert_eq!(metrics.total_commission, dec!(5.5025));
    let forex = &metrics.commission_by_asset_class[&holodeck_core::AssetClass::Forex];
    assert_eq!(forex.count, 2);
}

#[test]
fn test_margin_rejection() {
    let mut sim = simulation(
        &frictionless(1_000, 1),
        vec![tick(0, dec!(1.0999), dec!(1.1000))],
    );
    sim.next_tick().unwrap();

    let exec = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    assert_eq!(exec.status, ExecutionStatus::Rejected);
    assert_eq!(exec.rejection, Some(RejectReason::InsufficientMargin));
    assert_eq!(sim.balance(), dec!(1000));
    assert_eq!(sim.account().used_margin(), Decimal::ZERO);
    assert!(sim.position().is_flat());
    assert_eq!(sim.metrics().rejections, 1);
}

#[test]
fn test_drawdown_breach_blows_account() {
    let mut sim = simulation(
        &frictionless(10_000, 100),
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(1000, dec!(1.0700), dec!(1.0701)),
            tick(2000, dec!(1.0700), dec!(1.0701)),
        ],
    );
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();

    // The breach is observed; this call itself succeeds
    sim.next_tick().unwrap();
    assert_eq!(sim.position().unrealized_pnl, dec!(-3000));
    assert_eq!(sim.account().drawdown(), dec!(0.3));
    assert_eq!(sim.account().status(), AccountStatus::Blown);
    assert_eq!(sim.status(), SimulationStatus::Blown);
    assert!(sim.is_blown());

    let err = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap_err();
    assert!(matches!(err, SimulationError::AccountBlown));
    assert_eq!(err.exit_code(), 3);

    // Metrics stay readable
    assert_eq!(sim.stop().ticks_processed, 2);
    assert_eq!(sim.status(), SimulationStatus::Blown);
}

#[test]
fn test_resting_limit_partial_fill() {
    let config = config(
        10_000,
        100,
        serde_json::json!({
            "partial_fills": true,
            "partial_fill_mode": "depth_based",
            "depth_levels": 1
        }),
    );
    let crossing = tick(1000, dec!(1.0996), dec!(1.0998)).with_depth(DepthProfile::new(
        vec![DepthLevel::new(dec!(1.0996), dec!(6))],
        vec![
            DepthLevel::new(dec!(1.0998), dec!(2)),
            DepthLevel::new(dec!(1.0999), dec!(10)),
        ],
    ));
    let mut sim = simulation(&config, vec![tick(0, dec!(1.1003), dec!(1.1005)), crossing]);

    sim.next_tick().unwrap();
    let ack = sim
        .submit_order(Order::limit(Side::Buy, dec!(5), dec!(1.1000)))
        .unwrap();
    assert_eq!(ack.status, ExecutionStatus::Pending);

    sim.next_tick().unwrap();
    let fills = sim.drain_executions();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].order_id, ack.order_id);
    assert_eq!(fills[0].filled_size, dec!(2));
    assert_eq!(fills[0].fill_price, Some(dec!(1.1000)));
    assert_eq!(fills[0].remaining_size, dec!(3));

    let resting = sim.snapshot().resting_orders;
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].status, OrderStatus::Pending);
    assert_eq!(resting[0].remaining_size(), dec!(3));
    assert_eq!(sim.position().size, dec!(2));
}

#[test]
fn test_stream_exhaustion_stops() {
    let mut sim = simulation(
        &frictionless(10_000, 1),
        vec![
            tick(0, dec!(1.1000), dec!(1.1000)),
            tick(1000, dec!(1.1000), dec!(1.1000)),
        ],
    );
    sim.next_tick().unwrap();
    sim.next_tick().unwrap();

    let err = sim.next_tick().unwrap_err();
    assert!(matches!(err, SimulationError::StreamExhausted));
    assert_eq!(err.exit_code(), 0);
    assert_eq!(sim.status(), SimulationStatus::Stopped);
    assert!(!sim.is_running());
    assert_eq!(sim.metrics().ticks_processed, 2);
}

#[test]
fn test_marketable_limit_fills_at_limit_price() {
    let mut sim = simulation(
        &frictionless(10_000, 100),
        vec![tick(0, dec!(1.0999), dec!(1.1000))],
    );
    sim.next_tick().unwrap();

    let exec = sim
        .submit_order(Order::limit(Side::Buy, dec!(1), dec!(1.1005)))
        .unwrap();
    assert_eq!(exec.status, ExecutionStatus::Filled);
    assert_eq!(exec.fill_price, Some(dec!(1.1005)));
    assert_eq!(sim.position().entry_price, dec!(1.1005));
}

#[test]
fn test_unreachable_limit_sell_ends_pending() {
    let mut agent = ScheduledAgent::from_json(
        r#"[{ "at": "2024-03-04T09:00:00Z", "side": "SELL", "type": "LIMIT",
              "size": 1, "limit_price": 1.2000 }]"#,
    )
    .unwrap();
    let mut sim = simulation(
        &frictionless(10_000, 100),
        (0..5)
            .map(|i| tick(i * 1000, dec!(1.0999), dec!(1.1000)))
            .collect(),
    );

    let metrics = sim.run(&mut agent).unwrap();
    assert_eq!(metrics.ticks_processed, 5);
    assert_eq!(metrics.trades, 0);
    assert_eq!(sim.status(), SimulationStatus::Stopped);

    let resting = sim.snapshot().resting_orders;
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].status, OrderStatus::Pending);
    assert_eq!(agent.executions()[0].status, ExecutionStatus::Pending);
}

#[test]
fn test_drawdown_exactly_at_limit_holds() {
    let mut sim = simulation(
        &frictionless(10_000, 100),
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(1000, dec!(1.0800), dec!(1.0801)),
            tick(2000, dec!(1.0799), dec!(1.0800)),
        ],
    );
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();

    // -2000 on 10000: exactly 20 %
    sim.next_tick().unwrap();
    assert_eq!(sim.account().drawdown(), dec!(0.2));
    assert!(!sim.is_blown());
    assert_eq!(sim.status(), SimulationStatus::Running);

    // -2010: strictly above
    sim.next_tick().unwrap();
    assert!(sim.is_blown());
}

#[test]
fn test_soft_drawdown_blocks_new_exposure() {
    let value = serde_json::json!({
        "instrument": { "type": "FOREX", "symbol": "EUR/USD" },
        "account": {
            "initial_balance": 10000,
            "leverage": 100,
            "max_drawdown_percent": 20.0,
            "drawdown_policy": "soft"
        },
        "speed": { "multiplier": 1.0e9 },
        "csv": { "filepath": "unused.csv" }
    });
    let config = SimulationConfig::from_json(&value.to_string()).unwrap();
    let mut sim = simulation(
        &config,
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(1000, dec!(1.0700), dec!(1.0701)),
        ],
    );
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    sim.next_tick().unwrap();

    assert_eq!(sim.account().status(), AccountStatus::AtLimit);
    assert!(!sim.is_blown());

    let more = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    assert_eq!(more.rejection, Some(RejectReason::PositionLimit));

    // Reducing is still allowed
    let close = sim.submit_order(Order::market(Side::Sell, dec!(1))).unwrap();
    assert_eq!(close.status, ExecutionStatus::Filled);
    assert!(sim.position().is_flat());
}

#[test]
fn test_no_partial_fill_mode_fills_beyond_depth() {
    let thin = tick(0, dec!(1.0999), dec!(1.1000)).with_depth(DepthProfile::new(
        vec![DepthLevel::new(dec!(1.0999), dec!(1))],
        vec![DepthLevel::new(dec!(1.1000), dec!(1))],
    ));
    let mut sim = simulation(&frictionless(10_000, 100), vec![thin]);
    sim.next_tick().unwrap();

    let exec = sim.submit_order(Order::market(Side::Buy, dec!(3))).unwrap();
    assert_eq!(exec.status, ExecutionStatus::Filled);
    assert_eq!(exec.filled_size, dec!(3));
}

#[test]
fn test_zero_friction_round_trip_is_flat() {
    let mut sim = simulation(
        &frictionless(10_000, 100),
        vec![
            tick(0, dec!(1.2500), dec!(1.2500)),
            tick(1000, dec!(1.2500), dec!(1.2500)),
        ],
    );
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Buy, dec!(2))).unwrap();
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Sell, dec!(2))).unwrap();

    assert!(sim.position().is_flat());
    assert_eq!(sim.position().side, PositionSide::Flat);
    assert_eq!(sim.account().realized_pnl(), Decimal::ZERO);
    assert_eq!(sim.balance(), dec!(10000));
    assert_eq!(sim.metrics().breakeven_trades, 1);
}

#[test]
fn test_flip_long_to_short() {
    let mut sim = simulation(
        &frictionless(10_000, 100),
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(1000, dec!(1.1010), dec!(1.1011)),
        ],
    );
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    sim.next_tick().unwrap();
    sim.submit_order(Order::market(Side::Sell, dec!(2))).unwrap();

    let position = sim.position();
    assert_eq!(position.side, PositionSide::Short);
    assert_eq!(position.size, dec!(1));
    assert_eq!(position.entry_price, dec!(1.1010));
    assert_eq!(sim.account().realized_pnl(), dec!(100));
}

#[test]
fn test_forex_commission_on_one_lot_at_par() {
    let config = config(10_000, 100, serde_json::json!({ "commission": true }));
    let mut sim = simulation(&config, vec![tick(0, dec!(0.99999), dec!(1.00000))]);
    sim.next_tick().unwrap();

    let exec = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    assert_eq!(exec.commission, dec!(2.50));
}

#[test]
fn test_latency_fills_on_later_tick() {
    let config = config(
        10_000,
        100,
        serde_json::json!({ "latency": true, "latency_ms": 250 }),
    );
    let mut sim = simulation(
        &config,
        vec![
            tick(0, dec!(1.0999), dec!(1.1000)),
            tick(100, dec!(1.1001), dec!(1.1002)),
            tick(300, dec!(1.1004), dec!(1.1005)),
        ],
    );
    sim.next_tick().unwrap();
    let ack = sim.submit_order(Order::market(Side::Buy, dec!(1))).unwrap();
    assert_eq!(ack.status, ExecutionStatus::Pending);

    sim.next_tick().unwrap();
    assert!(sim.drain_executions().is_empty());

    sim.next_tick().unwrap();
    let fills = sim.drain_executions();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].fill_price, Some(dec!(1.1005)));
    assert_eq!(fills[0].latency_ms, 250);
}

#[test]
fn test_ledger_invariants_over_scheduled_run() {
    let config = config(
        10_000,
        50,
        serde_json::json!({
            "commission": true,
            "slippage": true,
            "slippage_model": "fixed",
            "fixed_slippage_pips": 0.2
        }),
    );
    let prices = [
        (dec!(1.1000), dec!(1.1001)),
        (dec!(1.1012), dec!(1.1013)),
        (dec!(1.0990), dec!(1.0991)),
        (dec!(1.1003), dec!(1.1004)),
        (dec!(1.1020), dec!(1.1021)),
        (dec!(1.1008), dec!(1.1009)),
    ];
    let ticks: Vec<Tick> = prices
        .iter()
        .enumerate()
        .map(|(i, (bid, ask))| tick(i as i64 * 1000, *bid, *ask))
        .collect();
    let mut agent = ScheduledAgent::new(vec![
        (at(0), Order::market(Side::Buy, dec!(2))),
        (at(1000), Order::market(Side::Sell, dec!(1))),
        (at(2000), Order::market(Side::Sell, dec!(3))),
        (at(3000), Order::limit(Side::Buy, dec!(1), dec!(1.1010))),
        (at(5000), Order::market(Side::Buy, dec!(1))),
    ]);

    let mut sim = simulation(&config, ticks);
    let mut last_hwm = sim.account().high_water_mark();
    loop {
        match sim.next_tick() {
            Ok(tick) => {
                let resting = sim.executor().resting_orders();
                let account = sim.account().snapshot();
                let ctx = holodeck_runner::AgentContext {
                    tick: &tick,
                    account: &account,
                    position: sim.position(),
                    resting: &resting,
                };
                let orders = holodeck_runner::Agent::on_tick(&mut agent, &ctx);
                for order in orders {
                    let exec = sim.submit_order(order).unwrap();
                    if exec.is_fill() {
                        assert!(exec.filled_size <= exec.requested_size);
                        assert!(exec.commission >= Decimal::ZERO);
                        assert!(exec.slippage >= Decimal::ZERO);
                    }
                }
            }
            Err(SimulationError::StreamExhausted) => break,
            Err(err) => panic!("unexpected {}", err),
        }

        let account = sim.account();
        assert_eq!(
            account.available_margin(),
            account.leverage() * account.balance() - account.used_margin()
        );
        assert!(account.high_water_mark() >= last_hwm);
        last_hwm = account.high_water_mark();
        assert_eq!(
            sim.position().is_flat(),
            sim.position().size == Decimal::ZERO
        );
    }

    let account = sim.account();
    let audited: Decimal = account.history().iter().map(|update| update.delta).sum();
    assert_eq!(audited, account.balance() - account.initial_balance());
    assert!(account.trade_stats().total >= 2);
}

#[test]
fn test_csv_file_end_to_end() {
    init_logging();
    let dir = std::env::temp_dir().join(format!("holodeck-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let csv_path = dir.join("eurusd.csv");
    std::fs::write(
        &csv_path,
        "timestamp,bid,ask,volume\n\
         2024-03-04T09:00:00Z,1.0999,1.1000,10\n\
         2024-03-04T09:00:01Z,1.1010,1.1011,10\n",
    )
    .unwrap();

    let value = serde_json::json!({
        "instrument": { "type": "FOREX", "symbol": "EUR/USD" },
        "account": { "initial_balance": 10000, "leverage": 100 },
        "execution": { "commission": true },
        "speed": { "multiplier": 1.0e9 },
        "csv": { "filepath": csv_path }
    });
    let config = SimulationConfig::from_json(&value.to_string()).unwrap();
    let mut agent = ScheduledAgent::from_json(
        r#"[
            { "at": "2024-03-04T09:00:00Z", "side": "BUY", "size": 1 },
            { "at": "2024-03-04T09:00:01Z", "side": "SELL", "size": 1 }
        ]"#,
    )
    .unwrap();

    let mut sim = Simulation::from_csv(&config).unwrap();
    let metrics = sim.run(&mut agent).unwrap();
    assert_eq!(metrics.ticks_processed, 2);
    assert_eq!(metrics.final_balance, dec!(10094.4975));
    assert!(sim.report().to_string().contains("10094.50 USD"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_csv_maps_to_io_exit_code() {
    let value = serde_json::json!({
        "instrument": { "type": "FOREX", "symbol": "EUR/USD" },
        "account": { "initial_balance": 10000 },
        "csv": { "filepath": "/nonexistent/holodeck/ticks.csv" }
    });
    let config = SimulationConfig::from_json(&value.to_string()).unwrap();
    let err = Simulation::from_csv(&config).err().unwrap();
    assert!(matches!(err, SimulationError::TickSource(_)));
    assert_eq!(err.exit_code(), 2);
}
