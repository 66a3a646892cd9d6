//! Ten threads race to spend from one balance that can only cover two of them.
//!
//! Run with `RUST_LOG=point_wallet=debug` to see each mutation.

use anyhow::Context;
use point_wallet::{
    WalletService,
    config::TableConfig,
    logging::init_logging,
    store::{BalanceStore, MemoryBalanceTable, MemoryHistoryTable},
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    init_logging("info");

    let config = TableConfig::throttled(Duration::from_millis(20), Duration::from_millis(30));
    let balances = Arc::new(MemoryBalanceTable::with_config(config));
    let histories = Arc::new(MemoryHistoryTable::with_config(config));
    balances.insert_or_update(1, 5_000)?;

    let service = Arc::new(WalletService::new(balances, histories));

    let handles: Vec<_> = (0..10)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || (worker, service.use_points(1, 2_500)))
        })
        .collect();

    for handle in handles {
        let (worker, res) = handle
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
        match res {
            Ok(balance) => println!("worker {worker}: ok, balance now {}", balance.amount()),
            Err(err) => println!("worker {worker}: {} ({})", err, err.code()),
        }
    }

    let balance = service.balance(1).context("reading final balance")?;
    println!("final balance: {}", balance.amount());
    for entry in service.history(1)? {
        println!(
            "#{} {:?} -> {} at {}",
            entry.id,
            entry.kind,
            entry.amount,
            entry.timestamp.to_datetime_utc()
        );
    }

    Ok(())
}
