use crate::cli::CacheCommands;
use crate::config::PlannerConfig;
use anyhow::Result;
use planner_core::cache::{CacheStore, FileBackend, LoadSummary, SystemClock};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn run(cmd: CacheCommands, config: &PlannerConfig) -> Result<()> {
    let store = CacheStore::new(
        FileBackend::new(&config.cache.path),
        config.ttl(),
        Arc::new(SystemClock),
    );
    // Loading already drops expired entries.
    let loaded = store.load();

    match cmd {
        CacheCommands::Stats => stats(&store, loaded),
        CacheCommands::Prune => {
            println!(
                "✅ Pruned {} expired entries; {} remain.",
                loaded.expired, loaded.entries
            );
        }
        CacheCommands::Clear => {
            let removed = store.clear();
            println!("✅ Cleared {} entries from {}.", removed, config.cache.path.display());
        }
    }
    Ok(())
}

fn stats(store: &CacheStore, loaded: LoadSummary) {
    let stats = store.stats();

    println!();
    println!("Weather Cache");
    println!("{}", "─".repeat(50));
    println!("File:    {}", stats.location);
    println!("TTL:     {:>8}s", stats.ttl_secs);
    println!("Entries: {:>8}", stats.entries);
    for (operation, count) in by_operation(&store.keys()) {
        println!("  {:16} {:>8}", operation, count);
    }
    println!("Expired: {:>8}  (pruned on load)", loaded.expired);
    println!("{}", "─".repeat(50));
    println!();
}

/// Count keys by their operation prefix (`current:{...}` -> `current`).
fn by_operation(keys: &[String]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        let operation = key.split_once(':').map_or(key.as_str(), |(op, _)| op);
        *counts.entry(operation).or_insert(0) += 1;
    }
    counts
}
