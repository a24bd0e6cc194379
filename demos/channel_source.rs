//! Example: Feeding the dashboard via a channel
//!
//! This example demonstrates how to use ChannelSource to push snapshots
//! from inside your own program instead of polling an HTTP endpoint.
//!
//! This is useful when you want to:
//! - Embed pulldash in an application that already holds the data
//! - Replay recorded snapshots
//! - Test bindings without a running server
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_source
//! ```

use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use pulldash::data::Highlighter;
use pulldash::{Board, ChannelSource, DashboardConfig, DataSource, Resolver};

fn main() {
    let (tx, mut source) = ChannelSource::create("generator");
    let config = DashboardConfig::default();
    let mut board = Board::new(
        config.effective_bindings(),
        Resolver::new(config.missing),
        Highlighter::new(config.highlight),
    );

    println!("Generating snapshots on {}", source.description());
    println!("Press Ctrl+C to stop\n");

    // Stand-in for a producer elsewhere in the program.
    thread::spawn(move || {
        let mut tick: u64 = 0;
        loop {
            let solar = 400 + (tick % 7) * 25;
            let snapshot = json!({
                "calculated": {
                    "sum_normalized": 650 + (tick % 3) * 10,
                    "sum_solar": solar,
                    "new_limit": solar + 100,
                }
            });
            if let Some(map) = snapshot.as_object() {
                if tx.send(map.clone()).is_err() {
                    break;
                }
            }
            tick += 1;
            thread::sleep(Duration::from_secs(1));
        }
    });

    loop {
        if let Some(snapshot) = source.poll() {
            match board.apply(&snapshot, Instant::now()) {
                Ok(values) => {
                    let changed = board.rows().iter().filter(|r| r.state.emphasised).count();
                    println!(
                        "{} ({} changed)",
                        serde_json::to_string(&values).unwrap_or_default(),
                        changed
                    );
                }
                Err(e) => eprintln!("Resolve failed: {}", e),
            }
        }

        thread::sleep(Duration::from_millis(100));
    }
}
