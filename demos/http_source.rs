//! Example: Polling an HTTP endpoint
//!
//! This example demonstrates how to use HttpSource to poll a `/pull`
//! endpoint in the background and read the snapshots without blocking.
//! Failed polls are counted and retried at the normal interval.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example http_source -- http://127.0.0.1:8000/pull
//! ```
//!
//! Without an argument the default endpoint is used.

use std::env;
use std::time::Duration;

use pulldash::{DashboardConfig, DataSource, HttpSource};

#[tokio::main]
async fn main() {
    let config = DashboardConfig::default();
    let endpoint = env::args().nth(1).unwrap_or(config.endpoint);

    println!("Polling {} every {:?}", endpoint, config.interval);
    println!("Press Ctrl+C to stop\n");

    let mut source = match HttpSource::connect(&endpoint, config.interval, config.timeout) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot poll {}: {}", endpoint, e);
            std::process::exit(1);
        }
    };

    let mut reported_failures = 0;
    loop {
        if let Some(snapshot) = source.poll() {
            println!(
                "{}",
                serde_json::to_string(&snapshot).unwrap_or_else(|e| e.to_string())
            );
        } else if source.failures() > reported_failures {
            reported_failures = source.failures();
            eprintln!(
                "Poll failed ({} total): {}",
                reported_failures,
                source.error().unwrap_or("unknown error")
            );
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
