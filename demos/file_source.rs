//! Example: Reading snapshots from a JSON file
//!
//! This example demonstrates how to use FileSource to read the same JSON
//! object the `/pull` endpoint serves, from a file on disk. The file is
//! re-read whenever its modification time changes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example file_source -- path/to/pull.json
//! ```

use std::env;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use pulldash::{DataSource, FileSource};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example file_source -- <path-to-pull.json>");
        eprintln!();
        eprintln!("The file should contain one JSON object, for example:");
        eprintln!(r#"  {{"calculated": {{"new_limit": 600, "sum_solar": 480}}}}"#);
        std::process::exit(1);
    });

    println!("Watching file: {}", path);
    println!("Press Ctrl+C to stop\n");

    let mut source = FileSource::new(&path);

    loop {
        match source.poll() {
            Some(snapshot) => {
                println!("Snapshot received with {} top-level keys:", snapshot.len());
                for (key, value) in &snapshot {
                    println!("  - {}: {}", key, value);
                }
                println!();
            }
            None => {
                if let Some(err) = source.error() {
                    eprint!("\rError ({} so far): {}  ", source.failures(), err);
                } else {
                    print!("\rWaiting for changes...  ");
                }
                let _ = io::stdout().flush();
            }
        }

        thread::sleep(Duration::from_millis(500));
    }
}
