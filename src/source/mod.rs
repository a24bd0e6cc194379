//! Data source abstraction for receiving snapshots.
//!
//! This module provides a trait-based abstraction for receiving snapshots
//! from various places: the polled HTTP endpoint, a JSON file on disk, or an
//! in-memory channel.

mod channel;
mod file;
mod http;
mod snapshot;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;
pub use snapshot::{parse_snapshot, Snapshot};

use std::fmt::Debug;

/// Trait for receiving snapshots from various sources.
///
/// # Example
///
/// ```
/// use pulldash::{FileSource, DataSource};
///
/// let mut source = FileSource::new("pull.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} top-level keys", snapshot.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method must not block. Sources that buffer several snapshots
    /// return them one per call, oldest first.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// The error from the most recent failed fetch, cleared by the next
    /// successful one.
    fn error(&self) -> Option<&str>;

    /// Number of fetches that have failed so far.
    fn failures(&self) -> u64 {
        0
    }

    /// Ask the source to fetch as soon as possible instead of waiting for
    /// its next scheduled poll.
    fn refresh(&mut self) {}
}
