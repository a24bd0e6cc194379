//! # pulldash
//!
//! A terminal dashboard for a JSON endpoint that is polled on a fixed
//! interval.
//!
//! Every poll returns one JSON object (a [`Snapshot`]). Rows of the
//! dashboard are bound to dot-separated keys such as `calculated.new_limit`;
//! each poll resolves every key, emphasises the rows whose text changed, and
//! broadcasts the resolved values so the rolling chart (and any other
//! subscriber) can record them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │(rows, chart)  │(rendering)   │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐    ┌─────────┐                                  │
//! │  │ source  │◀───│  poll   │◀── GET /pull every interval      │
//! │  │ (input) │    │ (loop)  │                                  │
//! │  └─────────┘    └─────────┘                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`poll`]**: The fetch/wait loop and the reqwest-backed fetcher
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) over the poll
//!   loop, a JSON file on disk, or an in-memory channel
//! - **[`data`]**: Key resolution, change highlighting, refresh notifications and
//!   chart history
//! - **[`app`]**: Application state and navigation
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: TOML + environment configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the default endpoint with the default rows and chart
//! pulldash
//!
//! # Poll another host and bind extra rows
//! pulldash --url http://192.168.1.20:8000/pull \
//!     --bind "+calculated.new_limit=Limit WR" --bind shelly3em.total_power
//!
//! # Print the resolved values once, for scripts
//! pulldash --once
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use pulldash::{App, DashboardConfig, FileSource};
//!
//! let source = Box::new(FileSource::new("pull.json"));
//! let app = App::from_config(source, &DashboardConfig::default());
//! ```
//!
//! ### As a library with HTTP source
//!
//! ```no_run
//! use std::time::Duration;
//! use pulldash::{App, DashboardConfig, HttpSource};
//!
//! # tokio_test::block_on(async {
//! let config = DashboardConfig::default();
//! let source = HttpSource::connect(&config.endpoint, config.interval, Duration::from_secs(5))
//!     .unwrap();
//! let app = App::from_config(Box::new(source), &config);
//! # });
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use pulldash::{App, ChannelSource, DashboardConfig};
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let app = App::from_config(Box::new(source), &DashboardConfig::default());
//!
//! // Other parts of the program can listen to every completed pass.
//! let mut refreshed = app.subscribe();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poll;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::{ConfigError, DashboardConfig};
pub use data::{
    Binding, BindingKey, Board, ChartAdapter, HistoryBuffer, MissingPolicy, Notifier, Refreshed,
    ResolveError, Resolver, SeriesConfig, ValueSet,
};
pub use poll::{Fetch, FetchError, PollLoop};
pub use source::{ChannelSource, DataSource, FileSource, HttpSource, Snapshot};
