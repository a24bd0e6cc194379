//! Data models and processing for polled snapshots.
//!
//! This module turns raw snapshots into what the dashboard shows: text for
//! each bound row and points for the chart.
//!
//! ## Submodules
//!
//! - [`path`]: Dot-path resolution ([`BindingKey`], [`Resolver`], [`MissingPolicy`])
//! - [`highlight`]: Change detection with versioned emphasis reverts
//! - [`board`]: Bound rows and the per-cycle render pass
//! - [`notify`]: "Data refreshed" broadcast channel
//! - [`history`]: Fixed-capacity chart history
//! - [`chart`]: Series configuration and the chart subscriber
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (raw JSON object)
//!        │
//!        ▼
//! Board::apply()  ── Resolver × N rows ──▶ Highlighter (row text, emphasis)
//!        │
//!        ▼
//! Notifier::publish(Refreshed)
//!        │
//!        └──▶ ChartAdapter::drain() ──▶ HistoryBuffer
//! ```

pub mod board;
pub mod chart;
pub mod duration;
pub mod highlight;
pub mod history;
pub mod notify;
pub mod path;

pub use board::{Binding, Board, Row};
pub use chart::{ChartAdapter, SeriesConfig};
pub use highlight::{DisplayState, Highlighter, Revert, RevertQueue};
pub use history::{HistoryBuffer, SeriesPoint};
pub use notify::{Notifier, Refreshed, ValueSet};
pub use path::{BindingKey, BindingKeyError, MissingPolicy, ResolveError, Resolver};
