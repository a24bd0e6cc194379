//! The fetch-and-reschedule poll loop.
//!
//! A [`PollLoop`] alternates between two states: [`PollState::Idle`] while
//! its timer is armed and [`PollState::InFlight`] while a request is
//! outstanding. Every cycle publishes its outcome and then re-arms the timer,
//! whether the fetch succeeded or not, so a failing endpoint is simply
//! retried at the normal cadence.
//!
//! ```text
//!        ┌──────── interval elapsed / refresh ────────┐
//!        │                                            ▼
//!   ┌─────────┐                                 ┌──────────┐
//!   │  Idle   │◀──── outcome published ─────────│ InFlight │
//!   └─────────┘      (success or failure)       └──────────┘
//! ```

pub mod http;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::source::Snapshot;

pub use http::HttpFetcher;

/// Default delay between the end of one cycle and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Ways a single fetch can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Could not connect to the endpoint.
    #[error("connection failed: {0}")]
    Connection(String),

    /// No response within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// Any other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The body was not a JSON object.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Something that can produce one snapshot per call.
#[async_trait]
pub trait Fetch: Send + Sync + Debug {
    async fn fetch(&self) -> Result<Snapshot, FetchError>;

    /// Where snapshots come from, for status display and logs.
    fn endpoint(&self) -> &str;
}

/// Whether the loop is waiting on its timer or on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    InFlight,
}

/// Outcome of one cycle, as delivered to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Snapshot { cycle: u64, snapshot: Snapshot },
    Failed { cycle: u64, error: FetchError },
}

impl PollEvent {
    pub fn cycle(&self) -> u64 {
        match self {
            PollEvent::Snapshot { cycle, .. } | PollEvent::Failed { cycle, .. } => *cycle,
        }
    }
}

/// Self-rescheduling fetch loop.
#[derive(Debug)]
pub struct PollLoop<F> {
    fetcher: F,
    interval: Duration,
    state: PollState,
    cycles: u64,
    wake: Arc<Notify>,
}

impl<F: Fetch> PollLoop<F> {
    pub fn new(fetcher: F, interval: Duration) -> Self {
        Self {
            fetcher,
            interval,
            state: PollState::Idle,
            cycles: 0,
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Handle that cuts the current wait short when notified.
    pub fn waker(&self) -> Arc<Notify> {
        self.wake.clone()
    }

    /// Run exactly one fetch.
    pub async fn cycle(&mut self) -> Result<Snapshot, FetchError> {
        self.state = PollState::InFlight;
        let outcome = self.fetcher.fetch().await;
        self.state = PollState::Idle;
        self.cycles += 1;

        match &outcome {
            Ok(snapshot) => {
                tracing::debug!(cycle = self.cycles, keys = snapshot.len(), "poll succeeded");
            }
            Err(e) => {
                tracing::warn!(
                    cycle = self.cycles,
                    endpoint = self.fetcher.endpoint(),
                    error = %e,
                    "poll failed"
                );
            }
        }
        outcome
    }

    /// Poll until the receiving side of `tx` is dropped.
    pub async fn run(mut self, tx: mpsc::Sender<PollEvent>) {
        loop {
            let event = match self.cycle().await {
                Ok(snapshot) => PollEvent::Snapshot {
                    cycle: self.cycles,
                    snapshot,
                },
                Err(error) => PollEvent::Failed {
                    cycle: self.cycles,
                    error,
                },
            };
            self.discard_stale_wake();

            if tx.send(event).await.is_err() {
                tracing::debug!("poll receiver dropped, stopping");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.wake.notified() => {
                    tracing::debug!("poll woken early");
                }
            }
        }
    }

    /// Drop a refresh requested while the fetch was in flight. That request
    /// was already served by the fetch that just finished; keeping its permit
    /// would cut the next wait to nothing.
    fn discard_stale_wake(&self) {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        if notified.as_mut().enable() {
            tracing::debug!("refresh during fetch ignored");
        }
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime.
    pub fn spawn(self, tx: mpsc::Sender<PollEvent>) -> JoinHandle<()>
    where
        F: 'static,
    {
        tokio::spawn(self.run(tx))
    }
}
