//! HTTP polling data source.
//!
//! Runs a [`PollLoop`] on a background task and hands its snapshots to the
//! UI through a channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use super::{DataSource, Snapshot};
use crate::poll::{Fetch, FetchError, HttpFetcher, PollEvent, PollLoop};

/// Outcomes buffered between the poll task and the UI.
const CHANNEL_CAPACITY: usize = 16;

/// A data source that polls an HTTP endpoint on a fixed interval.
///
/// Must be created inside a tokio runtime. The background task stops when
/// the source is dropped.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pulldash::{DataSource, HttpSource};
///
/// # tokio_test::block_on(async {
/// let mut source = HttpSource::connect(
///     "http://127.0.0.1:8000/pull",
///     Duration::from_secs(1),
///     Duration::from_secs(5),
/// )
/// .unwrap();
/// let _ = source.poll();
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    receiver: mpsc::Receiver<PollEvent>,
    description: String,
    last_error: Option<String>,
    failures: u64,
    waker: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl HttpSource {
    /// Poll `endpoint` with a reqwest client.
    pub fn connect(
        endpoint: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(endpoint, timeout)?;
        Ok(Self::spawn(fetcher, interval))
    }

    /// Spawn a poll loop around any fetcher.
    pub fn spawn<F>(fetcher: F, interval: Duration) -> Self
    where
        F: Fetch + 'static,
    {
        let description = format!("http: {}", fetcher.endpoint());
        let poll = PollLoop::new(fetcher, interval);
        let waker = poll.waker();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = poll.spawn(tx);

        tracing::info!(%description, ?interval, "polling started");

        Self {
            receiver: rx,
            description,
            last_error: None,
            failures: 0,
            waker,
            handle,
        }
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<Snapshot> {
        loop {
            match self.receiver.try_recv() {
                Ok(PollEvent::Snapshot { snapshot, .. }) => {
                    self.last_error = None;
                    return Some(snapshot);
                }
                Ok(PollEvent::Failed { error, .. }) => {
                    self.failures += 1;
                    self.last_error = Some(error.to_string());
                }
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.last_error = Some("Poll task stopped".to_string());
                    return None;
                }
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn refresh(&mut self) {
        self.waker.notify_one();
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
