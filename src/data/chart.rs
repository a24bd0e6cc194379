//! Feeds refreshed value sets into the chart history.

use serde::Deserialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

use super::history::{HistoryBuffer, SeriesPoint};
use super::notify::Refreshed;
use super::path::value_number;

/// Static description of one chart line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeriesConfig {
    /// Bound key whose value feeds this series.
    pub id: String,
    /// Legend text.
    pub label: String,
    /// Colour: a name (`red`), `#rrggbb` or `rgb(r, g, b)`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Draw as a filled area rather than a plain line.
    #[serde(default)]
    pub fill: bool,
}

fn default_color() -> String {
    "white".to_string()
}

impl SeriesConfig {
    pub fn new(id: &str, label: &str, color: &str, fill: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            fill,
        }
    }

    /// The three lines of the power dashboard: total consumption, solar
    /// production and the inverter limit.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("calculated.sum_normalized", "Gesamtverbrauch", "rgb(255, 0, 0)", true),
            Self::new("calculated.sum_solar", "Solarbezug", "rgb(0, 255, 0)", true),
            Self::new("calculated.new_limit", "Limit WR", "rgb(128, 128, 0)", false),
        ]
    }
}

/// Owns the chart history and keeps it in step with refresh notifications.
#[derive(Debug)]
pub struct ChartAdapter {
    series: Vec<SeriesConfig>,
    buffer: HistoryBuffer,
    receiver: Option<broadcast::Receiver<Refreshed>>,
    /// Set whenever the buffer changes; cleared by the renderer.
    dirty: bool,
    /// While paused, notifications are drained but not recorded.
    paused: bool,
}

impl ChartAdapter {
    /// Create an adapter with a fixed series list and capacity.
    pub fn new(series: Vec<SeriesConfig>, capacity: usize) -> Self {
        Self {
            series,
            buffer: HistoryBuffer::new(capacity),
            receiver: None,
            dirty: false,
            paused: false,
        }
    }

    /// Attach the adapter to a notification channel.
    pub fn subscribed(mut self, receiver: broadcast::Receiver<Refreshed>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn series(&self) -> &[SeriesConfig] {
        &self.series
    }

    pub fn buffer(&self) -> &HistoryBuffer {
        &self.buffer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Record one notification.
    ///
    /// Every configured series whose id is present with a numeric value
    /// contributes to the new point; the rest are skipped for this cycle.
    /// Returns `true` if a point was appended.
    pub fn on_refresh(&mut self, event: &Refreshed) -> bool {
        if self.paused {
            return false;
        }

        let mut point = SeriesPoint::new(event.label.clone());
        for series in &self.series {
            if let Some(value) = event.values.get(&series.id).and_then(value_number) {
                point.values.insert(series.id.clone(), value);
            }
        }

        if point.values.is_empty() {
            tracing::trace!(label = %event.label, "no chart series in value set");
            return false;
        }

        self.buffer.push(point);
        self.dirty = true;
        true
    }

    /// Apply every notification waiting on the subscription.
    ///
    /// Returns the number of points appended.
    pub fn drain(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(receiver) = self.receiver.as_mut() {
            loop {
                match receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "chart fell behind refresh notifications");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }
        events.iter().filter(|event| self.on_refresh(event)).count()
    }

    /// Whether a redraw is pending; clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
