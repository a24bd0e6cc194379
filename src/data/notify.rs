//! "Data refreshed" notifications.
//!
//! After every completed pass over the bound rows the resolved values are
//! broadcast to all subscribers. The chart is one subscriber; embedders can
//! add their own without the poll side knowing about them.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::broadcast;

/// Resolved value per bound key for one cycle.
pub type ValueSet = BTreeMap<String, Value>;

/// Number of notifications a slow subscriber may fall behind by.
const CHANNEL_CAPACITY: usize = 64;

/// Payload broadcast after each completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed {
    /// Wall-clock label for the cycle (`HH:MM:SS`).
    pub label: String,
    pub values: ValueSet,
}

impl Refreshed {
    /// Build a notification labelled with the current local time.
    pub fn now(values: ValueSet) -> Self {
        Self {
            label: chrono::Local::now().format("%H:%M:%S").to_string(),
            values,
        }
    }
}

/// Publishing side of the refresh channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Refreshed>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Register a new subscriber. It only sees notifications published
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Refreshed> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    pub fn publish(&self, event: Refreshed) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values() -> ValueSet {
        let mut values = ValueSet::new();
        values.insert("calculated.new_limit".to_string(), json!(600));
        values
    }

    #[test]
    fn test_every_subscriber_receives_event() {
        let notifier = Notifier::new();
        let mut chart = notifier.subscribe();
        let mut logger = notifier.subscribe();

        let event = Refreshed {
            label: "12:00:00".to_string(),
            values: values(),
        };
        assert_eq!(notifier.publish(event.clone()), 2);

        assert_eq!(chart.try_recv().unwrap(), event);
        assert_eq!(logger.try_recv().unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = Notifier::new();
        assert_eq!(notifier.publish(Refreshed::now(values())), 0);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_label_is_clock_time() {
        let event = Refreshed::now(ValueSet::new());
        assert_eq!(event.label.len(), 8);
        assert_eq!(event.label.matches(':').count(), 2);
    }
}
