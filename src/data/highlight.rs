//! Change detection and transient emphasis for bound values.
//!
//! When a row's text changes it is emphasised for a short hold period.
//! Every change bumps the row's version stamp and hands back a [`Revert`]
//! token carrying that version. A token only clears emphasis when its
//! version is still current, so a revert scheduled by an older change can
//! never cut short the highlight of a newer one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default hold period for the change emphasis.
pub const DEFAULT_HOLD: Duration = Duration::from_secs(1);

/// Rendered state of one bound row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Text currently shown.
    pub text: String,
    /// Text shown before the last change, kept only while emphasised.
    pub previous: Option<String>,
    /// Whether the row is currently emphasised.
    pub emphasised: bool,
    /// Monotonic stamp, bumped on every change.
    pub version: u64,
}

/// A pending request to clear a row's emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revert {
    /// Index of the row the token belongs to.
    pub row: usize,
    /// Row version at the time the change was applied.
    pub version: u64,
    /// When the emphasis should be cleared.
    pub due: Instant,
}

/// Applies new values to rows and schedules emphasis reverts.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pub hold: Duration,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self { hold: DEFAULT_HOLD }
    }
}

impl Highlighter {
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }

    /// Show `text` on `state` if it differs from what is displayed.
    ///
    /// Comparison is textual. Returns the revert token for the new emphasis,
    /// or `None` when nothing changed (no mutation, no emphasis).
    pub fn apply(
        &self,
        row: usize,
        state: &mut DisplayState,
        text: &str,
        keep_previous: bool,
        now: Instant,
    ) -> Option<Revert> {
        if state.text == text {
            return None;
        }

        let old = std::mem::replace(&mut state.text, text.to_string());
        state.previous = keep_previous.then_some(old);
        state.emphasised = true;
        state.version += 1;

        Some(Revert {
            row,
            version: state.version,
            due: now + self.hold,
        })
    }

    /// Clear emphasis if `token` still refers to the current version.
    ///
    /// Returns `true` when the row was reverted.
    pub fn revert(state: &mut DisplayState, token: &Revert) -> bool {
        if token.version != state.version {
            return false;
        }
        state.emphasised = false;
        state.previous = None;
        true
    }
}

/// Pending reverts in the order they were scheduled.
///
/// All tokens share the same hold period, so scheduling order is also
/// deadline order.
#[derive(Debug, Clone, Default)]
pub struct RevertQueue {
    pending: VecDeque<Revert>,
}

impl RevertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Revert) {
        self.pending.push_back(token);
    }

    /// Remove and return every token whose deadline has passed.
    pub fn due(&mut self, now: Instant) -> Vec<Revert> {
        let mut fired = Vec::new();
        while let Some(token) = self.pending.front() {
            if token.due > now {
                break;
            }
            if let Some(token) = self.pending.pop_front() {
                fired.push(token);
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_text_is_untouched() {
        let highlighter = Highlighter::default();
        let mut state = DisplayState {
            text: "5".to_string(),
            ..Default::default()
        };
        let before = state.clone();

        assert!(highlighter.apply(0, &mut state, "5", true, Instant::now()).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_change_sets_text_and_emphasis() {
        let highlighter = Highlighter::default();
        let mut state = DisplayState::default();
        let now = Instant::now();

        let token = highlighter.apply(3, &mut state, "230", false, now).unwrap();
        assert_eq!(state.text, "230");
        assert!(state.emphasised);
        assert!(state.previous.is_none());
        assert_eq!(token.row, 3);
        assert_eq!(token.version, 1);
        assert_eq!(token.due, now + DEFAULT_HOLD);
    }

    #[test]
    fn test_comparison_is_textual() {
        let highlighter = Highlighter::default();
        let mut state = DisplayState {
            text: "5".to_string(),
            ..Default::default()
        };
        // Numerically equal, textually different
        assert!(highlighter.apply(0, &mut state, "5.0", false, Instant::now()).is_some());
        assert_eq!(state.text, "5.0");
    }

    #[test]
    fn test_keep_previous_until_revert() {
        let highlighter = Highlighter::default();
        let mut state = DisplayState {
            text: "100".to_string(),
            ..Default::default()
        };

        let token = highlighter.apply(0, &mut state, "120", true, Instant::now()).unwrap();
        assert_eq!(state.previous.as_deref(), Some("100"));

        assert!(Highlighter::revert(&mut state, &token));
        assert!(!state.emphasised);
        assert!(state.previous.is_none());
        assert_eq!(state.text, "120");
    }

    #[test]
    fn test_stale_revert_does_not_clear_newer_highlight() {
        let highlighter = Highlighter::default();
        let mut state = DisplayState::default();
        let t0 = Instant::now();

        let first = highlighter.apply(0, &mut state, "1", false, t0).unwrap();
        let second = highlighter
            .apply(0, &mut state, "2", false, t0 + Duration::from_millis(500))
            .unwrap();

        assert!(!Highlighter::revert(&mut state, &first));
        assert!(state.emphasised);

        assert!(Highlighter::revert(&mut state, &second));
        assert!(!state.emphasised);
    }

    #[test]
    fn test_queue_fires_in_deadline_order() {
        let highlighter = Highlighter::new(Duration::from_secs(1));
        let mut queue = RevertQueue::new();
        let mut a = DisplayState::default();
        let mut b = DisplayState::default();
        let t0 = Instant::now();

        queue.push(highlighter.apply(0, &mut a, "x", false, t0).unwrap());
        queue.push(
            highlighter
                .apply(1, &mut b, "y", false, t0 + Duration::from_millis(400))
                .unwrap(),
        );

        assert!(queue.due(t0 + Duration::from_millis(999)).is_empty());

        let fired = queue.due(t0 + Duration::from_millis(1000));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].row, 0);
        assert_eq!(queue.len(), 1);

        let fired = queue.due(t0 + Duration::from_secs(2));
        assert_eq!(fired[0].row, 1);
        assert!(queue.is_empty());
    }
}
