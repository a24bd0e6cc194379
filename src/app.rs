//! Application state and navigation logic.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::broadcast;

use crate::config::DashboardConfig;
use crate::data::{
    Board, ChartAdapter, Highlighter, Notifier, Refreshed, Resolver, SeriesConfig, ValueSet,
};
use crate::source::{DataSource, Snapshot};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Table of bound rows with change emphasis.
    Values,
    /// Rolling chart of the configured series.
    Chart,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Values => View::Chart,
            View::Chart => View::Values,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Only two views, so both directions land on the other one.
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Values => "Values",
            View::Chart => "Chart",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    notifier: Notifier,
    pub board: Board,
    pub chart: ChartAdapter,

    /// Values of the last completed pass.
    pub last_values: Option<ValueSet>,
    /// When the last pass completed.
    pub last_updated: Option<Instant>,
    /// Completed passes.
    pub cycles: u64,
    /// Passes aborted by a resolve error.
    pub resolve_failures: u64,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_row: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a board and a chart series list.
    ///
    /// The chart is subscribed to the app's refresh notifications before any
    /// data is loaded, so it sees every completed pass.
    pub fn new(
        source: Box<dyn DataSource>,
        board: Board,
        series: Vec<SeriesConfig>,
        history: usize,
    ) -> Self {
        let notifier = Notifier::new();
        let chart = ChartAdapter::new(series, history).subscribed(notifier.subscribe());
        Self {
            running: true,
            current_view: View::Values,
            show_help: false,
            source,
            notifier,
            board,
            chart,
            last_values: None,
            last_updated: None,
            cycles: 0,
            resolve_failures: 0,
            load_error: None,
            selected_row: 0,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Create an App from loaded configuration.
    pub fn from_config(source: Box<dyn DataSource>, config: &DashboardConfig) -> Self {
        let board = Board::new(
            config.effective_bindings(),
            Resolver::new(config.missing),
            Highlighter::new(config.highlight),
        );
        Self::new(source, board, config.series.clone(), config.history)
    }

    /// Replace the theme (e.g. with [`Theme::auto_detect`]).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Number of failed fetches reported by the source.
    pub fn fetch_failures(&self) -> u64 {
        self.source.failures()
    }

    /// Subscribe to "data refreshed" notifications alongside the chart.
    pub fn subscribe(&self) -> broadcast::Receiver<Refreshed> {
        self.notifier.subscribe()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Drain the data source and run one pass per snapshot received.
    ///
    /// Also expires due highlights and feeds the chart. Returns `true` if
    /// anything visible changed.
    pub fn reload_data(&mut self) -> bool {
        let now = Instant::now();
        let mut changed = false;

        while let Some(snapshot) = self.source.poll() {
            changed |= self.apply_snapshot(&snapshot, now);
        }
        self.load_error = self.source.error().map(str::to_string);

        changed |= self.tick(now) > 0;
        self.chart.drain();
        changed | self.chart.take_redraw()
    }

    /// Run one synchronous pass over all bound rows and publish the result.
    ///
    /// A resolve error (only under the `Fail` policy) is logged and
    /// suppresses the notification for this snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, now: Instant) -> bool {
        match self.board.apply(snapshot, now) {
            Ok(values) => {
                self.cycles += 1;
                self.last_updated = Some(now);
                self.last_values = Some(values.clone());
                let reached = self.notifier.publish(Refreshed::now(values));
                tracing::debug!(cycle = self.cycles, subscribers = reached, "values refreshed");
                true
            }
            Err(e) => {
                self.resolve_failures += 1;
                tracing::warn!(error = %e, "render pass aborted");
                true
            }
        }
    }

    /// Clear highlights whose hold period has elapsed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.board.expire(now)
    }

    /// Ask the source for an immediate fetch.
    pub fn refresh_now(&mut self) {
        self.source.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Pause or resume chart recording.
    pub fn toggle_pause(&mut self) {
        self.chart.toggle_pause();
        let message = if self.chart.is_paused() {
            "Chart paused"
        } else {
            "Chart resumed"
        };
        self.set_status_message(message.to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one row.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n rows.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.board.len().saturating_sub(1);
        self.selected_row = (self.selected_row + n).min(max);
    }

    /// Move selection up by n rows.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_row = self.selected_row.saturating_sub(n);
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        self.selected_row = 0;
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        self.selected_row = self.board.len().saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the last value set and the chart history to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(ref values) = self.last_values else {
            anyhow::bail!("No data to export");
        };

        let history: Vec<serde_json::Value> = self
            .chart
            .buffer()
            .iter()
            .map(|point| serde_json::json!({ "label": point.label, "values": point.values }))
            .collect();

        let export = serde_json::json!({
            "source": self.source_description(),
            "cycles": self.cycles,
            "values": values,
            "history": history,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Binding, MissingPolicy};
    use crate::source::ChannelSource;
    use serde_json::json;
    use tokio::sync::watch;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        value.as_object().cloned().unwrap()
    }

    fn app_with(keys: &[&str], policy: MissingPolicy) -> (watch::Sender<Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let bindings = keys.iter().map(|k| Binding::new(k.parse().unwrap())).collect();
        let board = Board::new(bindings, Resolver::new(policy), Highlighter::default());
        let series = vec![SeriesConfig::new("calculated.new_limit", "Limit WR", "yellow", false)];
        (tx, App::new(Box::new(source), board, series, 50))
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Values.next(), View::Chart);
        assert_eq!(View::Chart.next(), View::Values);
        assert_eq!(View::Values.prev(), View::Chart);
        assert_eq!(View::Chart.label(), "Chart");
    }

    #[test]
    fn test_reload_updates_rows_and_chart() {
        let (tx, mut app) = app_with(&["calculated.new_limit", "shelly.power"], MissingPolicy::Zero);

        // The initial empty snapshot resolves both rows to 0.
        assert!(app.reload_data());
        assert_eq!(app.cycles, 1);
        assert_eq!(app.board.rows()[0].state.text, "0");

        tx.send(snapshot(json!({
            "calculated": { "new_limit": 600 },
            "shelly": { "power": 412.5 }
        })))
        .unwrap();
        assert!(app.reload_data());

        assert_eq!(app.cycles, 2);
        assert_eq!(app.board.rows()[0].state.text, "600");
        assert!(app.board.rows()[0].state.emphasised);
        assert_eq!(app.last_values.as_ref().unwrap()["shelly.power"], json!(412.5));
        assert_eq!(app.chart.buffer().len(), 2);
        assert_eq!(app.chart.buffer().latest("calculated.new_limit"), Some(600.0));
    }

    #[test]
    fn test_fail_policy_skips_notification() {
        let (tx, mut app) = app_with(&["calculated.new_limit"], MissingPolicy::Fail);

        // Empty snapshot: the key is missing.
        app.reload_data();
        assert_eq!(app.cycles, 0);
        assert_eq!(app.resolve_failures, 1);
        assert!(app.chart.buffer().is_empty());

        tx.send(snapshot(json!({ "calculated": { "new_limit": 450 } }))).unwrap();
        app.reload_data();
        assert_eq!(app.cycles, 1);
        assert_eq!(app.chart.buffer().len(), 1);
    }

    #[test]
    fn test_external_subscriber_sees_every_pass() {
        let (tx, mut app) = app_with(&["calculated.new_limit"], MissingPolicy::Zero);
        let mut rx = app.subscribe();

        app.reload_data();
        tx.send(snapshot(json!({ "calculated": { "new_limit": 1 } }))).unwrap();
        app.reload_data();

        assert_eq!(rx.try_recv().unwrap().values["calculated.new_limit"], json!(0));
        assert_eq!(rx.try_recv().unwrap().values["calculated.new_limit"], json!(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_tick_clears_expired_highlight() {
        let (tx, mut app) = app_with(&["a"], MissingPolicy::Zero);
        app.reload_data();

        let now = Instant::now();
        tx.send(snapshot(json!({ "a": 5 }))).unwrap();
        let snapshot = app.source.poll().unwrap();
        app.apply_snapshot(&snapshot, now);
        assert!(app.board.rows()[0].state.emphasised);

        assert_eq!(app.tick(now + Duration::from_millis(500)), 0);
        assert_eq!(app.tick(now + Duration::from_secs(1)), 1);
        assert!(!app.board.rows()[0].state.emphasised);
    }

    #[test]
    fn test_selection_is_clamped() {
        let (_tx, mut app) = app_with(&["a", "b", "c"], MissingPolicy::Zero);
        app.select_next_n(10);
        assert_eq!(app.selected_row, 2);
        app.select_prev();
        assert_eq!(app.selected_row, 1);
        app.select_first();
        assert_eq!(app.selected_row, 0);
        app.select_prev();
        assert_eq!(app.selected_row, 0);
        app.select_last();
        assert_eq!(app.selected_row, 2);
    }

    #[test]
    fn test_toggle_pause_sets_status() {
        let (_tx, mut app) = app_with(&["a"], MissingPolicy::Zero);
        app.toggle_pause();
        assert!(app.chart.is_paused());
        assert_eq!(app.get_status_message(), Some("Chart paused"));
    }

    #[test]
    fn test_export_requires_data() {
        let (_tx, mut app) = app_with(&["calculated.new_limit"], MissingPolicy::Zero);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        assert!(app.export_state(&path).is_err());

        app.reload_data();
        app.export_state(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["cycles"], json!(1));
        assert_eq!(written["values"]["calculated.new_limit"], json!(0));
        assert_eq!(written["history"][0]["values"]["calculated.new_limit"], json!(0.0));
    }
}
