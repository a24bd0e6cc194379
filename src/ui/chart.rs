//! Chart view rendering.
//!
//! Draws the history buffer as one dataset per configured series. Series
//! marked `fill` are drawn as bars, the rest as braille lines.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::parse_color;

/// Y range for the chart. Always includes zero; pads the top slightly so the
/// highest point is not drawn on the border.
pub fn y_bounds(bounds: Option<(f64, f64)>) -> [f64; 2] {
    let (lo, hi) = bounds.unwrap_or((0.0, 1.0));
    let y_min = lo.min(0.0);
    let y_max = hi.max(0.0);
    if y_max - y_min < f64::EPSILON {
        return [y_min, y_min + 1.0];
    }
    [y_min, y_max + (y_max - y_min) * 0.05]
}

/// Render the Chart view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let buffer = app.chart.buffer();
    let paused = if app.chart.is_paused() { " [paused]" } else { "" };
    let title = format!(" History ({}/{}){} ", buffer.len(), buffer.capacity(), paused);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if buffer.is_empty() {
        let paragraph = Paragraph::new(" Waiting for data...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Datasets borrow their points, so collect them first.
    let points: Vec<Vec<(f64, f64)>> =
        app.chart.series().iter().map(|s| buffer.series(&s.id)).collect();

    let datasets: Vec<Dataset> = app
        .chart
        .series()
        .iter()
        .zip(points.iter())
        .map(|(series, data)| {
            let color = parse_color(&series.color).unwrap_or(Color::White);
            let name = match buffer.latest(&series.id) {
                Some(latest) => format!("{} {:.1}", series.label, latest),
                None => series.label.clone(),
            };
            let (marker, graph_type) = if series.fill {
                (symbols::Marker::HalfBlock, GraphType::Bar)
            } else {
                (symbols::Marker::Braille, GraphType::Line)
            };
            Dataset::default()
                .name(name)
                .marker(marker)
                .graph_type(graph_type)
                .style(Style::default().fg(color))
                .data(data)
        })
        .collect();

    let labels = buffer.labels();
    let x_labels: Vec<Line> = match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if labels.len() > 1 => {
            vec![Line::from(first.to_string()), Line::from(last.to_string())]
        }
        (Some(only), _) => vec![Line::from(only.to_string())],
        _ => Vec::new(),
    };
    let x_max = (buffer.len().saturating_sub(1) as f64).max(1.0);

    let [y_min, y_max] = y_bounds(buffer.value_bounds());

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("time".dark_gray())
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{y_min:.0}")),
                    Line::from(format!("{:.0}", (y_min + y_max) / 2.0)),
                    Line::from(format!("{y_max:.0}")),
                ]),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_bounds_begin_at_zero() {
        assert_eq!(y_bounds(Some((100.0, 200.0))), [0.0, 210.0]);
        assert_eq!(y_bounds(Some((-50.0, 50.0))), [-50.0, 55.0]);
    }

    #[test]
    fn test_y_bounds_degenerate() {
        let [lo, hi] = y_bounds(None);
        assert_eq!(lo, 0.0);
        assert!((hi - 1.05).abs() < 1e-9);
        assert_eq!(y_bounds(Some((0.0, 0.0))), [0.0, 1.0]);
        assert_eq!(y_bounds(Some((-5.0, -5.0))), [-5.0, 0.25]);
    }

    #[test]
    fn test_render_legend_and_pause_marker() {
        use crate::data::{Board, Highlighter, MissingPolicy, Resolver, SeriesConfig};
        use crate::source::ChannelSource;
        use ratatui::{backend::TestBackend, Terminal};
        use serde_json::json;

        let (_tx, source) = ChannelSource::create("test");
        let board =
            Board::new(Vec::new(), Resolver::new(MissingPolicy::Zero), Highlighter::default());
        let mut app = App::new(Box::new(source), board, SeriesConfig::defaults(), 50);

        let mut values = crate::data::ValueSet::new();
        values.insert("calculated.new_limit".to_string(), json!(600));
        app.chart.on_refresh(&crate::data::Refreshed {
            label: "12:00:00".to_string(),
            values,
        });
        app.toggle_pause();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();
        let text: String =
            terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("History (1/50) [paused]"));
        assert!(text.contains("Limit WR 600.0"));
    }
}
