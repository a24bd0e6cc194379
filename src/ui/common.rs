//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_age;

/// Render the header bar.
///
/// Displays: source, row count, rows currently emphasised, completed and
/// failed cycles.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let failures = app.fetch_failures();
    let changed = app.board.rows().iter().filter(|r| r.state.emphasised).count();

    let (status_icon, status_style) = if app.load_error.is_some() {
        ("●", Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD))
    } else if app.last_updated.is_some() {
        ("●", Style::default().fg(app.theme.changed.fg.unwrap_or(app.theme.highlight)))
    } else {
        ("○", Style::default().add_modifier(Modifier::DIM))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("PULLDASH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.source_description().to_string()),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", app.board.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" rows "),
        if changed > 0 {
            Span::styled(format!("{}", changed), app.theme.changed)
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" changed │ "),
        Span::raw(format!("{} cycles", app.cycles)),
    ];

    if failures > 0 || app.resolve_failures > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} failed", failures + app.resolve_failures),
            Style::default().fg(app.theme.error),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Values "), Line::from(" 2:Chart ")];

    let selected = match app.current_view {
        View::Values => 0,
        View::Chart => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: current view, time since last update, available controls.
/// Also displays temporary status messages and the last fetch error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Values => "↑↓:select r:refresh Tab:switch ?:help q:quit",
        View::Chart => "p:pause r:refresh Tab:switch ?:help q:quit",
    };

    let status = match (app.last_updated, app.load_error.as_deref()) {
        (Some(updated), Some(err)) => format!(
            " {} | Updated {} ago | Last fetch failed: {} | {}",
            app.current_view.label(),
            format_age(updated.elapsed()),
            err,
            controls,
        ),
        (Some(updated), None) => format!(
            " {} | Updated {} ago | {}",
            app.current_view.label(),
            format_age(updated.elapsed()),
            controls,
        ),
        (None, Some(err)) => format!(" Error: {} | q:quit r:retry", err),
        (None, None) => " Waiting for data... | q:quit".to_string(),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Select row"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Data",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Poll now"),
        Line::from("  p         Pause/resume chart"),
        Line::from("  e         Export to JSON"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?         Toggle help"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 21u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
