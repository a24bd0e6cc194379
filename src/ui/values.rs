//! Values view rendering.
//!
//! One table row per bound key: caption, current text (emphasised while a
//! change is being highlighted), the previous text for rows that keep it,
//! and how often the value changed.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the Values view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.board.is_empty() {
        let paragraph = Paragraph::new(" No keys bound. Add [[bind]] entries or --bind flags.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(" Values "));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Key"),
        Cell::from("Value"),
        Cell::from("Previous"),
        Cell::from("Changes"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .board
        .rows()
        .iter()
        .map(|row| {
            let previous = row.state.previous.clone().unwrap_or_default();
            let value_style = app.theme.value_style(row.state.emphasised);
            Row::new(vec![
                Cell::from(row.binding.caption().to_string()),
                Cell::from(row.state.text.clone()).style(value_style),
                Cell::from(previous).style(app.theme.previous),
                Cell::from(row.changes.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Key
        Constraint::Fill(2), // Value
        Constraint::Fill(2), // Previous
        Constraint::Min(8),  // Changes
    ];

    let selected = app.selected_row.min(app.board.len().saturating_sub(1));
    let title = format!(" Values [{}/{}] ", selected + 1, app.board.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
