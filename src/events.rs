use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Values),
        KeyCode::Char('2') => app.set_view(View::Chart),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Row navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Char('r') => app.refresh_now(),
        KeyCode::Char('p') => app.toggle_pause(),
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("pulldash_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Binding, Board, Highlighter, MissingPolicy, Resolver};
    use crate::source::{ChannelSource, Snapshot};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::watch;

    fn app() -> App {
        app_with_sender().1
    }

    fn app_with_sender() -> (watch::Sender<Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let bindings = ["a", "b", "c"].iter().map(|k| Binding::new(k.parse().unwrap())).collect();
        let board =
            Board::new(bindings, Resolver::new(MissingPolicy::Zero), Highlighter::default());
        (tx, App::new(Box::new(source), board, Vec::new(), 10))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::Chart);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Values);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Chart);
        handle_key_event(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.current_view, View::Values);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_row, 2);
        handle_key_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selected_row, 1);
        handle_key_event(&mut app, key(KeyCode::Home));
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_pause_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('p')));
        assert!(app.chart.is_paused());
        handle_key_event(&mut app, key(KeyCode::Char('p')));
        assert!(!app.chart.is_paused());
    }

    #[test]
    fn test_refresh_key_repolls_source() {
        let (_tx, mut app) = app_with_sender();
        app.reload_data();
        assert_eq!(app.cycles, 1);

        handle_key_event(&mut app, key(KeyCode::Char('r')));
        app.reload_data();
        assert_eq!(app.cycles, 2);
    }
}
