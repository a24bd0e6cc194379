//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Style applied to a value while its change is emphasised.
    pub changed: Style,
    /// Style for the previous value shown next to a change.
    pub previous: Style,
    /// Color for fetch failures in the header.
    pub error: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            changed: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            previous: Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
            error: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            changed: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            previous: Style::default().fg(Color::Gray).add_modifier(Modifier::CROSSED_OUT),
            error: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a row value, emphasised or not.
    pub fn value_style(&self, emphasised: bool) -> Style {
        if emphasised {
            self.changed
        } else {
            Style::default()
        }
    }
}

/// Parse a series colour: a ratatui colour name (`red`, `lightgreen`),
/// `#rrggbb`, or CSS-style `rgb(r, g, b)`.
pub fn parse_color(spec: &str) -> Option<Color> {
    let spec = spec.trim();

    if let Some(inner) = spec
        .strip_prefix("rgb(")
        .or_else(|| spec.strip_prefix("rgba("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
        let r = channels.next()?.ok()?;
        let g = channels.next()?.ok()?;
        let b = channels.next()?.ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    // Covers names and #rrggbb.
    spec.parse::<Color>().ok()
}
