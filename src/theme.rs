//! Named color schemes.

use ratatui::style::{Color, Modifier, Style};

/// Palette entries used by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub header: Style,
    pub body: Style,
    pub footer: Style,
    /// Focused control.
    pub focus: Style,
    /// Disabled menu entries.
    pub dimmed: Style,
    /// Borders of dialogs and panes.
    pub border: Style,
    /// Error and warning lines.
    pub alert: Style,
}

/// Available schemes in cycling order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
    Orange,
    Blue,
    Green,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Light,
        ColorScheme::Dark,
        ColorScheme::Orange,
        ColorScheme::Blue,
        ColorScheme::Green,
    ];

    /// Scheme by name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
            ColorScheme::Orange => "orange",
            ColorScheme::Blue => "blue",
            ColorScheme::Green => "green",
        }
    }

    /// The next scheme, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn palette(self) -> Palette {
        let (fg, bg, accent, accent_fg) = match self {
            ColorScheme::Light => (Color::Black, Color::Gray, Color::Blue, Color::White),
            ColorScheme::Dark => (Color::Gray, Color::Black, Color::DarkGray, Color::White),
            ColorScheme::Orange => (Color::Black, Color::White, Color::Rgb(255, 140, 0), Color::Black),
            ColorScheme::Blue => (Color::White, Color::Blue, Color::Cyan, Color::Black),
            ColorScheme::Green => (Color::Green, Color::Black, Color::Green, Color::Black),
        };
        Palette {
            header: Style::default().fg(accent_fg).bg(accent).add_modifier(Modifier::BOLD),
            body: Style::default().fg(fg).bg(bg),
            footer: Style::default().fg(accent_fg).bg(accent),
            focus: Style::default()
                .fg(accent_fg)
                .bg(accent)
                .add_modifier(Modifier::BOLD),
            dimmed: Style::default().fg(Color::DarkGray).bg(bg),
            border: Style::default().fg(accent).bg(bg),
            alert: Style::default().fg(Color::Red).bg(bg).add_modifier(Modifier::BOLD),
        }
    }
}
