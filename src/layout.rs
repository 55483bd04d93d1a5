//! Layout helpers.

use ratatui::prelude::*;

/// The three bands of every screen.
pub struct Frame3 {
    /// Title line with the session suffix and keyboard layout.
    pub header: Rect,
    /// Window content.
    pub body: Rect,
    /// Key hints, clock, load and the optional debug line.
    pub footer: Rect,
}

/// Split the screen into header, body and footer. The footer grows by one
/// line when the debug line is shown.
pub fn create_frame_layout(area: Rect, debug: bool) -> Frame3 {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(if debug { 3 } else { 2 }),
        ])
        .split(area);

    Frame3 {
        header: chunks[0],
        body: chunks[1],
        footer: chunks[2],
    }
}

/// Split the status screen body into its two panes.
pub fn create_main_panes(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Rectangle of at most `width` x `height` centered in `area`.
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
