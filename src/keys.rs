//! Terminal input normalised to key names.
//!
//! Handlers match on short lowercase names such as `"enter"`, `"shift tab"`,
//! `"ctrl f1"`, `"page down"` or a single printable character (`"a"`, `"Q"`,
//! `"+"`). The space bar is `"space"`.

use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

/// Phase of a mouse input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MousePhase {
    Press,
    Release,
    Drag,
    ScrollUp,
    ScrollDown,
}

/// Input delivered to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Named key.
    Key(String),
    /// `(phase, button, col, row)`; button 1 is the primary button.
    Mouse {
        phase: MousePhase,
        button: u8,
        col: u16,
        row: u16,
    },
}

impl Event {
    /// Shorthand for a key event.
    pub fn key(name: &str) -> Self {
        Event::Key(name.to_string())
    }

    /// Key this event stands for. A primary-button press acts like `enter`,
    /// the wheel like `up`/`down`; other mouse input is dropped.
    pub fn normalize(self) -> Option<String> {
        match self {
            Event::Key(k) => Some(k),
            Event::Mouse {
                phase: MousePhase::Press,
                button: 1,
                ..
            } => Some("enter".into()),
            Event::Mouse {
                phase: MousePhase::ScrollUp,
                ..
            } => Some("up".into()),
            Event::Mouse {
                phase: MousePhase::ScrollDown,
                ..
            } => Some("down".into()),
            Event::Mouse { .. } => None,
        }
    }
}

/// Convert a terminal event; resize and focus events yield `None`.
pub fn from_terminal(ev: TermEvent) -> Option<Event> {
    match ev {
        TermEvent::Key(k) if k.kind != KeyEventKind::Release => key_name(&k).map(Event::Key),
        TermEvent::Mouse(m) => mouse_event(&m),
        _ => None,
    }
}

/// Name of a key press.
pub fn key_name(key: &KeyEvent) -> Option<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let base = match key.code {
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => return Some("shift tab".into()),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "page up".to_string(),
        KeyCode::PageDown => "page down".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        KeyCode::Char(' ') => "space".to_string(),
        // Shift is already folded into the character.
        KeyCode::Char(c) if !ctrl && !alt => return Some(c.to_string()),
        KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
        _ => return None,
    };

    let mut name = String::new();
    if ctrl {
        name.push_str("ctrl ");
    }
    if alt {
        name.push_str("meta ");
    }
    if shift && !matches!(key.code, KeyCode::Char(_)) {
        name.push_str("shift ");
    }
    name.push_str(&base);
    Some(name)
}

fn mouse_event(m: &MouseEvent) -> Option<Event> {
    let (phase, button) = match m.kind {
        MouseEventKind::Down(b) => (MousePhase::Press, button_number(b)),
        MouseEventKind::Up(b) => (MousePhase::Release, button_number(b)),
        MouseEventKind::Drag(b) => (MousePhase::Drag, button_number(b)),
        MouseEventKind::ScrollUp => (MousePhase::ScrollUp, 4),
        MouseEventKind::ScrollDown => (MousePhase::ScrollDown, 5),
        _ => return None,
    };
    Some(Event::Mouse {
        phase,
        button,
        col: m.column,
        row: m.row,
    })
}

fn button_number(b: MouseButton) -> u8 {
    match b {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
    }
}

/// Direction of a focus-moving key, if it is one.
pub fn tab_direction(key: &str) -> Option<crate::view::Dir> {
    use crate::view::Dir;
    match key {
        "tab" | "down" | "right" | "meta tab" => Some(Dir::Forward),
        "shift tab" | "up" | "left" | "meta shift tab" => Some(Dir::Backward),
        _ => None,
    }
}

/// Single printable character carried by a key name.
pub fn printable(key: &str) -> Option<char> {
    if key == "space" {
        return Some(' ');
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}
