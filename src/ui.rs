//! Terminal set-up and tear-down for the TUI.

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

/// Terminal type used across the application.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen with raw mode and mouse reporting.
pub fn init_terminal() -> Result<Tui> {
    // Raw mode also turns ^C/^\ into plain key events while the TUI runs.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Put the terminal back the way the shell expects it.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}

/// Hand the real terminal to a child process.
pub fn suspend() -> Result<()> {
    restore_terminal()
}

/// Take the terminal back after a child process exits and force a full
/// repaint on the next draw.
pub fn resume(terminal: &mut Tui) -> Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    terminal.clear()?;
    Ok(())
}
