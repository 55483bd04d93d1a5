//! Window identifiers and the session state shared with the renderer.

use std::fmt;

/// Top-level screen currently on display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Window {
    /// Status screen shown at start.
    Main,
    /// Credential prompt in front of the main menu.
    Login,
    /// Numbered action menu.
    MainMenu,
    /// Modal message with buttons.
    MessageBox,
    /// Modal single-line prompt.
    InputBox,
    /// Root password form.
    Password,
    /// Admin web interface password form.
    AdminWebPw,
    /// NTP server form.
    Timesyncd,
    /// Community/supported repository form.
    RepoSelection,
    /// Console keymap picker.
    KeyboardSwitch,
    /// Per-unit journal viewer.
    LogViewer,
    /// A subprocess owns the terminal.
    Terminal,
    /// Reboot confirmation pending.
    Reboot,
    /// Shutdown confirmation pending.
    Shutdown,
    /// Unfiltered journal for support cases.
    Unsupported,
}

impl Window {
    /// Upper-case tag used in the debug footer and logs.
    pub fn tag(self) -> &'static str {
        match self {
            Window::Main => "MAIN",
            Window::Login => "LOGIN",
            Window::MainMenu => "MAIN_MENU",
            Window::MessageBox => "MESSAGE_BOX",
            Window::InputBox => "INPUT_BOX",
            Window::Password => "PASSWORD",
            Window::AdminWebPw => "ADMIN_WEB_PW",
            Window::Timesyncd => "TIMESYNCD",
            Window::RepoSelection => "REPO_SELECTION",
            Window::KeyboardSwitch => "KEYBOARD_SWITCH",
            Window::LogViewer => "LOG_VIEWER",
            Window::Terminal => "TERMINAL",
            Window::Reboot => "REBOOT",
            Window::Shutdown => "SHUTDOWN",
            Window::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Login state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Whether the main menu may be opened.
    pub authenticated: bool,
    /// Appended to the header title once authenticated.
    pub authorized_options: String,
}

/// Values shown in the footer, refreshed by the one-second tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FooterState {
    /// Wall-clock time.
    pub clock: String,
    /// Load averages.
    pub load: String,
    /// Last event and window, shown with `--debug`.
    pub debug: String,
    /// Last error caught at the dispatch boundary.
    pub error: Option<String>,
}
