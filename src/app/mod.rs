//! Event loop, window state machine and modal lifecycle.

mod actions;
mod handlers;
mod render;
#[cfg(test)]
mod tests;

use anyhow::Result;
use crossterm::event;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::{
    config::Config,
    events::{FooterState, Session, Window},
    host::{Host, Identity, SystemHost},
    i18n::Translator,
    journal::{self, Unit},
    keys::{self, Event},
    kvfile::{Dialect, KvFile},
    probes::{self, Facts},
    readiness, screens,
    theme::ColorScheme,
    view::{ButtonId, View},
};

use render::draw;

/// Consecutive replays of one key before the chain is broken.
pub const REPLAY_CAP: u8 = 10;
/// Journal line count bounds and step.
pub const MIN_LINES: usize = 200;
pub const MAX_LINES: usize = 10_000;
pub const LINE_STEP: usize = 100;

/// Command-line switches that change controller behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Show the last event and window in the footer.
    pub debug: bool,
    /// `l` on the status screen opens the main menu without a login.
    pub hidden_login: bool,
}

/// How the process should end once the loop stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitRequest {
    Quit,
    /// Replace the process with this command (`reboot`, `poweroff`).
    Exec(Vec<String>),
    /// Restart the console with these variables added to the environment.
    Restart(Vec<(String, String)>),
}

/// Where a key came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    User,
    /// Re-delivered after a modal closed.
    Replay,
}

/// The caller of the open modal, restored on close.
#[derive(Clone, Debug)]
pub struct ModalSlot {
    pub caller: View,
}

/// Log viewer position.
#[derive(Clone, Debug)]
pub struct LogState {
    pub units: Vec<Unit>,
    pub current: usize,
    pub line_count: usize,
    /// Letters typed so far towards the support escape word.
    pub escape: String,
}

/// Controller state shared by input handling and drawing.
pub struct App {
    pub cfg: Config,
    pub tr: Translator,
    pub opts: Options,
    pub identity: Identity,
    pub session: Session,
    pub scheme: ColorScheme,
    /// Console keymap shown in the header.
    pub keyboard: String,
    /// Root widget; the current window is derived from it.
    pub view: View,
    pub modal: Option<ModalSlot>,
    /// View to go back to from the keyboard picker and the log viewer.
    pub return_to: Option<View>,
    pub last_button: Option<ButtonId>,
    pub last_input: String,
    pub logs: LogState,
    pub footer: FooterState,
    /// Main menu cursor kept across actions.
    pub menu_focus: usize,
    pub exit: Option<ExitRequest>,
    key_counter: HashMap<String, u8>,
    replay: Option<String>,
}

impl App {
    pub fn new(cfg: Config, tr: Translator, opts: Options, identity: Identity) -> Self {
        let scheme = ColorScheme::from_name(&cfg.ui.color_scheme).unwrap_or(ColorScheme::Light);
        let line_count = cfg.logs.line_count.clamp(MIN_LINES, MAX_LINES);
        let keyboard = current_keymap(&cfg);
        Self {
            cfg,
            tr,
            opts,
            identity,
            session: Session::default(),
            scheme,
            keyboard,
            view: View::Terminal(String::new()),
            modal: None,
            return_to: None,
            last_button: None,
            last_input: String::new(),
            logs: LogState {
                units: journal::default_units(),
                current: 0,
                line_count,
                escape: String::new(),
            },
            footer: FooterState::default(),
            menu_focus: 0,
            exit: None,
            key_counter: HashMap::new(),
            replay: None,
        }
    }

    /// Load the log sources and paint the status screen.
    pub async fn start<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.logs.units = journal::load_units(host, self.cfg.paths.admin_tool()).await;
        self.open_main(host).await;
        self.tick();
        tracing::info!("console started, {} log units", self.logs.units.len());
    }

    pub fn window(&self) -> Window {
        self.view.window()
    }

    /// Single entry point for terminal input.
    pub async fn handle_event<H: Host + ?Sized>(&mut self, host: &mut H, ev: Event) {
        let Some(key) = ev.normalize() else {
            return;
        };
        self.key_counter.clear();
        self.dispatch(host, key, Origin::User).await;
        while let Some(key) = self.next_replay() {
            self.dispatch(host, key, Origin::Replay).await;
        }
    }

    /// Pending replay key, until that key has been replayed `REPLAY_CAP`
    /// times for the current input event.
    fn next_replay(&mut self) -> Option<String> {
        let key = self.replay.take()?;
        let count = self.key_counter.entry(key.clone()).or_insert(0);
        if *count >= REPLAY_CAP {
            tracing::warn!("replay of {key:?} stopped after {REPLAY_CAP} rounds");
            return None;
        }
        *count += 1;
        Some(key)
    }

    async fn dispatch<H: Host + ?Sized>(&mut self, host: &mut H, key: String, origin: Origin) {
        let window = self.window();
        tracing::debug!("{window}: {key:?} ({origin:?})");
        if self.opts.debug {
            self.footer.debug = format!("{key} @ {window}");
        }
        let res = match handlers::handle_window(self, host, &key, origin).await {
            Ok(false) if origin == Origin::User => handlers::handle_global(self, host, &key).await,
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            tracing::error!("{window}: {e:#}");
            self.footer.error = Some(format!("{e:#}"));
            self.modal = None;
            self.return_to = None;
            self.replay = None;
            self.go_idle(host).await;
        }
    }

    /// Main menu when logged in, status screen otherwise.
    pub async fn go_idle<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.session.authenticated {
            self.open_main_menu();
        } else {
            self.open_main(host).await;
        }
    }

    /// Sample the host and show the status screen.
    pub async fn open_main<H: Host + ?Sized>(&mut self, host: &mut H) {
        let paths = &self.cfg.paths;
        let facts = Facts::collect(&paths.os_release, &paths.hostname);
        let ready = readiness::check(host, paths).await;
        tracing::debug!("readiness bits {:06b}", ready.bits());
        let last = host
            .capture(&["last", "-1", "root"])
            .await
            .and_then(|out| probes::parse_last_login(&out));
        self.view = View::Main(screens::main_view(&self.tr, &facts, ready, last.as_deref()));
    }

    pub fn open_main_menu(&mut self) {
        let mut menu = screens::main_menu(
            &self.tr,
            self.cfg.paths.admin_tool().is_some(),
            self.identity.ppid,
        );
        menu.focus = self.menu_focus.min(menu.items.len().saturating_sub(1));
        self.return_to = None;
        self.view = View::MainMenu(menu);
    }

    /// Mount a modal. A modal opened over another one replaces its contents
    /// and keeps the original caller.
    pub fn open_modal(&mut self, modal: View) {
        if self.modal.is_none() {
            let caller = std::mem::replace(&mut self.view, modal);
            self.modal = Some(ModalSlot { caller });
        } else {
            self.view = modal;
        }
    }

    /// Restore the caller and deliver `key` to it again.
    pub fn close_modal(&mut self, key: &str) {
        if let Some(slot) = self.modal.take() {
            self.view = slot.caller;
            self.replay = Some(key.to_string());
        }
    }

    /// OK-only message box.
    pub fn message(&mut self, title: &str, text: &str) {
        let ok = self.tr.t("OK");
        self.open_modal(View::Message(screens::message_box(
            title,
            text,
            &[(ButtonId::Ok, ok)],
        )));
    }

    /// Refresh the footer clock and load.
    pub fn tick(&mut self) {
        self.footer.clock = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.footer.load = match probes::load_average(&self.cfg.paths.loadavg) {
            Some((a, b, c)) => format!("{}: {a:.2} {b:.2} {c:.2}", self.tr.t("Load")),
            None => String::new(),
        };
    }
}

/// `KEYMAP` from `vconsole.conf`.
pub fn current_keymap(cfg: &Config) -> String {
    KvFile::load_lossy(&cfg.paths.vconsole_conf, Dialect::SHELL)
        .get(None, "KEYMAP")
        .unwrap_or("us")
        .to_string()
}

/// Run the TUI until an exit is requested.
pub async fn run_app(host: &mut SystemHost, app: &mut App) -> Result<ExitRequest> {
    let tick_every = Duration::from_secs(1);
    let mut last_tick = Instant::now();
    loop {
        host.terminal().draw(|f| draw(f, app))?;

        if let Some(req) = app.exit.take() {
            return Ok(req);
        }

        // Short poll keeps the clock responsive.
        if event::poll(Duration::from_millis(50))?
            && let Some(ev) = keys::from_terminal(event::read()?)
        {
            app.handle_event(host, ev).await;
            host.take_fatal()?;
        }

        if last_tick.elapsed() >= tick_every {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
