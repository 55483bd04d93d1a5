//! Widget model mounted at the root of the screen.
//!
//! A [`View`] is plain data: the renderer draws it and the controller mutates
//! it. The window identifier is derived from the mounted view, so the two can
//! never disagree.

use crate::{events::Window, input::EditField};

/// Direction of a focus move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {
    Forward,
    Backward,
}

/// Focus region of a dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Body,
    Footer,
}

impl Region {
    fn other(self) -> Self {
        match self {
            Region::Body => Region::Footer,
            Region::Footer => Region::Body,
        }
    }
}

/// Button identity, independent of the translated label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonId {
    Ok,
    Cancel,
    Login,
    Save,
    Other,
}

/// Identity of an edit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldId {
    User,
    Password,
    NewPassword,
    ConfirmPassword,
    Ntp,
    FallbackNtp,
    RepoUser,
    RepoPassword,
    Input,
}

/// Radio group identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Repo,
    Keymap,
}

/// One option of a radio group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Radio {
    pub group: Group,
    pub value: String,
    pub label: String,
    pub checked: bool,
}

/// Dialog child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Text(String),
    Divider,
    Edit(FieldId, EditField),
    Radio(Radio),
    Button(ButtonId, String),
}

impl Item {
    /// Whether focus may rest on this child.
    pub fn selectable(&self) -> bool {
        matches!(self, Item::Edit(..) | Item::Radio(_) | Item::Button(..))
    }
}

/// Framed form: body children above a row of buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub body: Vec<Item>,
    pub footer: Vec<Item>,
    pub region: Region,
    pub body_focus: usize,
    pub footer_focus: usize,
    /// Preferred width in columns.
    pub width: u16,
}

impl Dialog {
    /// Build a dialog focused on the first selectable body child, or the
    /// first button when the body has none.
    pub fn new(title: impl Into<String>, body: Vec<Item>, footer: Vec<Item>) -> Self {
        let body_first = edge(&body, Dir::Forward);
        let footer_first = edge(&footer, Dir::Forward);
        Self {
            title: title.into(),
            region: if body_first.is_some() || footer_first.is_none() {
                Region::Body
            } else {
                Region::Footer
            },
            body_focus: body_first.unwrap_or(0),
            footer_focus: footer_first.unwrap_or(0),
            body,
            footer,
            width: 60,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    fn items(&self, region: Region) -> &[Item] {
        match region {
            Region::Body => &self.body,
            Region::Footer => &self.footer,
        }
    }

    fn focus_of(&self, region: Region) -> usize {
        match region {
            Region::Body => self.body_focus,
            Region::Footer => self.footer_focus,
        }
    }

    fn set_focus(&mut self, region: Region, idx: usize) {
        self.region = region;
        match region {
            Region::Body => self.body_focus = idx,
            Region::Footer => self.footer_focus = idx,
        }
    }

    /// Child holding focus, if it is selectable.
    pub fn focused(&self) -> Option<&Item> {
        self.items(self.region)
            .get(self.focus_of(self.region))
            .filter(|i| i.selectable())
    }

    fn focused_mut(&mut self) -> Option<&mut Item> {
        let idx = self.focus_of(self.region);
        let items = match self.region {
            Region::Body => &mut self.body,
            Region::Footer => &mut self.footer,
        };
        items.get_mut(idx).filter(|i| i.selectable())
    }

    /// Whether `(region, index)` is the focused child.
    pub fn is_focused(&self, region: Region, idx: usize) -> bool {
        self.region == region && self.focus_of(region) == idx
    }

    /// Move focus to the next selectable child in `dir`. At the last
    /// selectable of a region focus flips to the other region; a region
    /// without selectables is skipped.
    pub fn tab(&mut self, dir: Dir) {
        let region = self.region;
        let items = self.items(region);
        if let Some(next) = step(items, self.focus_of(region), dir) {
            self.set_focus(region, next);
            return;
        }
        let other = region.other();
        if let Some(idx) = edge(self.items(other), dir) {
            self.set_focus(other, idx);
        } else if let Some(idx) = edge(self.items(region), dir) {
            self.set_focus(region, idx);
        }
    }

    /// Focus the given button.
    pub fn focus_button(&mut self, id: ButtonId) {
        if let Some(idx) = self
            .footer
            .iter()
            .position(|i| matches!(i, Item::Button(b, _) if *b == id))
        {
            self.set_focus(Region::Footer, idx);
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&EditField> {
        self.body.iter().find_map(|i| match i {
            Item::Edit(f, e) if *f == id => Some(e),
            _ => None,
        })
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut EditField> {
        self.body.iter_mut().find_map(|i| match i {
            Item::Edit(f, e) if *f == id => Some(e),
            _ => None,
        })
    }

    /// Current value of a field, empty when absent.
    pub fn value(&self, id: FieldId) -> String {
        self.field(id).map(|f| f.value.clone()).unwrap_or_default()
    }

    /// Focused button, if focus is on one.
    pub fn focused_button(&self) -> Option<ButtonId> {
        match self.focused() {
            Some(Item::Button(id, _)) => Some(*id),
            _ => None,
        }
    }

    /// Feed an editing key to the focused field.
    pub fn edit(&mut self, key: &str) -> bool {
        match self.focused_mut() {
            Some(Item::Edit(_, field)) => field.handle_key(key),
            _ => false,
        }
    }

    /// Check the focused radio option and uncheck the rest of its group.
    /// Returns the selected value.
    pub fn check_focused_radio(&mut self) -> Option<String> {
        let (group, value) = match self.focused() {
            Some(Item::Radio(r)) => (r.group, r.value.clone()),
            _ => return None,
        };
        let idx = self.body_focus;
        for (i, item) in self.body.iter_mut().enumerate() {
            if let Item::Radio(r) = item
                && r.group == group
            {
                r.checked = i == idx;
            }
        }
        Some(value)
    }

    /// Value of the checked option of a group.
    pub fn checked(&self, group: Group) -> Option<&str> {
        self.body.iter().find_map(|i| match i {
            Item::Radio(r) if r.group == group && r.checked => Some(r.value.as_str()),
            _ => None,
        })
    }

    /// Number of selectable children in both regions.
    #[cfg(test)]
    pub fn selectable_count(&self) -> usize {
        self.body
            .iter()
            .chain(self.footer.iter())
            .filter(|i| i.selectable())
            .count()
    }
}

/// Next selectable index after `from` in `dir`.
fn step(items: &[Item], from: usize, dir: Dir) -> Option<usize> {
    match dir {
        Dir::Forward => (from + 1..items.len()).find(|&i| items[i].selectable()),
        Dir::Backward => (0..from.min(items.len())).rev().find(|&i| items[i].selectable()),
    }
}

/// First selectable index when entering a region moving in `dir`.
fn edge(items: &[Item], dir: Dir) -> Option<usize> {
    match dir {
        Dir::Forward => items.iter().position(Item::selectable),
        Dir::Backward => items.iter().rposition(Item::selectable),
    }
}

/// Main menu entries in ordinal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Language,
    RootPassword,
    Network,
    Timezone,
    Timesync,
    Repository,
    Update,
    Setup,
    AdminPassword,
    Shell,
    Reboot,
    Shutdown,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 13] = [
        MenuAction::Language,
        MenuAction::RootPassword,
        MenuAction::Network,
        MenuAction::Timezone,
        MenuAction::Timesync,
        MenuAction::Repository,
        MenuAction::Update,
        MenuAction::Setup,
        MenuAction::AdminPassword,
        MenuAction::Shell,
        MenuAction::Reboot,
        MenuAction::Shutdown,
        MenuAction::Exit,
    ];

    /// 1-based position in the menu.
    pub fn ordinal(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0) + 1
    }
}

/// One main menu row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
    pub title: String,
    pub body: String,
    pub enabled: bool,
}

/// Main menu with a clamped cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
    pub focus: usize,
}

impl Menu {
    pub fn up(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.focus + 1 < self.items.len() {
            self.focus += 1;
        }
    }

    /// Focus the entry at 1-based position `n`, if present.
    pub fn select(&mut self, n: usize) -> bool {
        if (1..=self.items.len()).contains(&n) {
            self.focus = n - 1;
            true
        } else {
            false
        }
    }

    /// Action of the focused entry, `None` when it is disabled.
    pub fn activate(&self) -> Option<MenuAction> {
        self.items
            .get(self.focus)
            .filter(|i| i.enabled)
            .map(|i| i.action)
    }
}

/// Pane of the status screen holding focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Top,
    Bottom,
}

/// Status screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainView {
    /// System facts.
    pub status: Vec<String>,
    /// Outstanding setup tasks and usage hints.
    pub tips: Vec<String>,
    pub focus: Pane,
}

impl MainView {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Top => Pane::Bottom,
            Pane::Bottom => Pane::Top,
        };
    }
}

/// Journal listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogView {
    pub title: String,
    pub lines: Vec<String>,
    /// Lines scrolled up from the bottom.
    pub scroll: usize,
    /// Support view over the unfiltered journal.
    pub unsupported: bool,
}

impl LogView {
    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }
}

/// Power action awaiting confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerAction {
    Reboot,
    Shutdown,
}

impl PowerAction {
    pub fn command(self) -> &'static str {
        match self {
            PowerAction::Reboot => "reboot",
            PowerAction::Shutdown => "poweroff",
        }
    }
}

/// Root widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Main(MainView),
    Login(Dialog),
    MainMenu(Menu),
    Message(Dialog),
    Input(Dialog),
    /// Root password (`admin == false`) or admin web password form.
    Password { admin: bool, dialog: Dialog },
    Timesyncd(Dialog),
    Repo(Dialog),
    Keyboard(Dialog),
    Logs(LogView),
    Power(PowerAction),
    /// Command line of the running subprocess.
    Terminal(String),
}

impl View {
    /// Window identifier of this view.
    pub fn window(&self) -> Window {
        match self {
            View::Main(_) => Window::Main,
            View::Login(_) => Window::Login,
            View::MainMenu(_) => Window::MainMenu,
            View::Message(_) => Window::MessageBox,
            View::Input(_) => Window::InputBox,
            View::Password { admin: false, .. } => Window::Password,
            View::Password { admin: true, .. } => Window::AdminWebPw,
            View::Timesyncd(_) => Window::Timesyncd,
            View::Repo(_) => Window::RepoSelection,
            View::Keyboard(_) => Window::KeyboardSwitch,
            View::Logs(l) if l.unsupported => Window::Unsupported,
            View::Logs(_) => Window::LogViewer,
            View::Power(PowerAction::Reboot) => Window::Reboot,
            View::Power(PowerAction::Shutdown) => Window::Shutdown,
            View::Terminal(_) => Window::Terminal,
        }
    }
}
