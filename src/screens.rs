//! Builders for every window. Builders hold no state: they turn the values
//! handed to them into a fresh [`View`] part each time a window opens.

use std::{fs, path::Path};

use crate::{
    events::{Session, Window},
    i18n::Translator,
    input::EditField,
    probes::{self, Facts},
    readiness::Readiness,
    view::{
        ButtonId, Dialog, FieldId, Group, Item, LogView, MainView, Menu, MenuAction, MenuItem,
        Pane, Radio,
    },
};

/// Keymaps always offered by the picker.
pub const BUILTIN_KEYMAPS: [&str; 2] = ["de-latin1-nodeadkeys", "us"];

/// Header line.
pub fn header_text(tr: &Translator, session: &Session, keyboard: &str) -> String {
    format!(
        "{}{}    {}: {}",
        tr.t("grommunio console"),
        session.authorized_options,
        tr.t("Keyboard"),
        keyboard
    )
}

/// Status screen from sampled facts.
pub fn main_view(
    tr: &Translator,
    facts: &Facts,
    ready: Readiness,
    last_login: Option<&str>,
) -> MainView {
    let mut status = vec![
        format!("{} {}", facts.os_name, facts.os_version).trim().to_string(),
        String::new(),
        format!("{}: {}", tr.t("Hostname"), facts.hostname),
        format!("{}: {}", tr.t("Kernel"), facts.kernel),
        format!(
            "{}: {} ({} {})",
            tr.t("CPU"),
            facts.cpu_model,
            facts.cpu_count,
            tr.t("cores")
        ),
        format!(
            "{}: {} / {}",
            tr.t("Memory"),
            probes::format_bytes(facts.mem_used),
            probes::format_bytes(facts.mem_total)
        ),
        format!(
            "{}: {}",
            tr.t("Boot time"),
            probes::format_timestamp(facts.boot_time)
        ),
        format!(
            "{}: {}",
            tr.t("Last login"),
            last_login.unwrap_or("-")
        ),
        String::new(),
    ];
    if facts.addresses.is_empty() {
        status.push(tr.t("No network addresses configured."));
    } else {
        status.push(format!("{}:", tr.t("Network addresses")));
        for (iface, ip) in &facts.addresses {
            status.push(format!("  {iface:<12} {ip}"));
        }
    }

    let mut tips = ready.complaints(tr);
    if tips.is_empty() {
        tips.push(tr.t("All setup tasks are completed."));
    }
    tips.push(String::new());
    tips.push(tr.t(
        "Press F2 to log in and configure the system, or L to view the logs.",
    ));

    MainView {
        status,
        tips,
        focus: Pane::Top,
    }
}

/// Login form.
pub fn login_dialog(tr: &Translator, user: &str) -> Dialog {
    Dialog::new(
        tr.t("Login"),
        vec![
            Item::Text(tr.t("Log in with the system administrator account.")),
            Item::Divider,
            Item::Edit(FieldId::User, EditField::new(tr.t("Username"), user)),
            Item::Edit(FieldId::Password, EditField::password(tr.t("Password"))),
        ],
        vec![Item::Button(ButtonId::Login, tr.t("Login"))],
    )
    .with_width(50)
}

/// Main menu. The admin password entry is disabled without the admin tool;
/// the exit entry only exists when the console is not the session leader.
pub fn main_menu(tr: &Translator, admin_installed: bool, ppid: i32) -> Menu {
    let items = MenuAction::ALL
        .iter()
        .filter(|a| **a != MenuAction::Exit || ppid != 1)
        .map(|&action| {
            let (label, title, body) = menu_texts(action);
            MenuItem {
                action,
                label: tr.t(label),
                title: tr.t(title),
                body: tr.t(body),
                enabled: action != MenuAction::AdminPassword || admin_installed,
            }
        })
        .collect();
    Menu { items, focus: 0 }
}

fn menu_texts(action: MenuAction) -> (&'static str, &'static str, &'static str) {
    match action {
        MenuAction::Language => (
            "Change system language",
            "System language",
            "Select the language used by the system and by this console. The console restarts when the language changes.",
        ),
        MenuAction::RootPassword => (
            "Change system administrator password",
            "System administrator password",
            "Set the password of the root account, used to log in here and over SSH.",
        ),
        MenuAction::Network => (
            "Network interface configuration",
            "Network",
            "Configure network interfaces, hostname, name servers and routing.",
        ),
        MenuAction::Timezone => (
            "Timezone configuration",
            "Timezone",
            "Select the timezone and adjust the system clock.",
        ),
        MenuAction::Timesync => (
            "timesyncd configuration",
            "Time synchronization",
            "Set the NTP servers used by systemd-timesyncd.",
        ),
        MenuAction::Repository => (
            "Select software repository",
            "Software repository",
            "Switch between the community repository and the supported repository with subscription credentials.",
        ),
        MenuAction::Update => (
            "Update the system",
            "System update",
            "Install all available package updates.",
        ),
        MenuAction::Setup => (
            "grommunio setup wizard",
            "Setup wizard",
            "Run the initial grommunio configuration: database, admin account, TLS certificates and mail domains.",
        ),
        MenuAction::AdminPassword => (
            "Change admin-web password",
            "Admin web interface password",
            "Set the password of the grommunio admin web interface. Requires the admin tools.",
        ),
        MenuAction::Shell => (
            "Terminal",
            "Command line",
            "Open a root shell. Leave it with exit to return here.",
        ),
        MenuAction::Reboot => ("Reboot", "Reboot", "Restart the appliance."),
        MenuAction::Shutdown => ("Shutdown", "Shutdown", "Power off the appliance."),
        MenuAction::Exit => (
            "Exit",
            "Exit",
            "Leave the console and return to the calling shell.",
        ),
    }
}

/// Message box with the given buttons.
pub fn message_box(title: &str, text: &str, buttons: &[(ButtonId, String)]) -> Dialog {
    let body = text.lines().map(|l| Item::Text(l.to_string())).collect();
    let footer = buttons
        .iter()
        .map(|(id, label)| Item::Button(*id, label.clone()))
        .collect();
    Dialog::new(title, body, footer)
}

/// Single-line prompt.
pub fn input_box(tr: &Translator, title: &str, prompt: &str, value: &str) -> Dialog {
    Dialog::new(
        title,
        vec![
            Item::Text(prompt.to_string()),
            Item::Edit(FieldId::Input, EditField::new("", value)),
        ],
        vec![
            Item::Button(ButtonId::Ok, tr.t("OK")),
            Item::Button(ButtonId::Cancel, tr.t("Cancel")),
        ],
    )
}

/// Root or admin web password form.
pub fn password_dialog(tr: &Translator, admin: bool) -> Dialog {
    let (title, intro) = if admin {
        (
            tr.t("Admin web password"),
            tr.t("Enter the new password of the admin web interface twice."),
        )
    } else {
        (
            tr.t("System password"),
            tr.t("Enter the new password of the root account twice."),
        )
    };
    Dialog::new(
        title,
        vec![
            Item::Text(intro),
            Item::Divider,
            Item::Edit(
                FieldId::NewPassword,
                EditField::password(tr.t("New password")),
            ),
            Item::Edit(
                FieldId::ConfirmPassword,
                EditField::password(tr.t("Repeat password")),
            ),
        ],
        vec![
            Item::Button(ButtonId::Ok, tr.t("OK")),
            Item::Button(ButtonId::Cancel, tr.t("Cancel")),
        ],
    )
}

/// NTP server form.
pub fn timesyncd_dialog(tr: &Translator, ntp: &str, fallback: &str) -> Dialog {
    Dialog::new(
        tr.t("Time synchronization"),
        vec![
            Item::Text(tr.t("Space-separated lists of NTP server host names or addresses.")),
            Item::Divider,
            Item::Edit(FieldId::Ntp, EditField::new(tr.t("NTP"), ntp)),
            Item::Edit(
                FieldId::FallbackNtp,
                EditField::new(tr.t("FallbackNTP"), fallback),
            ),
        ],
        vec![
            Item::Button(ButtonId::Ok, tr.t("OK")),
            Item::Button(ButtonId::Cancel, tr.t("Cancel")),
        ],
    )
    .with_width(70)
}

/// Repository selection form.
pub fn repo_dialog(tr: &Translator, supported: bool, user: &str, password: &str) -> Dialog {
    let radio = |value: &str, label: String, checked| {
        Item::Radio(Radio {
            group: Group::Repo,
            value: value.to_string(),
            label,
            checked,
        })
    };
    let mut pw = EditField::password(tr.t("Password"));
    pw.value = password.to_string();
    pw.move_end();
    Dialog::new(
        tr.t("Software repository"),
        vec![
            Item::Text(tr.t("Choose the package source for grommunio.")),
            Item::Divider,
            radio("community", tr.t("Community repository"), !supported),
            radio("supported", tr.t("Supported repository (subscription)"), supported),
            Item::Divider,
            Item::Text(tr.t("Subscription credentials, used by the supported repository:")),
            Item::Edit(FieldId::RepoUser, EditField::new(tr.t("Username"), user)),
            Item::Edit(FieldId::RepoPassword, pw),
        ],
        vec![
            Item::Button(ButtonId::Save, tr.t("Save")),
            Item::Button(ButtonId::Cancel, tr.t("Cancel")),
        ],
    )
    .with_width(70)
}

/// Keymap picker with the current layout checked.
pub fn keyboard_dialog(tr: &Translator, options: &[String], current: &str) -> Dialog {
    let mut body = vec![Item::Text(tr.t("Select the console keyboard layout.")), Item::Divider];
    body.extend(options.iter().map(|k| {
        Item::Radio(Radio {
            group: Group::Keymap,
            value: k.clone(),
            label: k.clone(),
            checked: k == current,
        })
    }));
    let mut d = Dialog::new(
        tr.t("Keyboard layout"),
        body,
        vec![
            Item::Button(ButtonId::Other, tr.t("Other...")),
            Item::Button(ButtonId::Cancel, tr.t("Cancel")),
        ],
    )
    .with_width(40);
    // Start on the layout in use.
    if let Some(idx) = d
        .body
        .iter()
        .position(|i| matches!(i, Item::Radio(r) if r.checked))
    {
        d.body_focus = idx;
    }
    d
}

/// Current keymap, the built-in ones, then every two-letter keymap found
/// under `dir`, without duplicates.
pub fn keymap_options(current: &str, dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect_keymaps(dir, &mut found);
    found.sort();
    let mut candidates = Vec::new();
    if !current.is_empty() {
        candidates.push(current.to_string());
    }
    candidates.extend(BUILTIN_KEYMAPS.iter().map(|k| k.to_string()));
    candidates.extend(found);
    let mut out: Vec<String> = Vec::new();
    for k in candidates {
        if !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

fn collect_keymaps(dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_keymaps(&path, out);
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let stem = name
            .strip_suffix(".map.gz")
            .or_else(|| name.strip_suffix(".map"));
        if let Some(stem) = stem
            && stem.len() == 2
            && stem.chars().all(|c| c.is_ascii_alphabetic())
        {
            out.push(stem.to_string());
        }
    }
}

/// Journal listing titled with the unit and line count.
pub fn log_view(
    tr: &Translator,
    unit_name: &str,
    count: usize,
    lines: Vec<String>,
    unsupported: bool,
) -> LogView {
    LogView {
        title: format!("{}: {} ({} {})", tr.t("Logs"), unit_name, count, tr.t("lines")),
        lines,
        scroll: 0,
        unsupported,
    }
}

/// Key hints for the footer.
pub fn hints(tr: &Translator, window: Window, authenticated: bool) -> String {
    let common = |extra: &str| {
        let mut s = String::from(extra);
        if authenticated {
            s.push_str(&tr.t("  F4=Menu"));
        }
        s.push_str(&tr.t("  F1=Colors  F5=Keyboard  F10=Exit"));
        s
    };
    match window {
        Window::Main => common(&tr.t("F2=Login  Tab=Switch pane  L=Logs")),
        Window::Login => tr.t("Enter=Login  Tab=Next field  Esc=Back  F10=Exit"),
        Window::MainMenu => common(&tr.t("Up/Down=Move  1-9=Select  Enter=Activate  L=Logs")),
        Window::MessageBox | Window::Reboot | Window::Shutdown => {
            tr.t("Enter=Confirm  Tab=Next button  Esc=Close")
        }
        Window::InputBox => tr.t("Enter=Accept  Esc=Cancel"),
        Window::Password
        | Window::AdminWebPw
        | Window::Timesyncd
        | Window::RepoSelection => tr.t("Tab=Next  Enter=Activate  Esc=Cancel"),
        Window::KeyboardSwitch => tr.t("Enter/Space=Select  Tab=Next  Esc=Back"),
        Window::LogViewer | Window::Unsupported => tr.t(
            "Left/Right=Unit  +/-=Lines  PgUp/PgDn=Scroll  Esc=Back",
        ),
        Window::Terminal => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_hides_exit_under_init_and_disables_admin() {
        let tr = Translator::identity();
        let m = main_menu(&tr, false, 1);
        assert_eq!(m.items.len(), 12);
        assert!(m.items.iter().all(|i| i.action != MenuAction::Exit));
        let admin = m
            .items
            .iter()
            .find(|i| i.action == MenuAction::AdminPassword)
            .unwrap();
        assert!(!admin.enabled);
        assert_eq!(main_menu(&tr, true, 4242).items.len(), 13);
    }

    #[test]
    fn keymaps_are_discovered_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("i386/qwertz");
        fs::create_dir_all(&sub).unwrap();
        for f in ["de.map.gz", "de-latin1.map.gz", "fr.map", "README"] {
            fs::write(sub.join(f), "").unwrap();
        }
        fs::write(dir.path().join("us.map.gz"), "").unwrap();
        assert_eq!(
            keymap_options("us", dir.path()),
            vec!["us", "de-latin1-nodeadkeys", "de", "fr"]
        );
        assert_eq!(
            keymap_options("", &dir.path().join("missing")),
            vec!["de-latin1-nodeadkeys", "us"]
        );
    }

    #[test]
    fn keyboard_dialog_focuses_current_layout() {
        let tr = Translator::identity();
        let opts = vec!["us".to_string(), "de".to_string()];
        let d = keyboard_dialog(&tr, &opts, "de");
        assert!(matches!(d.focused(), Some(Item::Radio(r)) if r.value == "de"));
        assert_eq!(d.checked(Group::Keymap), Some("de"));
    }

    #[test]
    fn main_view_lists_complaints() {
        let tr = Translator::identity();
        let v = main_view(&tr, &Facts::default(), Readiness::default(), None);
        assert_eq!(v.tips.len(), 5 + 2);
        let ready = Readiness {
            pw_set: true,
            net_up: true,
            setup_done: true,
            ntp_ok: false,
            http_up: true,
            admin_installed: true,
        };
        let v = main_view(&tr, &Facts::default(), ready, Some("root pts/0"));
        assert_eq!(v.tips[0], "All setup tasks are completed.");
        assert!(v.status.iter().any(|l| l.ends_with("root pts/0")));
    }
}
