//! Menu actions and form submissions.

use std::{fs, path::Path};

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::{
    auth::AuthError,
    config::RepoCfg,
    host::Host,
    i18n::Translator,
    journal,
    kvfile::{Dialect, KvFile},
    screens,
    view::{ButtonId, FieldId, Group, LogView, MenuAction, PowerAction, View},
};

use super::{App, ExitRequest, LINE_STEP, MAX_LINES, MIN_LINES, current_keymap};

/// Letters that open the unfiltered journal from the log viewer.
const ESCAPE_WORD: &str = "unsupported";

/// Mark the session as logged in.
pub fn grant_session(app: &mut App) {
    app.session.authenticated = true;
    app.session.authorized_options = app.tr.t(", <F4> for Main-Menu");
}

/// Check the login form and open the menu on success.
pub async fn login<H: Host + ?Sized>(app: &mut App, host: &mut H) -> Result<()> {
    let View::Login(d) = &app.view else {
        return Ok(());
    };
    let user = d.value(FieldId::User).trim().to_string();
    let password = d.value(FieldId::Password);
    let title = app.tr.t("Login");

    if !app.identity.is_privileged() && user != app.identity.user {
        tracing::warn!("{} tried to log in as {user}", app.identity.user);
        let text = app.tr.t(
            "You are not allowed to log in as another user. Log in with your own account or run the console as root.",
        );
        app.message(&title, &text);
        return Ok(());
    }

    match host.authenticate(&user, &password).await {
        Ok(()) => {
            tracing::info!("{user} logged in");
            if let View::Login(d) = &mut app.view
                && let Some(f) = d.field_mut(FieldId::Password)
            {
                f.clear();
            }
            grant_session(app);
            app.open_main_menu();
        }
        Err(AuthError::Denied) => {
            tracing::warn!("login as {user} refused");
            let text = app.tr.t("Login incorrect. Please check username and password.");
            app.message(&title, &text);
        }
        Err(e) => {
            tracing::error!("login as {user}: {e}");
            let text = format!("{}\n{e}", app.tr.t("Authentication is not available."));
            app.message(&title, &text);
        }
    }
    Ok(())
}

/// Run the action behind a main menu entry.
pub async fn run_menu_action<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    action: MenuAction,
) -> Result<()> {
    let title = match &app.view {
        View::MainMenu(m) => m
            .items
            .get(m.focus)
            .map(|i| i.title.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    match action {
        MenuAction::Language => change_language(app, host, &title).await,
        MenuAction::RootPassword => {
            app.view = View::Password {
                admin: false,
                dialog: screens::password_dialog(&app.tr, false),
            }
        }
        MenuAction::Network => run_terminal(app, host, &["yast2", "lan"], false, &title).await,
        MenuAction::Timezone => {
            run_terminal(app, host, &["yast2", "timezone"], false, &title).await
        }
        MenuAction::Timesync => open_timesyncd(app),
        MenuAction::Repository => open_repo(app),
        MenuAction::Update => run_terminal(app, host, &["zypper", "up"], true, &title).await,
        MenuAction::Setup => match app.cfg.paths.setup_tool() {
            Some(tool) => {
                let tool = tool.to_string_lossy().into_owned();
                run_terminal(app, host, &[tool.as_str()], false, &title).await
            }
            None => {
                let text = app.tr.t("The grommunio setup wizard is not installed.");
                app.message(&title, &text);
            }
        },
        MenuAction::AdminPassword => {
            app.view = View::Password {
                admin: true,
                dialog: screens::password_dialog(&app.tr, true),
            }
        }
        MenuAction::Shell => run_terminal(app, host, &["su", "-l"], false, &title).await,
        MenuAction::Reboot => confirm_power(app, PowerAction::Reboot, &title),
        MenuAction::Shutdown => confirm_power(app, PowerAction::Shutdown, &title),
        MenuAction::Exit => {
            tracing::info!("exit from menu");
            app.exit = Some(ExitRequest::Quit);
        }
    }
    Ok(())
}

/// Hand the terminal to a command and come back to the menu.
async fn run_terminal<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    argv: &[&str],
    wait_enter: bool,
    title: &str,
) {
    app.view = View::Terminal(argv.join(" "));
    let ok = host.run_tty(argv, wait_enter).await;
    app.open_main_menu();
    if !ok {
        let text = format!("{title} {}", app.tr.t("failed"));
        app.message(title, &text);
    }
}

/// Run the language configurator; restart in the new locale when
/// `locale.conf` changed.
async fn change_language<H: Host + ?Sized>(app: &mut App, host: &mut H, title: &str) {
    let path = app.cfg.paths.locale_conf.clone();
    let before = fingerprint(&path);
    app.view = View::Terminal("yast2 language".into());
    let ok = host.run_tty(&["yast2", "language"], false).await;
    let after = fingerprint(&path);
    app.open_main_menu();
    if before != after {
        let env = locale_env(&path);
        tracing::info!("locale changed, restarting with {env:?}");
        app.exit = Some(ExitRequest::Restart(env));
    } else if !ok {
        let text = format!("{title} {}", app.tr.t("failed"));
        app.message(title, &text);
    }
}

/// SHA-256 of a file, `None` when it cannot be read.
pub fn fingerprint(path: &Path) -> Option<[u8; 32]> {
    let data = fs::read(path).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(&data));
    Some(out)
}

/// `KEY=value` pairs of `locale.conf`.
pub fn locale_env(path: &Path) -> Vec<(String, String)> {
    KvFile::load_lossy(path, Dialect::SHELL)
        .entries(None)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn confirm_power(app: &mut App, action: PowerAction, title: &str) {
    let text = match action {
        PowerAction::Reboot => app.tr.t("Do you really want to reboot the system?"),
        PowerAction::Shutdown => app.tr.t("Do you really want to shut down the system?"),
    };
    app.view = View::Power(action);
    let buttons = [
        (ButtonId::Ok, app.tr.t("OK")),
        (ButtonId::Cancel, app.tr.t("Cancel")),
    ];
    app.open_modal(View::Message(screens::message_box(title, &text, &buttons)));
}

/// Result of a password change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwOutcome {
    Success,
    Failed,
    Mismatch,
    Aborted,
}

/// Result sentence for the password forms.
pub fn password_result(tr: &Translator, admin: bool, outcome: PwOutcome) -> String {
    let msgid = match (admin, outcome) {
        (false, PwOutcome::Success) => "System password reset was successful",
        (false, PwOutcome::Failed) => "System password reset failed",
        (false, PwOutcome::Mismatch) => {
            "System password reset failed due to mismatching password values"
        }
        (false, PwOutcome::Aborted) => "System password reset aborted",
        (true, PwOutcome::Success) => "Admin web password reset was successful",
        (true, PwOutcome::Failed) => "Admin web password reset failed",
        (true, PwOutcome::Mismatch) => {
            "Admin web password reset failed due to mismatching password values"
        }
        (true, PwOutcome::Aborted) => "Admin web password reset aborted",
    };
    tr.t(msgid)
}

fn finish_password(app: &mut App, admin: bool, outcome: PwOutcome) {
    tracing::info!("password change (admin: {admin}): {outcome:?}");
    let title = if admin {
        app.tr.t("Admin web password")
    } else {
        app.tr.t("System password")
    };
    let text = password_result(&app.tr, admin, outcome);
    app.open_main_menu();
    app.message(&title, &text);
}

pub fn abort_password(app: &mut App) {
    let admin = matches!(app.view, View::Password { admin: true, .. });
    finish_password(app, admin, PwOutcome::Aborted);
}

/// Compare both entries and hand the password to `passwd` or the admin tool.
pub async fn submit_password<H: Host + ?Sized>(app: &mut App, host: &mut H) -> Result<()> {
    let View::Password { admin, dialog } = &app.view else {
        return Ok(());
    };
    let admin = *admin;
    let first = dialog.value(FieldId::NewPassword);
    let second = dialog.value(FieldId::ConfirmPassword);

    let outcome = if first != second {
        PwOutcome::Mismatch
    } else if first.is_empty() {
        PwOutcome::Failed
    } else if admin {
        match app.cfg.paths.admin_tool() {
            Some(tool) => {
                let tool = tool.to_string_lossy().into_owned();
                if host
                    .run_quiet(&[tool.as_str(), "passwd", "--password", first.as_str()], None)
                    .await
                {
                    PwOutcome::Success
                } else {
                    PwOutcome::Failed
                }
            }
            None => PwOutcome::Failed,
        }
    } else {
        let input = format!("{first}\n{first}\n");
        if host.run_quiet(&["passwd"], Some(&input)).await {
            PwOutcome::Success
        } else {
            PwOutcome::Failed
        }
    };
    finish_password(app, admin, outcome);
    Ok(())
}

/// Timesync form filled from `timesyncd.conf`.
pub fn open_timesyncd(app: &mut App) {
    let f = KvFile::load_lossy(&app.cfg.paths.timesyncd_conf, Dialect::INI);
    let ntp = f.get(Some("Time"), "NTP").unwrap_or_default();
    let fallback = f.get(Some("Time"), "FallbackNTP").unwrap_or_default();
    app.view = View::Timesyncd(screens::timesyncd_dialog(&app.tr, ntp, fallback));
}

/// Write the NTP servers and enable synchronization.
pub async fn save_timesyncd<H: Host + ?Sized>(app: &mut App, host: &mut H) -> Result<()> {
    let View::Timesyncd(d) = &app.view else {
        return Ok(());
    };
    let ntp = d.value(FieldId::Ntp).trim().to_string();
    let fallback = d.value(FieldId::FallbackNtp).trim().to_string();
    let path = app.cfg.paths.timesyncd_conf.clone();

    let written = KvFile::load(&path, Dialect::INI).and_then(|mut f| {
        // An absent key reads as empty; only edited values are written.
        for (key, value) in [("NTP", &ntp), ("FallbackNTP", &fallback)] {
            if f.get(Some("Time"), key).unwrap_or_default() != value.as_str() {
                f.set(Some("Time"), key, value);
            }
        }
        f.save(&path)
    });
    let ok = match written {
        Ok(_) => {
            host.run_quiet(&["timedatectl", "set-ntp", "true"], None)
                .await
        }
        Err(e) => {
            tracing::error!("saving timesyncd settings: {e:#}");
            false
        }
    };
    let title = app.tr.t("Time synchronization");
    let text = if ok {
        app.tr.t("Timesyncd configuration was successful")
    } else {
        app.tr.t("Timesyncd configuration failed")
    };
    app.open_main_menu();
    app.message(&title, &text);
    Ok(())
}

/// Repository selection read back from an existing `baseurl`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepoChoice {
    pub supported: bool,
    pub user: String,
    pub password: String,
}

/// Read the current selection from the repo file.
pub fn read_repo(path: &Path, cfg: &RepoCfg) -> RepoChoice {
    let f = KvFile::load_lossy(path, Dialect::INI);
    parse_baseurl(
        f.get(Some(&cfg.section), "baseurl").unwrap_or_default(),
        &cfg.supported_location,
    )
}

/// `https://<user>:<password>@<supported location>` means the supported
/// repository; anything else is treated as community.
pub fn parse_baseurl(url: &str, supported_location: &str) -> RepoChoice {
    if let Some(rest) = url.strip_prefix("https://")
        && let Some((userinfo, location)) = rest.split_once('@')
        && location == supported_location
    {
        let (user, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));
        return RepoChoice {
            supported: true,
            user: decode(user),
            password: decode(password),
        };
    }
    RepoChoice::default()
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Base URL of the supported repository with the credentials embedded.
pub fn supported_baseurl(user: &str, password: &str, location: &str) -> String {
    format!(
        "https://{}:{}@{location}",
        urlencoding::encode(user),
        urlencoding::encode(password)
    )
}

pub fn open_repo(app: &mut App) {
    let choice = read_repo(&app.cfg.paths.repo_file, &app.cfg.repo);
    app.view = View::Repo(screens::repo_dialog(
        &app.tr,
        choice.supported,
        &choice.user,
        &choice.password,
    ));
}

/// Validate, write the repo file, then import the key and refresh.
pub async fn save_repo<H: Host + ?Sized>(app: &mut App, host: &mut H) -> Result<()> {
    let View::Repo(d) = &app.view else {
        return Ok(());
    };
    let supported = d.checked(Group::Repo) == Some("supported");
    let user = d.value(FieldId::RepoUser).trim().to_string();
    let password = d.value(FieldId::RepoPassword);
    let repo = app.cfg.repo.clone();
    let title = app.tr.t("Software repository");

    let baseurl = if supported {
        let probe = host
            .http_get(&repo.probe_url, Some((user.as_str(), password.as_str())))
            .await;
        match probe {
            Ok(r) if r.status == 200 => {}
            Ok(r) => {
                tracing::warn!("credential probe answered {}", r.status);
                bad_credentials(app, &title);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("credential probe failed: {e:#}");
                bad_credentials(app, &title);
                return Ok(());
            }
        }
        supported_baseurl(&user, &password, &repo.supported_location)
    } else {
        repo.community_url.clone()
    };

    let path = app.cfg.paths.repo_file.clone();
    let written = KvFile::load(&path, Dialect::INI).and_then(|mut f| {
        let section = Some(repo.section.as_str());
        if f.get(section, "name").is_none() {
            f.set(section, "name", &repo.section);
        }
        f.set(section, "baseurl", &baseurl);
        f.set(section, "enabled", "1");
        f.set(section, "autorefresh", "1");
        f.set(section, "type", "rpm-md");
        f.save(&path)
    });
    match written {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("repository configuration unchanged");
            let text = app.tr.t("The repository configuration is unchanged.");
            app.open_main_menu();
            app.message(&title, &text);
            return Ok(());
        }
        Err(e) => {
            tracing::error!("writing repo file: {e:#}");
            let text = format!(
                "{} {}",
                app.tr.t("Switching the repository failed while"),
                app.tr.t("writing the repository file")
            );
            app.open_main_menu();
            app.message(&title, &text);
            return Ok(());
        }
    }

    let key_tmp = app.cfg.paths.gpg_key_tmp.clone();
    let result = import_and_refresh(host, &app.tr, &repo, &key_tmp, &title).await;
    let text = match result {
        Ok(()) => app.tr.t("The software repository was switched successfully."),
        Err(step) => format!(
            "{} {step}",
            app.tr.t("Switching the repository failed while")
        ),
    };
    app.open_main_menu();
    app.message(&title, &text);
    Ok(())
}

fn bad_credentials(app: &mut App, title: &str) {
    let text = app
        .tr
        .t("Please check the credentials for the supported repository.");
    app.message(title, &text);
}

/// Signing key import and metadata refresh with progress. The error names
/// the failed step.
async fn import_and_refresh<H: Host + ?Sized>(
    host: &mut H,
    tr: &Translator,
    repo: &RepoCfg,
    key_tmp: &Path,
    title: &str,
) -> Result<(), String> {
    host.show_progress(title, 20);
    let key = match host.http_get(&repo.gpg_key_url, None).await {
        Ok(r) if r.status == 200 => r.body,
        Ok(r) => {
            tracing::error!("signing key download answered {}", r.status);
            return Err(tr.t("downloading the signing key"));
        }
        Err(e) => {
            tracing::error!("signing key download: {e:#}");
            return Err(tr.t("downloading the signing key"));
        }
    };
    host.show_progress(title, 30);
    if let Err(e) = fs::write(key_tmp, &key) {
        tracing::error!("writing {}: {e}", key_tmp.display());
        return Err(tr.t("writing the signing key"));
    }
    host.show_progress(title, 40);
    let key_path = key_tmp.to_string_lossy();
    if !host
        .run_quiet(&["rpm", "--import", key_path.as_ref()], None)
        .await
    {
        return Err(tr.t("importing the signing key"));
    }
    host.show_progress(title, 60);
    if !host
        .run_quiet(&["zypper", "--non-interactive", "refresh"], None)
        .await
    {
        return Err(tr.t("refreshing the repositories"));
    }
    host.show_progress(title, 100);
    Ok(())
}

/// Open the keymap picker over the current window.
pub fn open_keyboard(app: &mut App) {
    app.keyboard = current_keymap(&app.cfg);
    let options = screens::keymap_options(&app.keyboard, &app.cfg.paths.keymaps_dir);
    let dialog = screens::keyboard_dialog(&app.tr, &options, &app.keyboard);
    let previous = std::mem::replace(&mut app.view, View::Keyboard(dialog));
    app.return_to = Some(previous);
}

/// Prompt for a keymap that is not in the list.
pub fn ask_keymap(app: &mut App) {
    let title = app.tr.t("Keyboard layout");
    let prompt = app.tr.t("Name of the console keymap:");
    app.last_input.clear();
    app.open_modal(View::Input(screens::input_box(&app.tr, &title, &prompt, "")));
}

/// Persist and load a console keymap, then go back to where the picker was
/// opened.
pub async fn apply_keymap<H: Host + ?Sized>(app: &mut App, host: &mut H, keymap: &str) -> Result<()> {
    let path = app.cfg.paths.vconsole_conf.clone();
    let written = KvFile::load(&path, Dialect::SHELL).and_then(|mut f| {
        f.set(None, "KEYMAP", keymap);
        f.save(&path)
    });
    let ok = match written {
        Ok(_) => {
            app.keyboard = keymap.to_string();
            tracing::info!("keymap set to {keymap}");
            host.run_quiet(&["systemctl", "restart", "systemd-vconsole-setup"], None)
                .await
        }
        Err(e) => {
            tracing::error!("writing keymap: {e:#}");
            false
        }
    };
    leave_overlay(app, host).await;
    if !ok {
        let title = app.tr.t("Keyboard layout");
        let text = app.tr.t("Applying the keyboard layout failed.");
        app.message(&title, &text);
    }
    Ok(())
}

/// Close the keyboard picker or log viewer.
pub async fn leave_overlay<H: Host + ?Sized>(app: &mut App, host: &mut H) {
    app.logs.escape.clear();
    match app.return_to.take() {
        Some(view) => app.view = view,
        None => app.go_idle(host).await,
    }
}

/// Open the log viewer on the current unit.
pub async fn open_logs<H: Host + ?Sized>(app: &mut App, host: &mut H) {
    app.logs.escape.clear();
    let view = load_log_view(app, host, false).await;
    let previous = std::mem::replace(&mut app.view, View::Logs(view));
    app.return_to = Some(previous);
}

async fn load_log_view<H: Host + ?Sized>(app: &App, host: &mut H, unsupported: bool) -> LogView {
    let unit = if unsupported {
        None
    } else {
        app.logs.units.get(app.logs.current)
    };
    let (name, filter) = match unit {
        Some(u) => (u.name.as_str(), Some(u.unit.as_str())),
        None => ("syslog", None),
    };
    let count = app.logs.line_count;
    let lines = journal::read(host, filter, count, &app.cfg.logs.format).await;
    screens::log_view(&app.tr, name, count, lines, unsupported)
}

async fn reload_logs<H: Host + ?Sized>(app: &mut App, host: &mut H) {
    let unsupported = matches!(&app.view, View::Logs(l) if l.unsupported);
    let view = load_log_view(app, host, unsupported).await;
    app.view = View::Logs(view);
}

/// Step to the previous or next unit; clamped at both ends.
pub async fn switch_unit<H: Host + ?Sized>(app: &mut App, host: &mut H, delta: isize) {
    if matches!(&app.view, View::Logs(l) if l.unsupported) {
        return;
    }
    let next = app.logs.current.checked_add_signed(delta);
    if let Some(next) = next
        && next < app.logs.units.len()
        && next != app.logs.current
    {
        app.logs.current = next;
        reload_logs(app, host).await;
    }
}

/// Show more or fewer journal lines within the allowed range.
pub async fn adjust_lines<H: Host + ?Sized>(app: &mut App, host: &mut H, more: bool) {
    let count = app.logs.line_count;
    let next = if more {
        (count + LINE_STEP).min(MAX_LINES)
    } else {
        count.saturating_sub(LINE_STEP).max(MIN_LINES)
    };
    if next != count {
        app.logs.line_count = next;
        reload_logs(app, host).await;
    }
}

/// Track letters typed in the log viewer; the full escape word switches to
/// the unfiltered journal. Returns whether the letter was used up.
pub async fn feed_escape<H: Host + ?Sized>(app: &mut App, host: &mut H, c: char) -> Result<bool> {
    let buf = &mut app.logs.escape;
    buf.push(c);
    if !ESCAPE_WORD.starts_with(buf.as_str()) {
        buf.clear();
        if ESCAPE_WORD.starts_with(c) {
            buf.push(c);
        }
    }
    if buf.as_str() != ESCAPE_WORD {
        return Ok(false);
    }
    buf.clear();
    tracing::info!("switching to the unfiltered journal");
    let view = load_log_view(app, host, true).await;
    app.view = View::Logs(view);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: &str = "download.grommunio.com/supported/openSUSE_Leap_15.3/?ssl_verify=no";

    #[test]
    fn supported_url_carries_encoded_credentials() {
        let url = supported_baseurl("me@corp", "p:w/d", LOCATION);
        assert_eq!(url, format!("https://me%40corp:p%3Aw%2Fd@{LOCATION}"));
        assert_eq!(
            parse_baseurl(&url, LOCATION),
            RepoChoice {
                supported: true,
                user: "me@corp".into(),
                password: "p:w/d".into(),
            }
        );
    }

    #[test]
    fn other_urls_are_community() {
        let community = "https://download.grommunio.com/community/openSUSE_Leap_15.3/?ssl_verify=no";
        assert_eq!(parse_baseurl(community, LOCATION), RepoChoice::default());
        assert_eq!(parse_baseurl("", LOCATION), RepoChoice::default());
    }

    #[test]
    fn locale_fingerprint_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locale.conf");
        assert_eq!(fingerprint(&path), None);
        fs::write(&path, "LANG=en_US.UTF-8\n").unwrap();
        let a = fingerprint(&path);
        fs::write(&path, "LANG=\"de_DE.UTF-8\"\nLC_TIME=C\n").unwrap();
        assert_ne!(a, fingerprint(&path));
        assert_eq!(
            locale_env(&path),
            vec![
                ("LANG".to_string(), "de_DE.UTF-8".to_string()),
                ("LC_TIME".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn password_messages() {
        let tr = Translator::identity();
        assert_eq!(
            password_result(&tr, false, PwOutcome::Mismatch),
            "System password reset failed due to mismatching password values"
        );
        assert_eq!(
            password_result(&tr, true, PwOutcome::Success),
            "Admin web password reset was successful"
        );
    }
}
