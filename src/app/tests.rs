use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use super::*;
use crate::{
    auth::AuthError,
    host::HttpReply,
    keys::MousePhase,
    view::{FieldId, Item, MenuAction, Pane},
};

/// Host that records every side effect instead of performing it.
struct FakeHost {
    password: String,
    http_status: u16,
    quiet_ok: bool,
    tty_ok: bool,
    journal: String,
    /// File written while a terminal command runs, like `yast2 language`.
    tty_writes: Option<(PathBuf, String)>,
    identity: Identity,
    tty: Vec<String>,
    quiet: Vec<(String, Option<String>)>,
    captures: Vec<String>,
    http: Vec<(String, Option<(String, String)>)>,
    auth: Vec<(String, String)>,
    progress: Vec<u16>,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            password: "secret".into(),
            http_status: 200,
            quiet_ok: true,
            tty_ok: true,
            journal: concat!(
                r#"{"PRIORITY":"6","SYSLOG_IDENTIFIER":"nginx","MESSAGE":"started"}"#,
                "\n"
            )
            .into(),
            tty_writes: None,
            identity: Identity {
                uid: 0,
                egid: 0,
                user: "root".into(),
                ppid: 4242,
            },
            tty: Vec::new(),
            quiet: Vec::new(),
            captures: Vec::new(),
            http: Vec::new(),
            auth: Vec::new(),
            progress: Vec::new(),
        }
    }

    fn quiet_commands(&self) -> Vec<&str> {
        self.quiet.iter().map(|(c, _)| c.as_str()).collect()
    }

    fn journal_reads(&self) -> Vec<&String> {
        self.captures
            .iter()
            .filter(|c| c.starts_with("journalctl"))
            .collect()
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn run_tty(&mut self, argv: &[&str], _wait_enter: bool) -> bool {
        self.tty.push(argv.join(" "));
        if let Some((path, text)) = self.tty_writes.take() {
            fs::write(path, text).unwrap();
        }
        self.tty_ok
    }

    async fn run_quiet(&mut self, argv: &[&str], stdin: Option<&str>) -> bool {
        self.quiet.push((argv.join(" "), stdin.map(str::to_string)));
        self.quiet_ok
    }

    async fn capture(&mut self, argv: &[&str]) -> Option<String> {
        self.captures.push(argv.join(" "));
        (argv[0] == "journalctl").then(|| self.journal.clone())
    }

    async fn authenticate(&mut self, user: &str, password: &str) -> Result<(), AuthError> {
        self.auth.push((user.into(), password.into()));
        if user == "root" && password == self.password {
            Ok(())
        } else {
            Err(AuthError::Denied)
        }
    }

    async fn http_get(&mut self, url: &str, basic_auth: Option<(&str, &str)>) -> Result<HttpReply> {
        self.http.push((
            url.into(),
            basic_auth.map(|(u, p)| (u.to_string(), p.to_string())),
        ));
        Ok(HttpReply {
            status: self.http_status,
            body: b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n".to_vec(),
        })
    }

    async fn port_open(&mut self, _port: u16) -> bool {
        false
    }

    fn show_progress(&mut self, _title: &str, percent: u16) {
        self.progress.push(percent);
    }

    fn identity(&self) -> Identity {
        self.identity.clone()
    }
}

struct Fixture {
    dir: TempDir,
    app: App,
    host: FakeHost,
}

impl Fixture {
    async fn new(root_password: bool, opts: Options) -> Self {
        Self::with_host(root_password, opts, FakeHost::new()).await
    }

    async fn with_host(root_password: bool, opts: Options, mut host: FakeHost) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let p = |name: &str| dir.path().join(name);
        let hash = if root_password { "$6$salt$hash" } else { "" };
        fs::write(p("shadow"), format!("root:{hash}:19000:0:99999:7:::\n")).unwrap();
        fs::write(p("vconsole.conf"), "# console\nKEYMAP=us\nFONT=eurlatgr\n").unwrap();
        fs::write(
            p("timesyncd.conf"),
            "# timesyncd\n[Time]\nNTP=old.example\nFallbackNTP=fb.example\n#RootDistanceMaxSec=5\n",
        )
        .unwrap();
        fs::write(p("os-release"), "NAME=\"openSUSE Leap\"\nVERSION=\"15.3\"\n").unwrap();
        fs::write(p("hostname"), "mail.example\n").unwrap();
        fs::write(p("loadavg"), "0.10 0.20 0.30 1/100 42\n").unwrap();
        fs::write(p("locale.conf"), "LANG=en_US.UTF-8\n").unwrap();

        let mut cfg = Config::default();
        cfg.paths.shadow = p("shadow");
        cfg.paths.vconsole_conf = p("vconsole.conf");
        cfg.paths.timesyncd_conf = p("timesyncd.conf");
        cfg.paths.os_release = p("os-release");
        cfg.paths.hostname = p("hostname");
        cfg.paths.loadavg = p("loadavg");
        cfg.paths.locale_conf = p("locale.conf");
        cfg.paths.repo_file = p("grommunio.repo");
        cfg.paths.gpg_key_tmp = p("gpg-key");
        cfg.paths.keymaps_dir = p("keymaps");
        cfg.paths.setup_done = vec![p("setup_done")];
        cfg.paths.admin_tool = vec![];
        cfg.paths.setup_tool = vec![];

        let mut app = App::new(cfg, Translator::identity(), opts, host.identity());
        app.start(&mut host).await;
        Self { dir, app, host }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    async fn press(&mut self, key: &str) {
        self.app.handle_event(&mut self.host, Event::key(key)).await;
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            let key = if c == ' ' { "space".to_string() } else { c.to_string() };
            self.press(&key).await;
        }
    }

    /// Open the main menu; root has no password in these fixtures.
    async fn enter_menu(&mut self) {
        self.press("f2").await;
        assert_eq!(self.app.window(), Window::MainMenu);
    }

    fn message_text(&self) -> String {
        match &self.app.view {
            View::Message(d) => d
                .body
                .iter()
                .filter_map(|i| match i {
                    Item::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            other => panic!("no message box on screen: {:?}", other.window()),
        }
    }

    fn caller_window(&self) -> Option<Window> {
        self.app.modal.as_ref().map(|m| m.caller.window())
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn starts_on_status_screen_with_readiness_hints() {
    let fx = Fixture::new(true, Options::default()).await;
    assert_eq!(fx.app.window(), Window::Main);
    let View::Main(m) = &fx.app.view else {
        panic!("status screen expected");
    };
    assert!(m.status.iter().any(|l| l.contains("mail.example")));
    assert!(
        m.tips
            .iter()
            .any(|t| t.contains("not listening on port 22"))
    );
    assert!(!fx.app.footer.clock.is_empty());
    assert!(fx.app.footer.load.contains("0.10"));
    assert!(fx.host.captures.iter().any(|c| c == "last -1 root"));
}

#[tokio::test]
async fn login_success_opens_menu() {
    let mut fx = Fixture::new(true, Options::default()).await;
    fx.press("f2").await;
    assert_eq!(fx.app.window(), Window::Login);

    fx.press("tab").await;
    fx.type_text("secret").await;
    fx.press("enter").await;

    assert_eq!(fx.app.window(), Window::MainMenu);
    assert!(fx.app.session.authenticated);
    assert_eq!(fx.host.auth, vec![("root".to_string(), "secret".to_string())]);
    let header = screens::header_text(&fx.app.tr, &fx.app.session, &fx.app.keyboard);
    assert!(header.contains("<F4> for Main-Menu"));
}

#[tokio::test]
async fn login_failure_keeps_the_form() {
    let mut fx = Fixture::new(true, Options::default()).await;
    fx.press("f2").await;
    fx.press("tab").await;
    fx.type_text("wrong").await;
    fx.press("enter").await;

    assert_eq!(fx.app.window(), Window::MessageBox);
    assert_eq!(fx.caller_window(), Some(Window::Login));
    assert!(fx.message_text().contains("Login incorrect"));

    fx.press("enter").await;
    assert_eq!(fx.app.window(), Window::Login);
    assert!(!fx.app.session.authenticated);
    let View::Login(d) = &fx.app.view else {
        panic!("login form expected");
    };
    assert_eq!(d.value(FieldId::Password), "wrong");
}

#[tokio::test]
async fn unprivileged_user_cannot_log_in_as_root() {
    let mut host = FakeHost::new();
    host.identity = Identity {
        uid: 1000,
        egid: 100,
        user: "alice".into(),
        ppid: 4242,
    };
    let mut fx = Fixture::with_host(true, Options::default(), host).await;
    fx.press("f2").await;
    fx.press("tab").await;
    fx.type_text("secret").await;
    fx.press("enter").await;

    assert!(fx.host.auth.is_empty());
    assert!(fx.message_text().contains("not allowed"));
}

#[tokio::test]
async fn no_root_password_skips_login() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    assert!(fx.app.session.authenticated);
    assert!(fx.host.auth.is_empty());
}

#[tokio::test]
async fn unreadable_shadow_requires_login() {
    let mut host = FakeHost::new();
    host.identity = Identity {
        uid: 1000,
        egid: 100,
        user: "operator".into(),
        ppid: 4242,
    };
    let mut fx = Fixture::with_host(false, Options::default(), host).await;
    fs::remove_file(fx.path("shadow")).unwrap();
    fx.press("f2").await;

    assert_eq!(fx.app.window(), Window::Login);
    assert!(!fx.app.session.authenticated);
}

#[tokio::test]
async fn timesyncd_save_writes_servers() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("5").await;
    assert_eq!(fx.app.window(), Window::Timesyncd);

    fx.press("ctrl u").await;
    fx.type_text("a.example b.example").await;
    fx.press("enter").await;

    assert_eq!(
        read(&fx.path("timesyncd.conf")),
        "# timesyncd\n[Time]\nNTP=a.example b.example\nFallbackNTP=fb.example\n#RootDistanceMaxSec=5\n"
    );
    assert_eq!(fx.host.quiet_commands(), vec!["timedatectl set-ntp true"]);
    assert_eq!(fx.caller_window(), Some(Window::MainMenu));
    assert!(fx.message_text().contains("was successful"));
}

#[tokio::test]
async fn timesyncd_unchanged_save_keeps_file_bytes() {
    let mut fx = Fixture::new(false, Options::default()).await;
    let before = read(&fx.path("timesyncd.conf"));
    fx.enter_menu().await;
    fx.press("5").await;
    fx.press("enter").await;
    assert_eq!(read(&fx.path("timesyncd.conf")), before);
}

#[tokio::test]
async fn timesyncd_commented_defaults_survive_an_unedited_save() {
    let mut fx = Fixture::new(false, Options::default()).await;
    let stock = "[Time]\n#NTP=\n#FallbackNTP=0.opensuse.pool.ntp.org 1.opensuse.pool.ntp.org\n";
    fs::write(fx.path("timesyncd.conf"), stock).unwrap();
    fx.enter_menu().await;
    fx.press("5").await;
    assert_eq!(fx.app.window(), Window::Timesyncd);
    fx.press("enter").await;

    assert_eq!(read(&fx.path("timesyncd.conf")), stock);
    assert!(fx.message_text().contains("was successful"));
}

#[tokio::test]
async fn supported_repo_with_bad_credentials_is_refused() {
    let mut host = FakeHost::new();
    host.http_status = 401;
    let mut fx = Fixture::with_host(false, Options::default(), host).await;
    let original = "[grommunio]\nname=grommunio\nbaseurl=https://download.grommunio.com/community/openSUSE_Leap_15.3/?ssl_verify=no\nenabled=1\n";
    fs::write(fx.path("grommunio.repo"), original).unwrap();

    fx.enter_menu().await;
    fx.press("6").await;
    assert_eq!(fx.app.window(), Window::RepoSelection);
    fx.press("down").await;
    fx.press("space").await;
    fx.press("tab").await;
    fx.type_text("user").await;
    fx.press("tab").await;
    fx.type_text("wrong").await;
    fx.press("enter").await;

    assert_eq!(fx.host.http.len(), 1);
    assert_eq!(
        fx.host.http[0].1,
        Some(("user".to_string(), "wrong".to_string()))
    );
    assert!(fx.message_text().contains("Please check the credentials"));
    assert_eq!(fx.caller_window(), Some(Window::RepoSelection));
    assert_eq!(read(&fx.path("grommunio.repo")), original);
    assert!(fx.host.quiet.is_empty());
}

#[tokio::test]
async fn community_repo_switch_imports_key_once() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("6").await;
    // Community is preselected; enter in the user field saves.
    fx.press("tab").await;
    fx.press("tab").await;
    fx.press("enter").await;

    let repo = read(&fx.path("grommunio.repo"));
    assert!(repo.contains("[grommunio]"));
    assert!(repo.contains("baseurl=https://download.grommunio.com/community/"));
    assert!(repo.contains("type=rpm-md"));
    assert_eq!(fx.host.progress, vec![20, 30, 40, 60, 100]);
    assert!(fx.path("gpg-key").exists());
    let quiet = fx.host.quiet_commands();
    assert!(quiet[0].starts_with("rpm --import "));
    assert_eq!(quiet[1], "zypper --non-interactive refresh");
    assert!(fx.message_text().contains("switched successfully"));

    // Saving the same selection again touches nothing.
    fx.press("enter").await;
    fx.press("6").await;
    fx.press("tab").await;
    fx.press("tab").await;
    fx.press("enter").await;
    assert_eq!(read(&fx.path("grommunio.repo")), repo);
    assert_eq!(fx.host.quiet.len(), 2);
    assert!(fx.message_text().contains("unchanged"));
}

#[tokio::test]
async fn password_mismatch_never_calls_passwd() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("2").await;
    assert_eq!(fx.app.window(), Window::Password);
    fx.type_text("abc").await;
    fx.press("tab").await;
    fx.type_text("xyz").await;
    fx.press("enter").await;

    assert!(fx.host.quiet.is_empty());
    assert_eq!(
        fx.message_text(),
        "System password reset failed due to mismatching password values"
    );
}

#[tokio::test]
async fn matching_passwords_go_to_passwd_stdin() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("2").await;
    fx.type_text("pw1").await;
    fx.press("tab").await;
    fx.type_text("pw1").await;
    fx.press("enter").await;

    assert_eq!(
        fx.host.quiet,
        vec![("passwd".to_string(), Some("pw1\npw1\n".to_string()))]
    );
    assert_eq!(fx.message_text(), "System password reset was successful");
}

#[tokio::test]
async fn keyboard_switch_writes_vconsole() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("f5").await;
    assert_eq!(fx.app.window(), Window::KeyboardSwitch);

    fx.press("down").await;
    fx.press("enter").await;

    assert_eq!(
        read(&fx.path("vconsole.conf")),
        "# console\nKEYMAP=\"de-latin1-nodeadkeys\"\nFONT=eurlatgr\n"
    );
    assert_eq!(
        fx.host.quiet_commands(),
        vec!["systemctl restart systemd-vconsole-setup"]
    );
    assert_eq!(fx.app.keyboard, "de-latin1-nodeadkeys");
    assert!(
        screens::header_text(&fx.app.tr, &fx.app.session, &fx.app.keyboard)
            .contains("de-latin1-nodeadkeys")
    );
    assert_eq!(fx.app.window(), Window::MainMenu);
}

#[tokio::test]
async fn keyboard_other_applies_typed_keymap() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.press("f5").await;
    assert_eq!(fx.app.window(), Window::KeyboardSwitch);
    fx.press("tab").await;
    fx.press("tab").await;
    fx.press("enter").await;
    assert_eq!(fx.app.window(), Window::InputBox);
    assert_eq!(fx.caller_window(), Some(Window::KeyboardSwitch));

    fx.type_text("fr").await;
    fx.press("enter").await;

    assert_eq!(fx.app.keyboard, "fr");
    assert!(read(&fx.path("vconsole.conf")).contains("KEYMAP=\"fr\""));
    assert_eq!(fx.app.window(), Window::Main);
}

#[tokio::test]
async fn keyboard_other_cancel_changes_nothing() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.press("f5").await;
    fx.press("tab").await;
    fx.press("tab").await;
    fx.press("enter").await;
    fx.type_text("fr").await;
    fx.press("esc").await;

    assert_eq!(fx.app.window(), Window::KeyboardSwitch);
    assert_eq!(fx.app.keyboard, "us");
    assert!(fx.host.quiet.is_empty());
}

#[tokio::test]
async fn closing_a_modal_restores_the_caller_exactly() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("5").await;
    fx.type_text(" c.example").await;
    let snapshot = fx.app.view.clone();

    for terminator in ["enter", "esc"] {
        fx.app.message("Note", "first");
        // A second message reuses the slot and keeps the caller.
        fx.app.message("Note", "second");
        assert_eq!(fx.caller_window(), Some(Window::Timesyncd));
        fx.press(terminator).await;
        assert_eq!(fx.app.view, snapshot);
        assert!(fx.app.modal.is_none());
    }
}

#[tokio::test]
async fn reboot_runs_after_confirmation() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    for _ in 0..10 {
        fx.press("down").await;
    }
    fx.press("enter").await;
    assert_eq!(fx.app.window(), Window::MessageBox);
    assert_eq!(fx.caller_window(), Some(Window::Reboot));

    fx.press("enter").await;
    assert_eq!(
        fx.app.exit,
        Some(ExitRequest::Exec(vec!["reboot".to_string()]))
    );
    assert_eq!(fx.app.key_counter.get("enter"), Some(&1));
    assert!(fx.app.replay.is_none());
}

#[tokio::test]
async fn shutdown_cancel_returns_to_menu() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    for _ in 0..11 {
        fx.press("down").await;
    }
    fx.press("enter").await;
    assert_eq!(fx.caller_window(), Some(Window::Shutdown));
    fx.press("tab").await;
    fx.press("enter").await;

    assert_eq!(fx.app.exit, None);
    assert_eq!(fx.app.window(), Window::MainMenu);
    assert_eq!(fx.app.menu_focus, 11);
}

#[tokio::test]
async fn replays_stay_under_the_cap() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    for _ in 0..20 {
        fx.app.message("Loop", "again");
        fx.press("enter").await;
        assert!(fx.app.replay.is_none());
        assert!(fx.app.key_counter.values().all(|n| *n <= REPLAY_CAP));
    }
    assert_eq!(fx.app.window(), Window::MainMenu);
}

#[tokio::test]
async fn self_reopening_modal_chain_stops_at_the_cap() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.app.key_counter.clear();
    fx.app.message("Loop", "again");
    fx.app.close_modal("enter");

    // Every replayed key reopens a modal whose close queues the key again.
    let mut rounds = 0;
    while let Some(key) = fx.app.next_replay() {
        rounds += 1;
        assert!(rounds <= 2 * REPLAY_CAP as usize);
        fx.app.message("Loop", "again");
        fx.app.close_modal(&key);
    }

    assert_eq!(rounds, REPLAY_CAP as usize);
    assert_eq!(fx.app.key_counter.get("enter"), Some(&REPLAY_CAP));
    assert!(fx.app.replay.is_none());
    assert_eq!(fx.app.window(), Window::MainMenu);
}

#[tokio::test]
async fn disabled_menu_items_do_nothing() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    // Admin tool missing: entry 9 is disabled.
    fx.press("9").await;
    fx.press("enter").await;
    fx.app
        .handle_event(
            &mut fx.host,
            Event::Mouse {
                phase: MousePhase::Press,
                button: 1,
                col: 3,
                row: 10,
            },
        )
        .await;
    assert_eq!(fx.app.window(), Window::MainMenu);
    assert_eq!(fx.app.menu_focus, 8);
    assert!(fx.host.quiet.is_empty());
}

#[tokio::test]
async fn menu_focus_is_clamped() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.enter_menu().await;
    fx.press("up").await;
    assert_eq!(fx.app.menu_focus, 0);
    for _ in 0..30 {
        fx.press("down").await;
    }
    assert_eq!(fx.app.menu_focus, MenuAction::ALL.len() - 1);
}

#[tokio::test]
async fn menu_commands_run_on_the_terminal() {
    let mut host = FakeHost::new();
    host.tty_ok = false;
    let mut fx = Fixture::with_host(false, Options::default(), host).await;
    fx.enter_menu().await;
    fx.press("3").await;

    assert_eq!(fx.host.tty, vec!["yast2 lan"]);
    assert_eq!(fx.caller_window(), Some(Window::MainMenu));
    assert!(fx.message_text().ends_with("failed"));
}

#[tokio::test]
async fn locale_change_restarts_the_console() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.host.tty_writes = Some((fx.path("locale.conf"), "LANG=de_DE.UTF-8\n".into()));
    fx.enter_menu().await;
    fx.press("1").await;

    assert_eq!(fx.host.tty, vec!["yast2 language"]);
    assert_eq!(
        fx.app.exit,
        Some(ExitRequest::Restart(vec![(
            "LANG".to_string(),
            "de_DE.UTF-8".to_string()
        )]))
    );
}

#[tokio::test]
async fn f4_needs_a_session_and_a_settled_screen() {
    let mut fx = Fixture::new(false, Options::default()).await;
    fx.press("f4").await;
    assert_eq!(fx.app.window(), Window::Main);

    fx.enter_menu().await;
    fx.press("5").await;
    fx.press("f4").await;
    assert_eq!(fx.app.window(), Window::MainMenu);

    fx.app.message("Note", "open");
    fx.press("f4").await;
    assert_eq!(fx.app.window(), Window::MessageBox);
}

#[tokio::test]
async fn hidden_login_opens_menu_with_l() {
    let opts = Options {
        hidden_login: true,
        ..Options::default()
    };
    let mut fx = Fixture::new(true, opts).await;
    fx.press("l").await;
    assert_eq!(fx.app.window(), Window::MainMenu);
    assert!(!fx.app.session.authenticated);

    let mut plain = Fixture::new(true, Options::default()).await;
    plain.press("l").await;
    assert_eq!(plain.app.window(), Window::LogViewer);
}

#[tokio::test]
async fn log_viewer_clamps_line_count() {
    let mut fx = Fixture::new(true, Options::default()).await;
    fx.press("l").await;
    assert_eq!(fx.app.window(), Window::LogViewer);
    assert_eq!(fx.host.journal_reads().len(), 1);

    fx.press("-").await;
    assert_eq!(fx.app.logs.line_count, MIN_LINES);
    assert_eq!(fx.host.journal_reads().len(), 1);

    fx.press("+").await;
    assert_eq!(fx.app.logs.line_count, MIN_LINES + LINE_STEP);
    assert!(fx.host.journal_reads()[1].contains("-n 300"));

    fx.app.logs.line_count = MAX_LINES;
    fx.press("+").await;
    assert_eq!(fx.app.logs.line_count, MAX_LINES);
    assert_eq!(fx.host.journal_reads().len(), 2);

    fx.press("left").await;
    assert_eq!(fx.app.logs.current, 0);
    fx.press("right").await;
    assert_eq!(fx.app.logs.current, 1);

    fx.press("esc").await;
    assert_eq!(fx.app.window(), Window::Main);
}

#[tokio::test]
async fn escape_word_shows_unfiltered_journal() {
    let mut fx = Fixture::new(true, Options::default()).await;
    fx.press("l").await;
    fx.type_text("unsupported").await;

    assert_eq!(fx.app.window(), Window::Unsupported);
    let last = fx.host.journal_reads().last().map(|s| s.to_string());
    assert_eq!(
        last.as_deref(),
        Some("journalctl -b -n 200 -o json --no-pager")
    );
    let View::Logs(l) = &fx.app.view else {
        panic!("log view expected");
    };
    assert!(l.title.contains("syslog"));
    assert_eq!(l.lines.len(), 1);

    fx.press("h").await;
    assert_eq!(fx.app.window(), Window::Main);
}

#[tokio::test]
async fn globals_quit_and_cycle_colors() {
    let mut fx = Fixture::new(true, Options::default()).await;
    let scheme = fx.app.scheme;
    fx.press("c").await;
    assert_ne!(fx.app.scheme, scheme);
    fx.press("Q").await;
    assert_eq!(fx.app.exit, Some(ExitRequest::Quit));
}

#[tokio::test]
async fn debug_footer_shows_last_key() {
    let opts = Options {
        debug: true,
        ..Options::default()
    };
    let mut fx = Fixture::new(true, opts).await;
    fx.press("tab").await;
    assert_eq!(fx.app.footer.debug, "tab @ MAIN");
    let View::Main(m) = &fx.app.view else {
        panic!("status screen expected");
    };
    assert_eq!(m.focus, Pane::Bottom);
}

#[tokio::test]
async fn menu_title_follows_the_catalog() {
    use ratatui::{Terminal, backend::TestBackend};

    let mut fx = Fixture::new(false, Options::default()).await;
    fs::write(fx.path("de.toml"), "\"Main menu\" = \"Hauptmenü\"\n").unwrap();
    fx.app.tr = crate::i18n::Translator::load(fx.dir.path(), "de_DE.UTF-8");
    fx.enter_menu().await;

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| super::render::draw(f, &fx.app)).unwrap();
    let screen: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect();
    assert!(screen.contains("Hauptmenü"));
    assert!(!screen.contains("Main menu"));
}
