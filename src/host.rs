//! Everything the controller does to the outside world.
//!
//! [`Host`] is the seam between the window state machine and the system:
//! subprocesses, authentication, HTTP, port probes and the progress gauge.
//! [`SystemHost`] is the production implementation and owns the terminal.

use std::{path::PathBuf, process::Stdio, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    process::Command,
    signal::unix::{Signal, SignalKind, signal},
};

use crate::{
    auth::{self, AuthError},
    layout::centered_popup,
    ui::{self, Tui},
};

/// Status and body of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Who is running the console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub egid: u32,
    pub user: String,
    pub ppid: i32,
}

impl Identity {
    /// Root or a member of the root group.
    pub fn is_privileged(&self) -> bool {
        self.uid == 0 || self.egid == 0
    }
}

#[async_trait]
pub trait Host: Send {
    /// Run a command on the real terminal with the TUI suspended.
    async fn run_tty(&mut self, argv: &[&str], wait_enter: bool) -> bool;
    /// Run a command in the background, optionally feeding its stdin.
    async fn run_quiet(&mut self, argv: &[&str], stdin: Option<&str>) -> bool;
    /// Stdout of a successful command.
    async fn capture(&mut self, argv: &[&str]) -> Option<String>;
    /// Check a user's password.
    async fn authenticate(&mut self, user: &str, password: &str) -> Result<(), AuthError>;
    /// `GET` a URL, optionally with basic auth.
    async fn http_get(&mut self, url: &str, basic_auth: Option<(&str, &str)>) -> Result<HttpReply>;
    /// Whether something accepts connections on `127.0.0.1:<port>`.
    async fn port_open(&mut self, port: u16) -> bool;
    /// Draw a progress gauge over the current screen.
    fn show_progress(&mut self, title: &str, percent: u16);
    /// Credentials of the running process.
    fn identity(&self) -> Identity;
}

/// Texts printed around a subprocess.
#[derive(Clone, Debug)]
pub struct Banner {
    pub wait: String,
    pub detail: String,
    pub press_enter: String,
}

/// Production host: real processes, real network, real terminal.
pub struct SystemHost {
    terminal: Tui,
    http: reqwest::Client,
    shadow: PathBuf,
    banner: Banner,
    fatal: Option<anyhow::Error>,
    // Installed handlers keep ^C and ^\ from killing the console while a
    // child owns the terminal. exec resets them to the default for the child.
    _signals: Vec<Signal>,
}

impl SystemHost {
    pub fn new(terminal: Tui, shadow: PathBuf, banner: Banner) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("grommunio-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let signals = vec![
            signal(SignalKind::interrupt())?,
            signal(SignalKind::quit())?,
        ];
        Ok(Self {
            terminal,
            http,
            shadow,
            banner,
            fatal: None,
            _signals: signals,
        })
    }

    pub fn terminal(&mut self) -> &mut Tui {
        &mut self.terminal
    }

    /// Terminal failure recorded while the loop was not in control.
    pub fn take_fatal(&mut self) -> Result<()> {
        match self.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record_fatal(&mut self, e: anyhow::Error) {
        tracing::error!("terminal lost: {e:#}");
        self.fatal.get_or_insert(e);
    }

    async fn wait_for_enter(&self) {
        println!();
        println!("{}", self.banner.press_enter);
        let mut line = String::new();
        if let Err(e) = BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            tracing::warn!("reading stdin: {e}");
        }
    }
}

#[async_trait]
impl Host for SystemHost {
    async fn run_tty(&mut self, argv: &[&str], wait_enter: bool) -> bool {
        let Some((prog, args)) = argv.split_first() else {
            return false;
        };
        if let Err(e) = ui::suspend() {
            self.record_fatal(e);
            return false;
        }
        println!("{}", self.banner.wait);
        println!("{}", self.banner.detail);
        tracing::info!("running {}", argv.join(" "));
        let ok = match Command::new(prog).args(args).status().await {
            Ok(status) => {
                tracing::info!("{prog} exited with {status}");
                status.success()
            }
            Err(e) => {
                tracing::error!("cannot start {prog}: {e}");
                false
            }
        };
        if wait_enter {
            self.wait_for_enter().await;
        }
        if let Err(e) = ui::resume(&mut self.terminal) {
            self.record_fatal(e);
        }
        ok
    }

    async fn run_quiet(&mut self, argv: &[&str], stdin: Option<&str>) -> bool {
        let Some((prog, args)) = argv.split_first() else {
            return false;
        };
        tracing::info!("running {prog} in background");
        let child = Command::new(prog)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("cannot start {prog}: {e}");
                return false;
            }
        };
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take())
            && let Err(e) = pipe.write_all(input.as_bytes()).await
        {
            tracing::warn!("writing to {prog}: {e}");
        }
        match child.wait().await {
            Ok(status) => {
                if !status.success() {
                    tracing::error!("{prog} exited with {status}");
                }
                status.success()
            }
            Err(e) => {
                tracing::error!("waiting for {prog}: {e}");
                false
            }
        }
    }

    async fn capture(&mut self, argv: &[&str]) -> Option<String> {
        let (prog, args) = argv.split_first()?;
        let out = Command::new(prog)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;
        match out {
            Ok(o) if o.status.success() => Some(String::from_utf8_lossy(&o.stdout).into_owned()),
            Ok(o) => {
                tracing::debug!("{prog} exited with {}", o.status);
                None
            }
            Err(e) => {
                tracing::debug!("cannot start {prog}: {e}");
                None
            }
        }
    }

    async fn authenticate(&mut self, user: &str, password: &str) -> Result<(), AuthError> {
        let (user, password, shadow) = (user.to_string(), password.to_string(), self.shadow.clone());
        tokio::task::spawn_blocking(move || auth::authenticate(&user, &password, &shadow))
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
    }

    async fn http_get(&mut self, url: &str, basic_auth: Option<(&str, &str)>) -> Result<HttpReply> {
        let mut req = self.http.get(url);
        if let Some((user, password)) = basic_auth {
            req = req.basic_auth(user, Some(password));
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        tracing::info!("GET {} -> {status}", redact(url));
        Ok(HttpReply { status, body })
    }

    async fn port_open(&mut self, port: u16) -> bool {
        matches!(
            tokio::time::timeout(
                Duration::from_secs(3),
                TcpStream::connect(("127.0.0.1", port))
            )
            .await,
            Ok(Ok(_))
        )
    }

    fn show_progress(&mut self, title: &str, percent: u16) {
        let res = self.terminal.draw(|f| {
            let area = centered_popup(f.area(), 60, 5);
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(title.to_string()))
                .gauge_style(Style::default().fg(Color::White).bg(Color::Blue))
                .percent(percent.min(100));
            f.render_widget(Clear, area);
            f.render_widget(gauge, area);
        });
        if let Err(e) = res {
            self.record_fatal(e.into());
        }
    }

    fn identity(&self) -> Identity {
        use nix::unistd::{User, getegid, getppid, getuid};
        let uid = getuid();
        Identity {
            uid: uid.as_raw(),
            egid: getegid().as_raw(),
            user: User::from_uid(uid)
                .ok()
                .flatten()
                .map(|u| u.name)
                .unwrap_or_default(),
            ppid: getppid().as_raw(),
        }
    }
}

/// Drop the userinfo part of a URL for logging.
pub fn redact(url: &str) -> String {
    match (url.find("://"), url.find('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}***{}", &url[..scheme + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}
