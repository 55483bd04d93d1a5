//! Entry point: arguments, logging, terminal set-up and the final exec.

use std::{
    fs,
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod auth;
mod cli;
mod config;
mod events;
mod host;
mod i18n;
mod input;
mod journal;
mod keys;
mod kvfile;
mod layout;
mod probes;
mod readiness;
mod screens;
mod theme;
mod ui;
mod view;

use app::{App, ExitRequest, Options};
use host::{Banner, Host, SystemHost};
use i18n::Translator;

const LOG_FILE: &str = "grommunio-console.log";

/// File logging through a non-blocking writer; the terminal belongs to the
/// TUI. Falls back to the temp dir when `log_dir` is not writable.
fn init_logging(log_dir: &Path, debug: bool) -> Result<WorkerGuard> {
    let dir = if writable(log_dir) {
        log_dir.to_path_buf()
    } else {
        std::env::temp_dir()
    };
    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    tracing::info!("logging to {}", dir.join(LOG_FILE).display());
    Ok(guard)
}

fn writable(dir: &Path) -> bool {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .is_ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let cfg = config::Config::load_or_default(&cli.config)?;
    let log_guard = init_logging(&cfg.logs.log_dir, cli.debug)?;
    tracing::info!("console starting");

    let tr = Translator::from_env(&cfg.ui.locale_dir);
    if !tr.lang().is_empty() {
        tracing::info!("messages in {}", tr.lang());
    }
    let banner = Banner {
        wait: tr.t("Please wait..."),
        detail: tr.t("The console comes back when the program has finished."),
        press_enter: tr.t("Press ENTER to return to the console."),
    };
    let shadow = cfg.paths.shadow.clone();

    let terminal = ui::init_terminal()?;
    let res = run(terminal, shadow, banner, (cfg, tr, cli.options())).await;
    // Always hand a sane terminal back, also on errors.
    ui::restore_terminal()?;

    match res {
        Ok(req) => finish(req, log_guard),
        Err(e) => {
            tracing::error!("console error: {e:#}");
            Err(e)
        }
    }
}

async fn run(
    terminal: ui::Tui,
    shadow: PathBuf,
    banner: Banner,
    parts: (config::Config, Translator, Options),
) -> Result<ExitRequest> {
    let mut host = SystemHost::new(terminal, shadow, banner)?;
    let (cfg, tr, opts) = parts;
    let mut app = App::new(cfg, tr, opts, host.identity());
    app.start(&mut host).await;
    host.take_fatal()?;
    app::run_app(&mut host, &mut app).await
}

/// Leave the process the way the controller asked for.
fn finish(req: ExitRequest, log_guard: WorkerGuard) -> Result<()> {
    let mut cmd = match req {
        ExitRequest::Quit => {
            tracing::info!("console exiting");
            return Ok(());
        }
        ExitRequest::Exec(argv) => {
            let Some((prog, args)) = argv.split_first() else {
                return Ok(());
            };
            tracing::info!("exec {}", argv.join(" "));
            let mut cmd = Command::new(prog);
            cmd.args(args);
            cmd
        }
        ExitRequest::Restart(env) => {
            let exe = std::env::current_exe().context("locating the console binary")?;
            tracing::info!("restarting {} with {env:?}", exe.display());
            let mut cmd = Command::new(exe);
            cmd.args(std::env::args_os().skip(1)).envs(env);
            cmd
        }
    };
    // Flush the log before the process image is replaced.
    drop(log_guard);
    let err = cmd.exec();
    Err::<(), _>(err).with_context(|| format!("exec {:?}", cmd.get_program()))
}
