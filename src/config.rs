//! Console settings and the host paths they point at.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default location of the optional settings file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/grommunio-console/console.toml";

/// Top-level configuration read from `console.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files and tools the console reads, writes or launches.
    pub paths: PathsCfg,
    /// Package repository endpoints.
    pub repo: RepoCfg,
    /// Journal viewer and log-file settings.
    pub logs: LogsCfg,
    /// Look and language.
    pub ui: UiCfg,
}

/// Host paths. Every path is configurable so the console can be pointed at a
/// staging root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsCfg {
    pub shadow: PathBuf,
    pub os_release: PathBuf,
    pub locale_conf: PathBuf,
    pub hostname: PathBuf,
    pub vconsole_conf: PathBuf,
    pub timesyncd_conf: PathBuf,
    pub repo_file: PathBuf,
    pub gpg_key_tmp: PathBuf,
    pub loadavg: PathBuf,
    pub keymaps_dir: PathBuf,
    /// Marker written by the setup wizard, newest name first.
    pub setup_done: Vec<PathBuf>,
    /// Admin tool executables, newest name first.
    pub admin_tool: Vec<PathBuf>,
    /// Setup wizard executables, newest name first.
    pub setup_tool: Vec<PathBuf>,
}

/// Repository selection endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepoCfg {
    /// Section name inside the repo file.
    pub section: String,
    /// Base URL of the community repository.
    pub community_url: String,
    /// Host and path of the supported repository (credentials are prepended).
    pub supported_location: String,
    /// URL probed with basic auth to validate subscription credentials.
    pub probe_url: String,
    /// URL of the signing key.
    pub gpg_key_url: String,
}

/// Journal viewer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsCfg {
    /// Line format with `{asctime}`, `{levelname}`, `{module}`, `{message}`.
    pub format: String,
    /// Initial number of journal lines shown.
    pub line_count: usize,
    /// Directory for the console's own log file.
    pub log_dir: PathBuf,
}

/// Presentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiCfg {
    /// Name of the color scheme used at start.
    pub color_scheme: String,
    /// Directory holding `<lang>.toml` message catalogs.
    pub locale_dir: PathBuf,
}

impl Config {
    /// Read the settings file; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }
}

impl PathsCfg {
    /// Installed admin tool, if any.
    pub fn admin_tool(&self) -> Option<&Path> {
        first_executable(&self.admin_tool)
    }

    /// Installed setup wizard, if any.
    pub fn setup_tool(&self) -> Option<&Path> {
        first_executable(&self.setup_tool)
    }
}

/// Pick the first path that exists and carries an execute bit.
fn first_executable(candidates: &[PathBuf]) -> Option<&Path> {
    use std::os::unix::fs::PermissionsExt;
    candidates
        .iter()
        .find(|p| {
            fs::metadata(p)
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        })
        .map(PathBuf::as_path)
}

impl Default for PathsCfg {
    fn default() -> Self {
        Self {
            shadow: "/etc/shadow".into(),
            os_release: "/etc/os-release".into(),
            locale_conf: "/etc/locale.conf".into(),
            hostname: "/etc/hostname".into(),
            vconsole_conf: "/etc/vconsole.conf".into(),
            timesyncd_conf: "/etc/systemd/timesyncd.conf".into(),
            repo_file: "/etc/zypp/repos.d/grommunio.repo".into(),
            gpg_key_tmp: "/tmp/RPM-GPG-KEY-grommunio".into(),
            loadavg: "/proc/loadavg".into(),
            keymaps_dir: "/usr/share/kbd/keymaps".into(),
            setup_done: vec![
                "/etc/grommunio-common/setup_done".into(),
                "/etc/grammm/setup_done".into(),
            ],
            admin_tool: vec![
                "/usr/sbin/grommunio-admin".into(),
                "/usr/sbin/grammm-admin".into(),
            ],
            setup_tool: vec![
                "/usr/sbin/grommunio-setup".into(),
                "/usr/sbin/grammm-setup".into(),
            ],
        }
    }
}

impl Default for RepoCfg {
    fn default() -> Self {
        Self {
            section: "grommunio".into(),
            community_url: "https://download.grommunio.com/community/openSUSE_Leap_15.3/?ssl_verify=no"
                .into(),
            supported_location: "download.grommunio.com/supported/openSUSE_Leap_15.3/?ssl_verify=no"
                .into(),
            probe_url:
                "https://download.grommunio.com/supported/openSUSE_Leap_15.3/repodata/repomd.xml"
                    .into(),
            gpg_key_url: "https://download.grommunio.com/RPM-GPG-KEY-grommunio".into(),
        }
    }
}

impl Default for LogsCfg {
    fn default() -> Self {
        Self {
            format: "[{asctime}] [{levelname}] ({module}): \"{message}\"".into(),
            line_count: 200,
            log_dir: "/var/log".into(),
        }
    }
}

impl Default for UiCfg {
    fn default() -> Self {
        Self {
            color_scheme: "light".into(),
            locale_dir: "/usr/share/grommunio-console/locale".into(),
        }
    }
}
