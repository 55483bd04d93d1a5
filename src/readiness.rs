//! Post-install setup progress.

use std::{fs, path::Path};

use crate::{config::PathsCfg, host::Host, i18n::Translator};

/// Which setup tasks are done. Each check is independent; a failing probe
/// only clears its own bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    pub pw_set: bool,
    pub net_up: bool,
    pub setup_done: bool,
    pub ntp_ok: bool,
    pub http_up: bool,
    pub admin_installed: bool,
}

impl Readiness {
    /// Bit vector in declaration order, `pw_set` being bit 0.
    pub fn bits(self) -> u8 {
        [
            self.pw_set,
            self.net_up,
            self.setup_done,
            self.ntp_ok,
            self.http_up,
            self.admin_installed,
        ]
        .iter()
        .enumerate()
        .fold(0, |acc, (i, b)| acc | (u8::from(*b) << i))
    }

    /// One sentence per unfinished task. NTP state carries no complaint.
    pub fn complaints(self, tr: &Translator) -> Vec<String> {
        let mut out = Vec::new();
        if !self.pw_set {
            out.push(tr.t("No password is set for root. Set one via the main menu."));
        }
        if !self.net_up {
            out.push(tr.t("The SSH service is not listening on port 22."));
        }
        if !self.setup_done {
            out.push(tr.t("grommunio setup has not been run yet. Start it from the main menu."));
        }
        if !self.http_up {
            out.push(tr.t("The grommunio admin web interface is not reachable on port 8080."));
        }
        if !self.admin_installed {
            out.push(tr.t("The grommunio admin tools are not installed."));
        }
        out
    }
}

/// Probe the host.
pub async fn check<H: Host + ?Sized>(host: &mut H, paths: &PathsCfg) -> Readiness {
    Readiness {
        pw_set: root_has_password(&paths.shadow),
        net_up: host.port_open(22).await,
        setup_done: paths.setup_done.iter().any(|p| p.exists()),
        ntp_ok: ntp_synchronized(host).await,
        http_up: host.port_open(8080).await,
        admin_installed: paths.admin_tool().is_some(),
    }
}

/// Whether `root` has a non-empty, non-locked hash in the shadow file.
pub fn root_has_password(shadow: &Path) -> bool {
    match fs::read_to_string(shadow) {
        Ok(text) => shadow_has_password(&text, "root"),
        Err(e) => {
            tracing::warn!("cannot read {}: {e}", shadow.display());
            false
        }
    }
}

pub fn shadow_has_password(text: &str, user: &str) -> bool {
    shadow_hash(text, user)
        .map(|hash| !hash.is_empty() && !hash.starts_with('!') && !hash.starts_with('*'))
        .unwrap_or(false)
}

/// Whether the console may skip the login: the shadow file is readable and
/// `root` has an empty hash. An unreadable file always requires the login.
pub fn root_login_optional(shadow: &Path) -> bool {
    match fs::read_to_string(shadow) {
        Ok(text) => shadow_hash(&text, "root") == Some(""),
        Err(e) => {
            tracing::warn!("cannot read {}, login required: {e}", shadow.display());
            false
        }
    }
}

fn shadow_hash<'a>(text: &'a str, user: &str) -> Option<&'a str> {
    text.lines()
        .filter_map(|l| {
            let mut f = l.split(':');
            Some((f.next()?, f.next()?))
        })
        .find(|(name, _)| *name == user)
        .map(|(_, hash)| hash)
}

async fn ntp_synchronized<H: Host + ?Sized>(host: &mut H) -> bool {
    if let Some(out) = host
        .capture(&["timedatectl", "show", "-p", "NTP", "-p", "NTPSynchronized"])
        .await
        && let Some(ok) = parse_timedatectl_show(&out)
    {
        return ok;
    }
    host.capture(&["timedatectl", "status"])
        .await
        .map(|out| parse_timedatectl_status(&out))
        .unwrap_or(false)
}

/// `NTP=yes` and `NTPSynchronized=yes`; `None` if either property is absent.
pub fn parse_timedatectl_show(out: &str) -> Option<bool> {
    let prop = |name: &str| {
        out.lines()
            .filter_map(|l| l.split_once('='))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim() == "yes")
    };
    Some(prop("NTP")? && prop("NTPSynchronized")?)
}

/// Legacy human-readable output; English only.
pub fn parse_timedatectl_status(out: &str) -> bool {
    let field = |label: &str| {
        out.lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(label))
            .map(|(_, v)| v.trim())
    };
    let network = field("Network time on") == Some("yes") || field("NTP service") == Some("active");
    let synced =
        field("NTP synchronized") == Some("yes") || field("System clock synchronized") == Some("yes");
    network && synced
}
