//! Read-only facts about the host.

use std::{
    fs,
    net::{IpAddr, SocketAddrV4, SocketAddrV6},
    path::Path,
};

use chrono::{DateTime, Local, TimeZone};
use sysinfo::System;

use crate::kvfile::{Dialect, KvFile};

/// Static and slowly changing system facts shown on the status screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Facts {
    pub os_name: String,
    pub os_version: String,
    pub hostname: String,
    pub kernel: String,
    pub cpu_model: String,
    pub cpu_count: usize,
    pub mem_total: u64,
    pub mem_used: u64,
    /// Seconds since the epoch.
    pub boot_time: u64,
    /// `(interface, address)` pairs without loopback.
    pub addresses: Vec<(String, IpAddr)>,
}

impl Facts {
    /// Sample the running system.
    pub fn collect(os_release: &Path, hostname: &Path) -> Self {
        let (os_name, os_version) = os_release_info(os_release);
        let mut sys = System::new_all();
        sys.refresh_memory();
        let cpu_model = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_default();
        Self {
            os_name,
            os_version,
            hostname: read_hostname(hostname),
            kernel: System::kernel_version().unwrap_or_default(),
            cpu_model,
            cpu_count: sys.cpus().len(),
            mem_total: sys.total_memory(),
            mem_used: sys.used_memory(),
            boot_time: System::boot_time(),
            addresses: interface_addresses(),
        }
    }
}

/// `NAME` and `VERSION` from `os-release`.
pub fn os_release_info(path: &Path) -> (String, String) {
    let f = KvFile::load_lossy(path, Dialect::SHELL);
    (
        f.get(None, "NAME").unwrap_or("Linux").to_string(),
        f.get(None, "VERSION").unwrap_or_default().to_string(),
    )
}

/// Host name from the file, else from the kernel.
pub fn read_hostname(path: &Path) -> String {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            nix::unistd::gethostname()
                .ok()
                .map(|h| h.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "localhost".into())
}

/// Non-loopback IPv4 and IPv6 addresses by interface.
pub fn interface_addresses() -> Vec<(String, IpAddr)> {
    let Ok(addrs) = nix::ifaddrs::getifaddrs() else {
        tracing::warn!("getifaddrs failed");
        return Vec::new();
    };
    let mut out = Vec::new();
    for ifa in addrs {
        let Some(addr) = ifa.address else {
            continue;
        };
        let ip = if let Some(v4) = addr.as_sockaddr_in() {
            IpAddr::V4(*SocketAddrV4::from(*v4).ip())
        } else if let Some(v6) = addr.as_sockaddr_in6() {
            IpAddr::V6(*SocketAddrV6::from(*v6).ip())
        } else {
            continue;
        };
        if !ip.is_loopback() {
            out.push((ifa.interface_name, ip));
        }
    }
    out
}

/// Load averages from `/proc/loadavg`.
pub fn load_average(path: &Path) -> Option<(f64, f64, f64)> {
    parse_loadavg(&fs::read_to_string(path).ok()?)
}

pub fn parse_loadavg(text: &str) -> Option<(f64, f64, f64)> {
    let mut it = text.split_whitespace().map(str::parse::<f64>);
    Some((it.next()?.ok()?, it.next()?.ok()?, it.next()?.ok()?))
}

/// First meaningful line of `last -1 root`.
pub fn parse_last_login(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("wtmp") && !l.starts_with("btmp"))
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Local time of a Unix timestamp.
pub fn format_timestamp(secs: u64) -> String {
    Local
        .timestamp_opt(secs as i64, 0)
        .single()
        .map(|t: DateTime<Local>| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Human-readable byte size.
pub fn format_bytes(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= GB {
        format!("{:.1} GiB", bytes as f64 / GB as f64)
    } else {
        format!("{:.1} MiB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadavg_is_parsed() {
        assert_eq!(
            parse_loadavg("0.15 0.30 1.00 2/345 6789\n"),
            Some((0.15, 0.30, 1.00))
        );
        assert_eq!(parse_loadavg("garbage"), None);
        assert_eq!(parse_loadavg(""), None);
    }

    #[test]
    fn last_login_skips_trailer() {
        let out = "root     pts/0        10.0.0.5         Mon Oct 12 10:00   still logged in\n\nwtmp begins Thu Oct  1 09:00:00 2026\n";
        assert_eq!(
            parse_last_login(out).as_deref(),
            Some("root pts/0 10.0.0.5 Mon Oct 12 10:00 still logged in")
        );
        assert_eq!(parse_last_login("\nwtmp begins Thu\n"), None);
    }

    #[test]
    fn os_release_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        fs::write(&path, "NAME=\"openSUSE Leap\"\nVERSION=\"15.3\"\nID=opensuse-leap\n").unwrap();
        assert_eq!(
            os_release_info(&path),
            ("openSUSE Leap".to_string(), "15.3".to_string())
        );
        assert_eq!(os_release_info(&dir.path().join("none")).0, "Linux");
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(format_bytes(512 * 1024 * 1024), "512.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
