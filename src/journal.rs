//! systemd journal access for the log viewer.

use std::path::Path;

use chrono::{Local, TimeZone};
use serde_json::Value;

use crate::host::Host;

/// Units shown when the admin tool does not provide a list.
const DEFAULT_UNITS: [&str; 12] = [
    "nginx",
    "gromox-http",
    "gromox-delivery",
    "gromox-event",
    "gromox-timer",
    "gromox-midb",
    "gromox-zcore",
    "gromox-imap",
    "gromox-pop3",
    "gromox-delivery-queue",
    "postfix",
    "grommunio-admin-api",
];

/// A log source: display name and systemd unit without the `.service` suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub unit: String,
}

impl Unit {
    fn plain(unit: &str) -> Self {
        Self {
            name: unit.to_string(),
            unit: unit.to_string(),
        }
    }
}

pub fn default_units() -> Vec<Unit> {
    DEFAULT_UNITS.iter().map(|u| Unit::plain(u)).collect()
}

/// Ask the admin tool for its configured log sources.
pub async fn load_units<H: Host + ?Sized>(host: &mut H, admin_tool: Option<&Path>) -> Vec<Unit> {
    let Some(tool) = admin_tool else {
        return default_units();
    };
    let tool = tool.to_string_lossy();
    match host.capture(&[tool.as_ref(), "config", "dump"]).await {
        Some(dump) => {
            let units = parse_admin_dump(&dump);
            if units.is_empty() {
                tracing::warn!("admin config dump lists no logs, using defaults");
                default_units()
            } else {
                units
            }
        }
        None => default_units(),
    }
}

/// Units under `logs:` in the YAML config dump, in file order.
pub fn parse_admin_dump(text: &str) -> Vec<Unit> {
    let doc: serde_yaml::Value = match serde_yaml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("unparsable admin config dump: {e}");
            return Vec::new();
        }
    };
    let Some(logs) = doc.get("logs").and_then(|l| l.as_mapping()) else {
        return Vec::new();
    };
    logs.iter()
        .filter_map(|(name, entry)| {
            let source = entry.get("source")?.as_str()?;
            Some(Unit {
                name: name.as_str()?.to_string(),
                unit: source.strip_suffix(".service").unwrap_or(source).to_string(),
            })
        })
        .collect()
}

/// `journalctl` arguments for the current boot; `None` means all units.
pub fn journal_args(unit: Option<&str>, count: usize) -> Vec<String> {
    let mut args = vec!["journalctl".to_string(), "-b".to_string()];
    if let Some(u) = unit {
        args.push("-u".into());
        args.push(format!("{u}.service"));
    }
    args.extend([
        "-n".to_string(),
        count.to_string(),
        "-o".into(),
        "json".into(),
        "--no-pager".into(),
    ]);
    args
}

/// Last `count` formatted entries of a unit, or of the whole boot.
pub async fn read<H: Host + ?Sized>(
    host: &mut H,
    unit: Option<&str>,
    count: usize,
    format: &str,
) -> Vec<String> {
    let args = journal_args(unit, count);
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    match host.capture(&argv).await {
        Some(out) => parse_journal(&out, format, count),
        None => {
            tracing::warn!("journalctl failed for {}", unit.unwrap_or("syslog"));
            Vec::new()
        }
    }
}

/// Format one JSON entry per line, keeping the last `count`.
pub fn parse_journal(out: &str, format: &str, count: usize) -> Vec<String> {
    let mut lines: Vec<String> = out
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<Value>(l).ok())
        .map(|entry| format_entry(&entry, format))
        .collect();
    if lines.len() > count {
        lines.drain(..lines.len() - count);
    }
    lines
}

fn format_entry(entry: &Value, format: &str) -> String {
    let asctime = field(entry, "__REALTIME_TIMESTAMP")
        .and_then(|t| t.parse::<i64>().ok())
        .map(asctime)
        .unwrap_or_default();
    let level = field(entry, "PRIORITY")
        .and_then(|p| p.parse::<u8>().ok())
        .map(level_name)
        .unwrap_or("INFO");
    let module = field(entry, "SYSLOG_IDENTIFIER")
        .or_else(|| field(entry, "_COMM"))
        .unwrap_or_default();
    let message = field(entry, "MESSAGE").unwrap_or_default();
    format
        .replace("{asctime}", &asctime)
        .replace("{levelname}", level)
        .replace("{module}", &module)
        .replace("{message}", &message)
}

/// String value of a journal field. Binary fields arrive as byte arrays.
fn field(entry: &Value, name: &str) -> Option<String> {
    match entry.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(bytes) => {
            let raw: Vec<u8> = bytes
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            Some(String::from_utf8_lossy(&raw).into_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Syslog priority to log level name.
pub fn level_name(priority: u8) -> &'static str {
    match priority {
        0..=2 => "CRITICAL",
        3 => "ERROR",
        4 => "WARNING",
        5 | 6 => "INFO",
        _ => "DEBUG",
    }
}

/// `2026-10-17 09:30:01,250` in local time from epoch microseconds.
fn asctime(micros: i64) -> String {
    Local
        .timestamp_micros(micros)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S,%3f").to_string())
        .unwrap_or_default()
}
