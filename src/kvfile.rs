//! Line-preserving `KEY=value` files (`/etc/vconsole.conf`, INI-style repo
//! and timesyncd files).
//!
//! Lines that are not touched by [`KvFile::set`] are written back exactly as
//! they were read, so an unchanged file round-trips byte for byte.

use anyhow::{Context, Result};
use std::{fs, io, path::Path};

/// How values and sections are written in a particular file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    /// Values are shell words (`KEY="a b"`).
    pub quoted: bool,
    /// `[section]` headers are recognised.
    pub sections: bool,
}

impl Dialect {
    /// Shell-sourced files such as `vconsole.conf`, `locale.conf` and `os-release`.
    pub const SHELL: Self = Self {
        quoted: true,
        sections: false,
    };
    /// INI files such as zypper repo files and `timesyncd.conf`.
    pub const INI: Self = Self {
        quoted: false,
        sections: true,
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Line {
    /// `[name]`
    Section { name: String, raw: String },
    /// `key=value` inside the given section.
    Entry {
        section: Option<String>,
        key: String,
        value: String,
        raw: String,
    },
    /// Comments, blanks and anything unparsable.
    Other(String),
}

impl Line {
    fn raw(&self) -> &str {
        match self {
            Line::Section { raw, .. } | Line::Entry { raw, .. } | Line::Other(raw) => raw,
        }
    }
}

/// Parsed file that remembers every original line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvFile {
    dialect: Dialect,
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl KvFile {
    /// Empty file in the given dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            lines: Vec::new(),
            trailing_newline: true,
        }
    }

    /// Parse text.
    pub fn parse(text: &str, dialect: Dialect) -> Self {
        let mut section: Option<String> = None;
        let mut lines = Vec::new();
        // Split on '\n' only so a trailing '\r' stays part of the raw line.
        let body = text.strip_suffix('\n').unwrap_or(text);
        let raws = if text.is_empty() {
            None
        } else {
            Some(body.split('\n'))
        };
        for raw in raws.into_iter().flatten() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                lines.push(Line::Other(raw.to_string()));
                continue;
            }
            if dialect.sections && trimmed.starts_with('[') && trimmed.ends_with(']') {
                let name = trimmed[1..trimmed.len() - 1].trim().to_string();
                section = Some(name.clone());
                lines.push(Line::Section {
                    name,
                    raw: raw.to_string(),
                });
                continue;
            }
            match trimmed.split_once('=') {
                Some((k, v)) if !k.trim().is_empty() => {
                    let key = k.trim().trim_start_matches("export ").trim().to_string();
                    let v = v.trim();
                    let value = if dialect.quoted {
                        unquote(v)
                    } else {
                        v.to_string()
                    };
                    lines.push(Line::Entry {
                        section: section.clone(),
                        key,
                        value,
                        raw: raw.to_string(),
                    });
                }
                _ => lines.push(Line::Other(raw.to_string())),
            }
        }
        Self {
            dialect,
            lines,
            trailing_newline: text.is_empty() || text.ends_with('\n'),
        }
    }

    /// Read a file; a missing file is an empty one.
    pub fn load(path: &Path, dialect: Dialect) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Self::parse(&s, dialect)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new(dialect)),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Read a file, degrading any I/O error to an empty file.
    pub fn load_lossy(path: &Path, dialect: Dialect) -> Self {
        Self::load(path, dialect).unwrap_or_else(|e| {
            tracing::warn!("{e:#}");
            Self::new(dialect)
        })
    }

    /// Value of `key` in `section` (`None` for section-less files).
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match l {
            Line::Entry {
                section: s,
                key: k,
                value,
                ..
            } if k == key && s.as_deref() == section => Some(value.as_str()),
            _ => None,
        })
    }

    /// All entries of a section in file order.
    pub fn entries(&self, section: Option<&str>) -> Vec<(&str, &str)> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Entry {
                    section: s,
                    key,
                    value,
                    ..
                } if s.as_deref() == section => Some((key.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Set `key` in `section`. The first existing entry is rewritten in
    /// place; otherwise the entry goes after the section's last line, and a
    /// missing section is appended at the end.
    pub fn set(&mut self, section: Option<&str>, key: &str, value: &str) {
        if self.get(section, key) == Some(value) {
            return;
        }
        let raw = self.format_entry(key, value);
        let entry = Line::Entry {
            section: section.map(str::to_string),
            key: key.to_string(),
            value: value.to_string(),
            raw,
        };
        let existing = self.lines.iter().position(|l| {
            matches!(l, Line::Entry { section: s, key: k, .. } if k == key && s.as_deref() == section)
        });
        if let Some(idx) = existing {
            self.lines[idx] = entry;
            return;
        }
        match section {
            None => {
                // Section-less keys belong before the first header.
                let at = self
                    .lines
                    .iter()
                    .position(|l| matches!(l, Line::Section { .. }))
                    .unwrap_or(self.lines.len());
                self.lines.insert(at, entry);
            }
            Some(name) => match self.section_end(name) {
                Some(at) => self.lines.insert(at, entry),
                None => {
                    self.lines.push(Line::Section {
                        name: name.to_string(),
                        raw: format!("[{name}]"),
                    });
                    self.lines.push(entry);
                }
            },
        }
    }

    /// Index just past the last entry of `name`, or just past its header.
    fn section_end(&self, name: &str) -> Option<usize> {
        let header = self
            .lines
            .iter()
            .position(|l| matches!(l, Line::Section { name: n, .. } if n == name))?;
        let mut end = header + 1;
        for (i, l) in self.lines.iter().enumerate().skip(header + 1) {
            match l {
                Line::Section { .. } => break,
                Line::Entry { .. } => end = i + 1,
                Line::Other(_) => {}
            }
        }
        Some(end)
    }

    fn format_entry(&self, key: &str, value: &str) -> String {
        if self.dialect.quoted {
            format!("{key}={}", quote(value))
        } else {
            format!("{key}={value}")
        }
    }

    /// Serialise back to text.
    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(Line::raw)
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Write the file unless its content on disk is already identical.
    /// Returns whether the disk was touched.
    pub fn save(&self, path: &Path) -> Result<bool> {
        let text = self.render();
        if fs::read_to_string(path).ok().as_deref() == Some(text.as_str()) {
            return Ok(false);
        }
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(true)
    }
}

/// Quote a value the way shell-sourced config files expect.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Undo shell quoting of a single word.
pub fn unquote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    out.push(c);
                }
            }
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => {
                            if let Some(n) = chars.next() {
                                out.push(n);
                            }
                        }
                        _ => out.push(c),
                    }
                }
            }
            '\\' => {
                if let Some(n) = chars.next() {
                    out.push(n);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
