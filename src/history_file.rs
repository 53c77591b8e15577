//! On-disk history for the shell.
//!
//! One entry per line, oldest first. Backslash, `\n` and `\r` are escaped so
//! multi-line entries survive the round trip.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub struct HistoryStore {
    path: PathBuf,
    max: usize,
    entries: Vec<String>,
    writer: Option<BufWriter<File>>,
}

impl HistoryStore {
    /// Load the newest `max` entries from `path` and open it for appending.
    ///
    /// A missing file is an empty history. A file that cannot be opened for
    /// writing leaves the store in memory-only mode.
    pub fn open(path: impl Into<PathBuf>, max: usize) -> Result<Self> {
        let path = path.into();
        let entries = load(&path, max)?;
        debug!(path = %path.display(), count = entries.len(), "history loaded");

        let writer = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "history file is read-only");
                None
            }
        };

        Ok(Self {
            path,
            max,
            entries,
            writer,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submitted line. Blank lines and repeats of the newest entry
    /// are skipped. Returns whether the line was added.
    pub fn add(&mut self, line: &str) -> Result<bool> {
        let line = line.trim();
        if line.is_empty() || self.entries.last().map(String::as_str) == Some(line) {
            return Ok(false);
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max {
            let excess = self.entries.len() - self.max;
            self.entries.drain(..excess);
        }

        if let Some(w) = self.writer.as_mut() {
            writeln!(w, "{}", escape_history_line(line))
                .and_then(|()| w.flush())
                .with_context(|| format!("failed to append to {}", self.path.display()))?;
        }
        Ok(true)
    }

    /// Rewrite the file so it holds only the retained entries.
    pub fn compact(&mut self) -> Result<()> {
        let Some(w) = self.writer.as_mut() else {
            return Ok(());
        };
        w.flush()?;
        save(&self.path, &self.entries)
    }
}

/// Read the newest `max` entries from a history file.
pub fn load(path: &Path, max: usize) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to open {}", path.display()));
        }
    };

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if !line.trim().is_empty() {
            entries.push(unescape_history_line(&line));
        }
    }
    if entries.len() > max {
        entries = entries.split_off(entries.len() - max);
    }
    Ok(entries)
}

/// Rewrite the file with exactly `entries`, e.g. after trimming.
pub fn save(path: &Path, entries: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    for entry in entries {
        writeln!(w, "{}", escape_history_line(entry))?;
    }
    w.flush()?;
    Ok(())
}

fn escape_history_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_history_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
