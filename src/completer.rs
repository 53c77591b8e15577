//! Tab completion for the weave shell.
//!
//! The first word completes against the slash commands; later words
//! complete file and directory paths relative to the working directory.

use std::path::{Path, PathBuf};

use crate::editor::completion::Completer;

/// Slash commands understood by the shell.
pub const COMMANDS: &[&str] = &[
    "/build", "/check", "/config", "/connect", "/exit", "/help", "/history", "/open", "/quit",
];

pub struct ShellCompleter {
    /// Current working directory for path completion
    cwd: PathBuf,
    commands: Vec<String>,
}

impl ShellCompleter {
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn complete_command(&self, partial: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(partial))
            .cloned()
            .collect()
    }

    /// Complete file/directory paths. Directories get a trailing `/`.
    fn complete_path(&self, partial: &str) -> Vec<String> {
        // Split into the directory part (kept verbatim in the replacement)
        // and the file-name prefix to match.
        let (dir_part, prefix) = match partial.rfind('/') {
            Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
            None => ("", partial),
        };

        let search_dir = if dir_part.is_empty() {
            self.cwd.clone()
        } else if Path::new(dir_part).is_absolute() {
            PathBuf::from(dir_part)
        } else {
            self.cwd.join(dir_part)
        };

        let Ok(entries) = std::fs::read_dir(&search_dir) else {
            return Vec::new();
        };

        let mut candidates: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.starts_with(prefix) {
                    return None;
                }
                // Hidden entries only when asked for explicitly.
                if name.starts_with('.') && !prefix.starts_with('.') {
                    return None;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let suffix = if is_dir { "/" } else { "" };
                Some(format!("{dir_part}{name}{suffix}"))
            })
            .collect();

        candidates.sort();
        candidates
    }
}

impl Completer for ShellCompleter {
    fn complete(&self, line: &str, cursor: usize) -> Vec<String> {
        let line_to_cursor: String = line.chars().take(cursor).collect();
        let (before, word) = match line_to_cursor.rfind(' ') {
            Some(idx) => (&line_to_cursor[..idx], &line_to_cursor[idx + 1..]),
            None => ("", line_to_cursor.as_str()),
        };

        if before.trim().is_empty() {
            self.complete_command(word)
        } else {
            self.complete_path(word)
        }
    }
}
