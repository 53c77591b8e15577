//! Configuration for the editor and the shell around it.
//!
//! The editor only sees [`EditorConfig`]; everything read from the
//! environment goes through [`ShellConfig`] so it can be tested without
//! touching process state.

use std::env;
use std::path::PathBuf;

use crate::editor::render::Theme;
use crate::editor::terminal::terminal_width;

const DEFAULT_HISTORY_MAX: usize = 5000;
const HISTORY_FILE_NAME: &str = ".weave_history";
const LOG_FILE_NAME: &str = "weave.log";

#[derive(Debug, Clone, Copy, Default)]
pub struct EditorConfig {
    pub theme: Theme,
    /// Overrides the terminal size probe when laying out completion lists.
    pub terminal_width: Option<u16>,
}

impl EditorConfig {
    pub fn width(&self) -> usize {
        usize::from(self.terminal_width.unwrap_or_else(terminal_width))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub color: bool,
    pub history_path: PathBuf,
    pub history_max: usize,
    /// `EnvFilter` directives; logging is off when unset.
    pub log_filter: Option<String>,
    pub log_file: PathBuf,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // https://no-color.org: any non-empty value disables color.
        let color = non_empty("NO_COLOR").is_none();

        let home = dirs::home_dir();
        let history_path = non_empty("WEAVE_HISTORY")
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(HISTORY_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME));

        let history_max = non_empty("WEAVE_HISTORY_MAX")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_HISTORY_MAX);

        let log_file = non_empty("WEAVE_LOG_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::data_local_dir().map(|d| d.join("weave").join(LOG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));

        Self {
            color,
            history_path,
            history_max,
            log_filter: non_empty("WEAVE_LOG"),
            log_file,
        }
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            theme: Theme { color: self.color },
            terminal_width: None,
        }
    }
}
