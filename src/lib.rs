//! Weave shell - an interactive line editor and the shell built on it
//!
//! Features:
//! - Raw-mode line editing with Emacs-style keys
//! - History browsing that keeps the line being typed
//! - Tab completion with common-prefix expansion
//! - Plain line reading when input is not a terminal

pub mod completer;
pub mod config;
pub mod editor;
pub mod history_file;
pub mod logging;

pub use editor::completion::Completer;
pub use editor::{LineEditor, ReadError};
