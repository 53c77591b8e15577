//! Terminal mode control for the line editor.
//!
//! Raw mode is held by a [`RawMode`] guard. Dropping the guard restores the
//! previous terminal settings, so every exit from the key loop (submit,
//! cancel, an I/O error propagated with `?`) releases it exactly once.

use std::fs::File;
use std::io::{self, Cursor, IsTerminal, Read, Stdin, StdinLock};
use std::sync::Arc;

use crossterm::terminal;
use tracing::{debug, warn};

/// Column count assumed when the terminal size cannot be queried.
const FALLBACK_WIDTH: u16 = 80;

/// A byte stream the editor can read from.
///
/// `is_terminal` gates raw-mode entry: anything that is not a character
/// device is read a line at a time instead.
pub trait InputSource: Read {
    fn is_terminal(&self) -> bool {
        false
    }
}

impl InputSource for Stdin {
    fn is_terminal(&self) -> bool {
        <Self as IsTerminal>::is_terminal(self)
    }
}

impl InputSource for StdinLock<'_> {
    fn is_terminal(&self) -> bool {
        <Self as IsTerminal>::is_terminal(self)
    }
}

impl InputSource for File {
    fn is_terminal(&self) -> bool {
        <Self as IsTerminal>::is_terminal(self)
    }
}

impl<T: AsRef<[u8]>> InputSource for Cursor<T> {}

impl InputSource for &[u8] {}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Switches the terminal in and out of raw mode.
pub trait ModeControl: Send + Sync {
    fn enable(&self) -> io::Result<()>;
    fn disable(&self) -> io::Result<()>;
}

/// Raw mode through crossterm on the process's controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermMode;

impl ModeControl for CrosstermMode {
    fn enable(&self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable(&self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

/// Raw mode held for one read, released on drop.
pub struct RawMode {
    control: Arc<dyn ModeControl>,
    active: bool,
}

impl RawMode {
    /// Switch the terminal into raw mode.
    ///
    /// Returns `None` when the platform refuses (no controlling terminal,
    /// unsupported device). That is not an error for the editor: the caller
    /// falls back to plain line reading.
    pub fn enter(control: Arc<dyn ModeControl>) -> Option<Self> {
        match control.enable() {
            Ok(()) => {
                debug!("raw mode enabled");
                Some(Self {
                    control,
                    active: true,
                })
            }
            Err(e) => {
                debug!(error = %e, "raw mode unavailable, falling back to line reading");
                None
            }
        }
    }

    /// Restore the original terminal settings. Only the first call does
    /// anything; later calls (including the one from `Drop`) are no-ops.
    pub fn restore(&mut self) -> io::Result<()> {
        if !std::mem::take(&mut self.active) {
            return Ok(());
        }
        debug!("raw mode disabled");
        self.control.disable()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Current terminal width in columns, or 80 when it cannot be determined.
pub fn terminal_width() -> u16 {
    terminal::size()
        .ok()
        .map(|(cols, _)| cols)
        .filter(|cols| *cols > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::ModeControl;

    /// Counts enable/disable calls instead of touching a terminal.
    #[derive(Debug, Default)]
    pub(crate) struct CountingMode {
        enabled: AtomicUsize,
        disabled: AtomicUsize,
        refuse: bool,
    }

    impl CountingMode {
        pub(crate) fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        pub(crate) fn enabled(&self) -> usize {
            self.enabled.load(Ordering::SeqCst)
        }

        pub(crate) fn disabled(&self) -> usize {
            self.disabled.load(Ordering::SeqCst)
        }
    }

    impl ModeControl for CountingMode {
        fn enable(&self) -> io::Result<()> {
            if self.refuse {
                return Err(io::Error::new(io::ErrorKind::Unsupported, "not a terminal"));
            }
            self.enabled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn disable(&self) -> io::Result<()> {
            self.disabled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
