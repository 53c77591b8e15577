//! History browsing over a caller-owned list of past lines.

use super::buffer::LineBuffer;

/// Browsing state for one `read_line` call.
///
/// `index == entries.len()` means "not browsing": the buffer shows the live
/// draft. The entries themselves are never modified here.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    index: usize,
    draft: String,
}

impl HistoryNavigator {
    pub fn new(len: usize) -> Self {
        Self {
            index: len,
            draft: String::new(),
        }
    }

    /// Back to the live draft position for a history of `len` entries.
    pub fn reset(&mut self, len: usize) {
        self.index = len;
        self.draft.clear();
    }

    /// Load the next older entry into `buffer`. Returns false (and leaves
    /// the buffer alone) when there is nothing older.
    pub fn up(&mut self, entries: &[String], buffer: &mut LineBuffer) -> bool {
        // The list may have shrunk since the last reset.
        self.index = self.index.min(entries.len());
        if self.index == 0 {
            return false;
        }
        if self.index == entries.len() {
            self.draft = buffer.text();
        }
        self.index -= 1;
        buffer.set_text(&entries[self.index]);
        true
    }

    /// Load the next newer entry, or the saved draft once past the newest.
    pub fn down(&mut self, entries: &[String], buffer: &mut LineBuffer) -> bool {
        if self.index >= entries.len() {
            return false;
        }
        self.index += 1;
        if self.index == entries.len() {
            buffer.set_text(&self.draft);
        } else {
            buffer.set_text(&entries[self.index]);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries() -> Vec<String> {
        vec!["/build".to_string(), "/check".to_string(), "/help".to_string()]
    }

    #[test]
    fn test_history_navigation() {
        let entries = entries();
        let mut nav = HistoryNavigator::new(entries.len());
        let mut buf = LineBuffer::new();
        buf.set_text("/b");

        let mut seen = Vec::new();
        for _ in 0..3 {
            assert!(nav.up(&entries, &mut buf));
            seen.push(buf.text());
            assert_eq!(buf.cursor(), buf.len());
        }
        assert_eq!(seen, vec!["/help", "/check", "/build"]);

        // Already at the oldest entry.
        assert!(!nav.up(&entries, &mut buf));
        assert_eq!(buf.text(), "/build");

        let mut seen = Vec::new();
        for _ in 0..3 {
            assert!(nav.down(&entries, &mut buf));
            seen.push(buf.text());
        }
        assert_eq!(seen, vec!["/check", "/help", "/b"]);
        // Back at the live draft.
        assert!(!nav.down(&entries, &mut buf));
    }

    #[test]
    fn test_down_at_live_draft_is_noop() {
        let entries = entries();
        let mut nav = HistoryNavigator::new(entries.len());
        let mut buf = LineBuffer::new();
        buf.set_text("draft");
        assert!(!nav.down(&entries, &mut buf));
        assert_eq!(buf.text(), "draft");
    }

    #[test]
    fn test_empty_history() {
        let entries: Vec<String> = Vec::new();
        let mut nav = HistoryNavigator::new(0);
        let mut buf = LineBuffer::new();
        buf.set_text("x");
        assert!(!nav.up(&entries, &mut buf));
        assert!(!nav.down(&entries, &mut buf));
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_draft_captured_only_on_first_up() {
        let entries = entries();
        let mut nav = HistoryNavigator::new(entries.len());
        let mut buf = LineBuffer::new();
        buf.set_text("draft");
        nav.up(&entries, &mut buf);
        // Edits made while browsing do not replace the saved draft.
        buf.insert('!');
        nav.up(&entries, &mut buf);
        nav.down(&entries, &mut buf);
        nav.down(&entries, &mut buf);
        assert_eq!(buf.text(), "draft");
    }

    #[test]
    fn test_reset_returns_to_live_draft() {
        let entries = entries();
        let mut nav = HistoryNavigator::new(entries.len());
        let mut buf = LineBuffer::new();
        buf.set_text("old");
        nav.up(&entries, &mut buf);
        nav.up(&entries, &mut buf);
        assert_eq!(buf.text(), "/check");

        nav.reset(entries.len());
        assert!(!nav.down(&entries, &mut buf));
        buf.set_text("new");
        assert!(nav.up(&entries, &mut buf));
        assert_eq!(buf.text(), "/help");
        assert!(nav.down(&entries, &mut buf));
        assert_eq!(buf.text(), "new");
    }
}
