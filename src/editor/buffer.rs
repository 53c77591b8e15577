//! Cursor-addressed line buffer.
//!
//! The buffer stores code points, not bytes, so the cursor is always a
//! code-point offset with `0 <= cursor <= len`. Every mutating method
//! leaves that invariant intact and reports whether anything changed.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.chars.len()
    }

    /// Replace the whole content and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn insert(&mut self, c: char) {
        if self.at_end() {
            self.chars.push(c);
        } else {
            self.chars.insert(self.cursor, c);
        }
        self.cursor += 1;
    }

    /// Replace `start..cursor` with `text` and leave the cursor after it.
    /// Everything after the cursor is kept.
    pub fn splice_before_cursor(&mut self, start: usize, text: &str) {
        let start = start.min(self.cursor);
        let end = self.cursor;
        self.chars.splice(start..end, text.chars());
        self.cursor = start + text.chars().count();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn kill_to_end(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.chars.truncate(self.cursor);
        true
    }

    pub fn kill_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.chars.drain(..self.cursor);
        self.cursor = 0;
        true
    }

    /// Ctrl-W.
    ///
    /// When spaces sit directly left of the cursor only that run of spaces
    /// is removed; otherwise the run of non-space characters is. Clearing
    /// `"hello   world"` back to `"world"` therefore takes two calls.
    pub fn delete_word_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = if self.chars[self.cursor - 1] == ' ' {
            self.run_start(|c| c == ' ')
        } else {
            self.run_start(|c| c != ' ')
        };
        self.chars.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Offset where the run of characters matching `pred` that ends at the
    /// cursor begins.
    fn run_start(&self, pred: impl Fn(char) -> bool) -> usize {
        let mut pos = self.cursor;
        while pos > 0 && pred(self.chars[pos - 1]) {
            pos -= 1;
        }
        pos
    }

    /// Start of the word the cursor is in or just after (no spaces skipped).
    pub fn word_start(&self) -> usize {
        self.run_start(|c| c != ' ')
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_home(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn move_end(&mut self) -> bool {
        let moved = !self.at_end();
        self.cursor = self.chars.len();
        moved
    }

    pub fn word_left(&mut self) -> bool {
        let before = self.cursor;
        while self.cursor > 0 && self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
        self.cursor != before
    }

    pub fn word_right(&mut self) -> bool {
        let before = self.cursor;
        let len = self.chars.len();
        while self.cursor < len && self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        while self.cursor < len && !self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        self.cursor != before
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn buffer(text: &str) -> LineBuffer {
        let mut buf = LineBuffer::new();
        buf.set_text(text);
        buf
    }

    #[test]
    fn test_line_buffer_insert() {
        let mut buf = LineBuffer::new();
        buf.insert('h');
        buf.insert('i');
        assert_eq!(buf.text(), "hi");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut buf = buffer("hllo");
        buf.move_home();
        buf.move_right();
        buf.insert('e');
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_line_buffer_backspace() {
        let mut buf = buffer("hello");
        assert!(buf.backspace());
        assert_eq!(buf.text(), "hell");
        buf.move_home();
        assert!(!buf.backspace());
        assert_eq!(buf.text(), "hell");
    }

    #[test]
    fn test_insert_then_backspace_restores_state() {
        let mut buf = buffer("abc");
        buf.move_left();
        let before = buf.clone();
        buf.insert('ß');
        buf.backspace();
        assert_eq!(buf, before);
    }

    #[test]
    fn test_delete_forward() {
        let mut buf = buffer("abc");
        assert!(!buf.delete_forward());
        buf.move_home();
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "bc");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_moves_are_noops_at_boundaries() {
        let mut buf = buffer("ab");
        assert!(!buf.move_right());
        assert_eq!(buf.cursor(), 2);
        buf.move_home();
        assert!(!buf.move_left());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_kill_to_end_and_start() {
        let mut buf = buffer("/open file");
        buf.move_home();
        for _ in 0..5 {
            buf.move_right();
        }
        assert!(buf.kill_to_end());
        assert_eq!(buf.text(), "/open");
        assert_eq!(buf.cursor(), 5);

        let mut buf = buffer("/open file");
        for _ in 0..4 {
            buf.move_left();
        }
        assert!(buf.kill_to_start());
        assert_eq!(buf.text(), "file");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_delete_word_backward_at_end() {
        let mut buf = buffer("/open examples/task");
        assert!(buf.delete_word_backward());
        assert_eq!(buf.text(), "/open ");
        assert_eq!(buf.cursor(), 6);
    }

    #[test]
    fn test_delete_word_backward_over_spaces_takes_two_calls() {
        let mut buf = buffer("hello   world");
        for _ in 0.."world".len() {
            buf.move_left();
        }
        assert!(buf.delete_word_backward());
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), 5);
        assert!(buf.delete_word_backward());
        assert_eq!(buf.text(), "world");
        assert_eq!(buf.cursor(), 0);
        assert!(!buf.delete_word_backward());
    }

    #[test]
    fn test_word_motion() {
        let mut buf = buffer("/open  examples/task now");
        assert!(buf.word_left());
        assert_eq!(buf.cursor(), 21);
        assert!(buf.word_left());
        assert_eq!(buf.cursor(), 7);
        assert!(buf.word_right());
        assert_eq!(buf.cursor(), 20);
        buf.move_end();
        assert!(!buf.word_right());
    }

    #[test]
    fn test_splice_before_cursor_keeps_tail() {
        let mut buf = buffer("/b rest");
        for _ in 0..5 {
            buf.move_left();
        }
        buf.splice_before_cursor(0, "/build");
        assert_eq!(buf.text(), "/build rest");
        assert_eq!(buf.cursor(), 6);
    }

    #[test]
    fn test_multibyte_code_points() {
        let mut buf = buffer("héllo");
        assert_eq!(buf.len(), 5);
        buf.move_home();
        buf.move_right();
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "hllo");
        assert_eq!(buf.cursor(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        Backspace,
        DeleteForward,
        KillToEnd,
        KillToStart,
        DeleteWord,
        Left,
        Right,
        Home,
        End,
        WordLeft,
        WordRight,
        Splice(usize, String),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::sample::select(vec!['a', ' ', 'é', '世', '/']).prop_map(Op::Insert),
            Just(Op::Backspace),
            Just(Op::DeleteForward),
            Just(Op::KillToEnd),
            Just(Op::KillToStart),
            Just(Op::DeleteWord),
            Just(Op::Left),
            Just(Op::Right),
            Just(Op::Home),
            Just(Op::End),
            Just(Op::WordLeft),
            Just(Op::WordRight),
            (0usize..20, "[a-z ]{0,4}").prop_map(|(start, s)| Op::Splice(start, s)),
        ]
    }

    proptest! {
        #[test]
        fn test_cursor_stays_in_bounds(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut buf = LineBuffer::new();
            for op in ops {
                match op {
                    Op::Insert(c) => buf.insert(c),
                    Op::Backspace => { buf.backspace(); }
                    Op::DeleteForward => { buf.delete_forward(); }
                    Op::KillToEnd => { buf.kill_to_end(); }
                    Op::KillToStart => { buf.kill_to_start(); }
                    Op::DeleteWord => { buf.delete_word_backward(); }
                    Op::Left => { buf.move_left(); }
                    Op::Right => { buf.move_right(); }
                    Op::Home => { buf.move_home(); }
                    Op::End => { buf.move_end(); }
                    Op::WordLeft => { buf.word_left(); }
                    Op::WordRight => { buf.word_right(); }
                    Op::Splice(start, s) => buf.splice_before_cursor(start, &s),
                }
                prop_assert!(buf.cursor() <= buf.len());
            }
        }
    }
}
