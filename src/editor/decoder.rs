//! Keystroke decoding.
//!
//! Raw-mode reads deliver arbitrary slices of the byte stream: a UTF-8 code
//! point or an escape sequence may be split across two reads. [`Decoder`]
//! buffers the unfinished tail of each chunk and turns complete units into
//! [`Action`]s. Dispatching those actions is the editor's job.

use tracing::trace;

const ESC: u8 = 0x1b;

/// Longest CSI sequence accepted before the leading ESC is abandoned.
const MAX_ESCAPE_LEN: usize = 32;

/// One decoded editing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A printable code point.
    Insert(char),
    MoveHome,
    MoveEnd,
    MoveLeft,
    MoveRight,
    WordLeft,
    WordRight,
    Backspace,
    DeleteForward,
    /// Ctrl-D: end of input on an empty line, forward delete otherwise.
    EndOfInputOrDelete,
    KillToEnd,
    KillToStart,
    DeleteWordBackward,
    ClearScreen,
    Complete,
    Submit,
    Cancel,
    HistoryUp,
    HistoryDown,
}

/// Single-byte control codes.
pub fn control_action(byte: u8) -> Option<Action> {
    let action = match byte {
        0x01 => Action::MoveHome,           // Ctrl-A
        0x02 => Action::MoveLeft,           // Ctrl-B
        0x03 => Action::Cancel,             // Ctrl-C
        0x04 => Action::EndOfInputOrDelete, // Ctrl-D
        0x05 => Action::MoveEnd,            // Ctrl-E
        0x06 => Action::MoveRight,          // Ctrl-F
        0x08 => Action::Backspace,          // Ctrl-H
        0x09 => Action::Complete,           // Tab
        0x0a | 0x0d => Action::Submit,      // LF / CR
        0x0b => Action::KillToEnd,          // Ctrl-K
        0x0c => Action::ClearScreen,        // Ctrl-L
        0x0e => Action::HistoryDown,        // Ctrl-N
        0x10 => Action::HistoryUp,          // Ctrl-P
        0x15 => Action::KillToStart,        // Ctrl-U
        0x17 => Action::DeleteWordBackward, // Ctrl-W
        0x7f => Action::Backspace,
        _ => return None,
    };
    Some(action)
}

/// Map an escape sequence payload (the bytes after ESC) to an action.
///
/// Both CSI (`[A`, `[3~`, `[1;5D`) and SS3 (`OA`) forms are understood.
pub fn escape_action(payload: &[u8]) -> Option<Action> {
    let action = match payload {
        b"[A" | b"OA" => Action::HistoryUp,
        b"[B" | b"OB" => Action::HistoryDown,
        b"[C" | b"OC" => Action::MoveRight,
        b"[D" | b"OD" => Action::MoveLeft,
        b"[H" | b"OH" | b"[1~" | b"[7~" => Action::MoveHome,
        b"[F" | b"OF" | b"[4~" | b"[8~" => Action::MoveEnd,
        b"[3~" => Action::DeleteForward,
        b"[1;5C" | b"[5C" => Action::WordRight,
        b"[1;5D" | b"[5D" => Action::WordLeft,
        _ => return None,
    };
    Some(action)
}

enum Step {
    /// `len` bytes were consumed, producing at most one action.
    Done { action: Option<Action>, len: usize },
    /// The unit starting here is not complete yet.
    NeedMore,
}

/// Streaming decoder for raw terminal input.
#[derive(Debug, Default)]
pub struct Decoder {
    pending: Vec<u8>,
    /// The last decoded unit was CR, so an LF right after it is swallowed.
    after_cr: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a partial code point or escape sequence is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Decode a chunk of input. Any unfinished unit at the end of the chunk
    /// is kept and completed by the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        self.pending.extend_from_slice(bytes);

        let mut actions = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            let first = self.pending[pos];
            // A pasted CRLF submits once.
            if first == b'\n' && std::mem::take(&mut self.after_cr) {
                pos += 1;
                continue;
            }
            match decode_one(&self.pending[pos..]) {
                Step::Done { action, len } => {
                    self.after_cr = first == b'\r';
                    actions.extend(action);
                    pos += len;
                }
                Step::NeedMore => break,
            }
        }
        self.pending.drain(..pos);
        actions
    }

    /// Flush whatever is still buffered once the stream has ended.
    ///
    /// A truncated escape sequence is interpreted as-is (which normally
    /// resolves to nothing); a truncated code point is dropped.
    pub fn finish(&mut self) -> Option<Action> {
        self.after_cr = false;
        let rest = std::mem::take(&mut self.pending);
        match rest.split_first() {
            Some((&ESC, payload)) => {
                let action = escape_action(payload);
                trace!(?rest, ?action, "truncated escape sequence at end of input");
                action
            }
            Some(_) => {
                trace!(?rest, "dropping truncated UTF-8 sequence at end of input");
                None
            }
            None => None,
        }
    }
}

fn decode_one(bytes: &[u8]) -> Step {
    let first = bytes[0];
    match first {
        ESC => decode_escape(bytes),
        0x00..=0x1f | 0x7f => {
            let action = control_action(first);
            if action.is_none() {
                trace!(byte = first, "ignoring unmapped control byte");
            }
            Step::Done { action, len: 1 }
        }
        0x20..=0x7e => Step::Done {
            action: Some(Action::Insert(char::from(first))),
            len: 1,
        },
        _ => decode_utf8(bytes),
    }
}

fn decode_escape(bytes: &[u8]) -> Step {
    match bytes.get(1) {
        None => Step::NeedMore,
        Some(b'[') => {
            // CSI: parameters and intermediates until a final byte in 0x40..=0x7e.
            let end = bytes
                .iter()
                .enumerate()
                .skip(2)
                .find(|(_, b)| matches!(**b, 0x40..=0x7e))
                .map(|(i, _)| i);
            match end {
                Some(end) => finish_escape(&bytes[1..=end]),
                None if bytes.len() >= MAX_ESCAPE_LEN => abandon_escape(),
                None => Step::NeedMore,
            }
        }
        Some(b'O') => match bytes.get(2) {
            Some(_) => finish_escape(&bytes[1..3]),
            None => Step::NeedMore,
        },
        // ESC followed by anything else is not a sequence we know: drop the
        // ESC and let the next byte decode on its own.
        Some(_) => abandon_escape(),
    }
}

fn finish_escape(payload: &[u8]) -> Step {
    let action = escape_action(payload);
    if action.is_none() {
        trace!(?payload, "ignoring unknown escape sequence");
    }
    Step::Done {
        action,
        len: payload.len() + 1,
    }
}

fn abandon_escape() -> Step {
    trace!("abandoning escape sequence");
    Step::Done {
        action: None,
        len: 1,
    }
}

fn decode_utf8(bytes: &[u8]) -> Step {
    let width = match bytes[0] {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        // Stray continuation byte or an invalid lead byte.
        other => {
            trace!(byte = other, "dropping invalid UTF-8 byte");
            return Step::Done {
                action: None,
                len: 1,
            };
        }
    };

    for i in 1..width {
        match bytes.get(i) {
            None => return Step::NeedMore,
            Some(b) if b & 0xc0 == 0x80 => {}
            Some(_) => {
                trace!(?bytes, "dropping truncated UTF-8 sequence");
                return Step::Done {
                    action: None,
                    len: i,
                };
            }
        }
    }

    // Catches overlong encodings and surrogates the lead-byte check lets through.
    let action = std::str::from_utf8(&bytes[..width])
        .ok()
        .and_then(|s| s.chars().next())
        .map(Action::Insert);
    if action.is_none() {
        trace!(?bytes, "dropping malformed UTF-8 sequence");
    }
    Step::Done { action, len: width }
}
