//! Interactive line editor.
//!
//! [`LineEditor::read_line`] owns the terminal for the duration of one
//! prompt: it enters raw mode, decodes keystrokes into [`Action`]s, applies
//! them to the line buffer, history browser or completer, and repaints. When
//! the input is not a terminal (pipes, files, tests) it reads plain lines
//! instead.

pub mod buffer;
pub mod completion;
pub mod decoder;
pub mod history;
pub mod render;
pub mod terminal;

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::EditorConfig;

use buffer::LineBuffer;
use completion::{Completer, Completion};
use decoder::{Action, Decoder};
use history::HistoryNavigator;
use render::Renderer;
use terminal::{CrosstermMode, InputSource, ModeControl, RawMode};

#[derive(Debug, Error)]
pub enum ReadError {
    /// The input stream closed, or Ctrl-D was pressed on an empty line.
    #[error("end of input")]
    Eof,
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadError::Eof)
    }
}

/// Which key bindings are live for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    /// Yes/no style sub-prompts: editing only, no history or completion.
    Simple,
}

/// What the key loop should do after an action.
enum Flow {
    Continue,
    Submit,
    Cancel,
    EndOfInput,
}

pub struct LineEditor<R: InputSource, W: Write> {
    input: BufReader<R>,
    output: W,
    tty: bool,
    /// Raw-mode switch used when the input is a terminal.
    terminal_mode: Arc<dyn ModeControl>,
    config: EditorConfig,
    renderer: Renderer,
    decoder: Decoder,
    /// Decoded actions not yet applied (typeahead after a submitted line).
    queued: VecDeque<Action>,
    buffer: LineBuffer,
    history: Vec<String>,
    navigator: HistoryNavigator,
    completer: Option<Box<dyn Completer>>,
}

impl<R: InputSource, W: Write> LineEditor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, EditorConfig::default())
    }

    pub fn with_config(input: R, output: W, config: EditorConfig) -> Self {
        let tty = input.is_terminal();
        debug!(tty, "line editor created");
        Self {
            input: BufReader::new(input),
            output,
            tty,
            terminal_mode: Arc::new(CrosstermMode),
            config,
            renderer: Renderer::new(config.theme),
            decoder: Decoder::new(),
            queued: VecDeque::new(),
            buffer: LineBuffer::new(),
            history: Vec::new(),
            navigator: HistoryNavigator::default(),
            completer: None,
        }
    }

    pub fn is_tty(&self) -> bool {
        self.tty
    }

    /// Set the prompt. It may carry color escapes; they do not count toward
    /// its width.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.renderer.set_prompt(prompt);
    }

    /// Replace the history snapshot, oldest entry first.
    pub fn set_history(&mut self, entries: Vec<String>) {
        self.history = entries;
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.completer = Some(Box::new(completer));
    }

    pub fn clear_completer(&mut self) {
        self.completer = None;
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Read one line.
    ///
    /// Returns an empty string when the line is cancelled with Ctrl-C, and
    /// [`ReadError::Eof`] on Ctrl-D at an empty line or when the input
    /// closes.
    pub fn read_line(&mut self) -> Result<String, ReadError> {
        self.read(Mode::Full)
    }

    /// Like [`read_line`](Self::read_line) but without history browsing or
    /// completion, for short confirmation prompts.
    pub fn read_simple_line(&mut self) -> Result<String, ReadError> {
        self.read(Mode::Simple)
    }

    fn read(&mut self, mode: Mode) -> Result<String, ReadError> {
        if !self.tty {
            return self.read_plain_line();
        }
        let Some(mut raw) = RawMode::enter(Arc::clone(&self.terminal_mode)) else {
            return self.read_plain_line();
        };
        let result = self.edit_line(mode);
        let restored = raw.restore();
        let line = result?;
        restored?;
        Ok(line)
    }

    /// Line-at-a-time reading for non-terminal input.
    fn read_plain_line(&mut self) -> Result<String, ReadError> {
        self.output.write_all(self.renderer.prompt().as_bytes())?;
        self.output.flush()?;

        let mut bytes = Vec::new();
        let n = loop {
            match self.input.read_until(b'\n', &mut bytes) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            debug!("input closed");
            return Err(ReadError::Eof);
        }

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        Ok(valid_utf8(&bytes))
    }

    /// The raw-mode key loop. Assumes the terminal is already in raw mode.
    fn edit_line(&mut self, mode: Mode) -> Result<String, ReadError> {
        self.buffer.clear();
        self.navigator.reset(self.history.len());
        self.renderer.begin(&mut self.output)?;

        loop {
            let Some(action) = self.next_action()? else {
                debug!("input closed while editing");
                self.renderer.finish_line(&mut self.output, None)?;
                return Err(ReadError::Eof);
            };
            trace!(?action, "dispatch");

            match self.apply(action, mode)? {
                Flow::Continue => {}
                Flow::Submit => {
                    self.renderer.finish_line(&mut self.output, None)?;
                    return Ok(self.buffer.text());
                }
                Flow::Cancel => {
                    self.renderer.finish_line(&mut self.output, Some("^C"))?;
                    return Ok(String::new());
                }
                Flow::EndOfInput => {
                    self.renderer.finish_line(&mut self.output, None)?;
                    return Err(ReadError::Eof);
                }
            }
        }
    }

    /// Next decoded action, reading more input as needed. `None` once the
    /// stream is exhausted.
    fn next_action(&mut self) -> io::Result<Option<Action>> {
        loop {
            if let Some(action) = self.queued.pop_front() {
                return Ok(Some(action));
            }
            let chunk = match self.input.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if chunk.is_empty() {
                return Ok(self.decoder.finish());
            }
            let len = chunk.len();
            let actions = self.decoder.feed(chunk);
            self.input.consume(len);
            self.queued.extend(actions);
        }
    }

    fn apply(&mut self, action: Action, mode: Mode) -> io::Result<Flow> {
        let out = &mut self.output;
        match action {
            Action::Insert(c) => {
                self.buffer.insert(c);
                self.renderer
                    .tail_redraw(out, &self.buffer, self.buffer.cursor() - 1)?;
            }
            Action::Backspace => {
                if self.buffer.backspace() {
                    self.renderer
                        .tail_redraw(out, &self.buffer, self.buffer.cursor())?;
                }
            }
            Action::DeleteForward => {
                if self.buffer.delete_forward() {
                    self.renderer
                        .tail_redraw(out, &self.buffer, self.buffer.cursor())?;
                }
            }
            Action::EndOfInputOrDelete => {
                if self.buffer.is_empty() {
                    return Ok(Flow::EndOfInput);
                }
                if self.buffer.delete_forward() {
                    self.renderer
                        .tail_redraw(out, &self.buffer, self.buffer.cursor())?;
                }
            }
            Action::KillToEnd => {
                if self.buffer.kill_to_end() {
                    self.renderer
                        .tail_redraw(out, &self.buffer, self.buffer.cursor())?;
                }
            }
            Action::KillToStart => {
                if self.buffer.kill_to_start() {
                    self.renderer.full_redraw(out, &self.buffer)?;
                }
            }
            Action::DeleteWordBackward => {
                if self.buffer.delete_word_backward() {
                    self.renderer.full_redraw(out, &self.buffer)?;
                }
            }
            Action::MoveLeft => {
                if self.buffer.move_left() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::MoveRight => {
                if self.buffer.move_right() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::MoveHome => {
                if self.buffer.move_home() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::MoveEnd => {
                if self.buffer.move_end() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::WordLeft => {
                if self.buffer.word_left() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::WordRight => {
                if self.buffer.word_right() {
                    self.renderer.sync_cursor(out, &self.buffer)?;
                }
            }
            Action::HistoryUp if mode == Mode::Full => {
                if self.navigator.up(&self.history, &mut self.buffer) {
                    self.renderer.full_redraw(out, &self.buffer)?;
                }
            }
            Action::HistoryDown if mode == Mode::Full => {
                if self.navigator.down(&self.history, &mut self.buffer) {
                    self.renderer.full_redraw(out, &self.buffer)?;
                }
            }
            Action::Complete if mode == Mode::Full => {
                let Some(completer) = self.completer.as_deref() else {
                    return Ok(Flow::Continue);
                };
                match completion::complete(&mut self.buffer, completer) {
                    Completion::Nothing => {}
                    Completion::Inserted => self.renderer.full_redraw(out, &self.buffer)?,
                    Completion::Candidates(candidates) => {
                        debug!(count = candidates.len(), "listing completion candidates");
                        let width = self.config.width();
                        self.renderer
                            .show_candidates(out, &self.buffer, &candidates, width)?;
                    }
                }
            }
            Action::HistoryUp | Action::HistoryDown | Action::Complete => {}
            Action::ClearScreen => self.renderer.clear_screen(out, &self.buffer)?,
            Action::Submit => return Ok(Flow::Submit),
            Action::Cancel => return Ok(Flow::Cancel),
        }
        Ok(Flow::Continue)
    }
}

/// Keep the valid UTF-8 runs of `bytes`, dropping malformed sequences.
fn valid_utf8(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            trace!(invalid = ?chunk.invalid(), "dropping malformed UTF-8");
        }
    }
    text
}
