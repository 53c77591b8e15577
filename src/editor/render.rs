//! Screen updates for the line editor.
//!
//! The renderer tracks where the terminal cursor is (in columns past the
//! prompt) and how wide the drawn line is, so edits at or after the cursor
//! can be patched by rewriting just the tail. The cursor is always moved
//! with relative escape codes.

use std::cmp::Ordering;
use std::io::{self, Write};

use crossterm::{
    cursor::{MoveLeft, MoveRight, MoveTo},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

use super::buffer::LineBuffer;
use super::completion::layout_columns;

/// Presentation settings, passed in explicitly rather than read from
/// process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Emit color escapes. When off, escapes embedded in the prompt are
    /// stripped before drawing.
    pub color: bool,
}

impl Theme {
    pub fn plain() -> Self {
        Self { color: false }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self { color: true }
    }
}

#[derive(Debug)]
pub struct Renderer {
    theme: Theme,
    prompt: String,
    prompt_width: usize,
    /// Terminal cursor column, relative to the end of the prompt.
    cursor_col: usize,
    /// Width of the buffer as currently drawn.
    line_width: usize,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            prompt: String::new(),
            prompt_width: 0,
            cursor_col: 0,
            line_width: 0,
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = if self.theme.color {
            prompt.to_string()
        } else {
            strip_escapes(prompt)
        };
        self.prompt_width = visible_width(&self.prompt);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_width(&self) -> usize {
        self.prompt_width
    }

    /// Print the prompt for a fresh, empty line.
    pub fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.cursor_col = 0;
        self.line_width = 0;
        queue!(out, Print(&self.prompt))?;
        out.flush()
    }

    /// Clear the line and draw prompt and buffer from scratch.
    pub fn full_redraw<W: Write>(&mut self, out: &mut W, buffer: &LineBuffer) -> io::Result<()> {
        let text = buffer.text();
        queue!(
            out,
            Print('\r'),
            Clear(ClearType::CurrentLine),
            Print(&self.prompt),
            Print(&text)
        )?;
        self.line_width = chars_width(buffer.chars());
        self.cursor_col = self.line_width;
        self.move_to(out, chars_width(&buffer.chars()[..buffer.cursor()]))?;
        out.flush()
    }

    /// Redraw from code-point offset `from` to the end of the line.
    ///
    /// Everything before `from` must be unchanged on screen. Used after
    /// inserts and deletes at or after the cursor.
    pub fn tail_redraw<W: Write>(
        &mut self,
        out: &mut W,
        buffer: &LineBuffer,
        from: usize,
    ) -> io::Result<()> {
        let chars = buffer.chars();
        let from = from.min(chars.len());
        self.move_to(out, chars_width(&chars[..from]))?;

        let tail: String = chars[from..].iter().collect();
        let width = chars_width(chars);
        queue!(out, Print(&tail))?;
        if width < self.line_width {
            queue!(out, Clear(ClearType::UntilNewLine))?;
        }
        self.cursor_col = width;
        self.line_width = width;

        self.move_to(out, chars_width(&chars[..buffer.cursor()]))?;
        out.flush()
    }

    /// Move the terminal cursor to the buffer's cursor without redrawing.
    pub fn sync_cursor<W: Write>(&mut self, out: &mut W, buffer: &LineBuffer) -> io::Result<()> {
        self.move_to(out, chars_width(&buffer.chars()[..buffer.cursor()]))?;
        out.flush()
    }

    pub fn clear_screen<W: Write>(&mut self, out: &mut W, buffer: &LineBuffer) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.full_redraw(out, buffer)
    }

    /// List completion candidates below the line, then redraw the line.
    pub fn show_candidates<W: Write>(
        &mut self,
        out: &mut W,
        buffer: &LineBuffer,
        candidates: &[String],
        width: usize,
    ) -> io::Result<()> {
        queue!(out, Print("\r\n"))?;
        for row in layout_columns(candidates, width) {
            if self.theme.color {
                queue!(
                    out,
                    SetAttribute(Attribute::Dim),
                    Print(row),
                    SetAttribute(Attribute::NormalIntensity),
                    Print("\r\n")
                )?;
            } else {
                queue!(out, Print(row), Print("\r\n"))?;
            }
        }
        self.full_redraw(out, buffer)
    }

    /// Leave the edited line, optionally echoing a marker such as `^C`.
    pub fn finish_line<W: Write>(&mut self, out: &mut W, marker: Option<&str>) -> io::Result<()> {
        if let Some(marker) = marker {
            queue!(out, Print(marker))?;
        }
        queue!(out, Print("\r\n"))?;
        self.cursor_col = 0;
        self.line_width = 0;
        out.flush()
    }

    fn move_to<W: Write>(&mut self, out: &mut W, target: usize) -> io::Result<()> {
        match target.cmp(&self.cursor_col) {
            Ordering::Less => queue!(out, MoveLeft(clamp_u16(self.cursor_col - target)))?,
            Ordering::Greater => queue!(out, MoveRight(clamp_u16(target - self.cursor_col)))?,
            Ordering::Equal => {}
        }
        self.cursor_col = target;
        Ok(())
    }
}

fn clamp_u16(value: usize) -> u16 {
    value.min(u16::MAX as usize) as u16
}

fn chars_width(chars: &[char]) -> usize {
    chars
        .iter()
        .map(|c| UnicodeWidthChar::width(*c).unwrap_or(0))
        .sum()
}

/// Terminal columns taken by `s`. Escape sequences take none: an ESC starts
/// a skip that ends at the next ASCII letter or `~`.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            in_escape = !ends_escape(c);
            continue;
        }
        if c == '\x1b' {
            in_escape = true;
            continue;
        }
        width += UnicodeWidthChar::width(c).unwrap_or(0);
    }
    width
}

/// `s` with escape sequences removed, using the same rule as [`visible_width`].
pub fn strip_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            in_escape = !ends_escape(c);
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            out.push(c);
        }
    }
    out
}

fn ends_escape(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '~'
}
