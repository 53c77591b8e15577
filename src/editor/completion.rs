//! Tab completion.
//!
//! The editor owns none of the completion logic's knowledge: a [`Completer`]
//! supplies candidates for the line and cursor, and this module decides
//! whether to insert, partially insert, or list them.

use unicode_width::UnicodeWidthStr;

use super::buffer::LineBuffer;

/// Produces completion candidates for `line` with the cursor at code-point
/// offset `cursor`. Implementations must not have side effects.
pub trait Completer {
    fn complete(&self, line: &str, cursor: usize) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&str, usize) -> Vec<String>,
{
    fn complete(&self, line: &str, cursor: usize) -> Vec<String> {
        self(line, cursor)
    }
}

/// What a Tab press did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No candidates.
    Nothing,
    /// The current word was replaced (single match or longer common prefix).
    Inserted,
    /// Ambiguous: the candidates should be listed and the line left as is.
    Candidates(Vec<String>),
}

/// Run `completer` against the buffer and apply the result.
pub fn complete(buffer: &mut LineBuffer, completer: &dyn Completer) -> Completion {
    let line = buffer.text();
    let candidates = completer.complete(&line, buffer.cursor());
    let word_start = buffer.word_start();
    let word_len = buffer.cursor() - word_start;

    match candidates.as_slice() {
        [] => Completion::Nothing,
        [only] => {
            buffer.splice_before_cursor(word_start, only);
            Completion::Inserted
        }
        _ => {
            let prefix = common_prefix(&candidates);
            if prefix.chars().count() > word_len {
                buffer.splice_before_cursor(word_start, &prefix);
                Completion::Inserted
            } else {
                Completion::Candidates(candidates)
            }
        }
    }
}

/// Longest prefix shared by every candidate, compared per code point.
pub fn common_prefix(candidates: &[String]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let mut prefix_len = first.chars().count();
    for candidate in rest {
        let common = first
            .chars()
            .zip(candidate.chars())
            .take_while(|(a, b)| a == b)
            .count();
        prefix_len = prefix_len.min(common);
    }
    first.chars().take(prefix_len).collect()
}

/// Lay candidates out in rows of equal-width columns that fit in `width`.
///
/// Each column is as wide as the longest candidate plus two spaces; at least
/// one column is always used. Candidates fill rows left to right. Trailing
/// padding is trimmed from each row.
pub fn layout_columns(candidates: &[String], width: usize) -> Vec<String> {
    let longest = candidates.iter().map(|c| c.width()).max().unwrap_or(0);
    let col_width = longest + 2;
    let columns = (width / col_width).max(1);

    candidates
        .chunks(columns)
        .map(|row| {
            let mut line = String::new();
            for candidate in row {
                line.push_str(candidate);
                let pad = col_width - candidate.width();
                line.extend(std::iter::repeat(' ').take(pad));
            }
            line.truncate(line.trim_end().len());
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer(text: &str) -> LineBuffer {
        let mut buf = LineBuffer::new();
        buf.set_text(text);
        buf
    }

    fn fixed(candidates: &'static [&'static str]) -> impl Fn(&str, usize) -> Vec<String> {
        move |_, _| candidates.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_common_prefix_completion() {
        let mut buf = buffer("/c");
        let result = complete(&mut buf, &fixed(&["/connect", "/config"]));
        assert_eq!(result, Completion::Inserted);
        assert_eq!(buf.text(), "/con");
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn test_single_match_completion() {
        let mut buf = buffer("/b");
        let result = complete(&mut buf, &fixed(&["/build"]));
        assert_eq!(result, Completion::Inserted);
        assert_eq!(buf.text(), "/build");
        assert_eq!(buf.cursor(), 6);
    }

    #[test]
    fn test_single_match_preserves_tail() {
        let mut buf = buffer("/open exa rest");
        for _ in 0.." rest".len() {
            buf.move_left();
        }
        let result = complete(&mut buf, &fixed(&["examples/"]));
        assert_eq!(result, Completion::Inserted);
        assert_eq!(buf.text(), "/open examples/ rest");
        assert_eq!(buf.cursor(), "/open examples/".len());
    }

    #[test]
    fn test_ambiguous_at_common_prefix_lists_candidates() {
        let mut buf = buffer("/con");
        let result = complete(&mut buf, &fixed(&["/connect", "/config"]));
        assert_eq!(
            result,
            Completion::Candidates(vec!["/connect".to_string(), "/config".to_string()])
        );
        assert_eq!(buf.text(), "/con");
    }

    #[test]
    fn test_no_common_prefix_lists_candidates() {
        let mut buf = buffer("");
        let result = complete(&mut buf, &fixed(&["/help", "quit"]));
        assert!(matches!(result, Completion::Candidates(ref c) if c.len() == 2));
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_no_candidates() {
        let mut buf = buffer("/zzz");
        assert_eq!(complete(&mut buf, &fixed(&[])), Completion::Nothing);
        assert_eq!(buf.text(), "/zzz");
    }

    #[test]
    fn test_completer_receives_line_and_cursor() {
        let mut buf = buffer("/open ex");
        buf.move_left();
        let completer = |line: &str, cursor: usize| -> Vec<String> {
            assert_eq!(line, "/open ex");
            assert_eq!(cursor, 7);
            Vec::new()
        };
        assert_eq!(complete(&mut buf, &completer), Completion::Nothing);
    }

    #[test]
    fn test_common_prefix() {
        let list = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(common_prefix(&list(&["/connect", "/config", "/con"])), "/con");
        assert_eq!(common_prefix(&list(&["abc", "xyz"])), "");
        assert_eq!(common_prefix(&list(&["été", "étage"])), "ét");
        assert_eq!(common_prefix(&[]), "");
    }

    #[test]
    fn test_layout_columns() {
        let candidates: Vec<String> = ["/build", "/check", "/config", "/connect", "/help"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // Longest is 8 wide, so columns are 10 wide and 3 fit in 30.
        assert_eq!(
            layout_columns(&candidates, 30),
            vec!["/build    /check    /config", "/connect  /help"]
        );
        // Narrower than one column still yields one candidate per row.
        assert_eq!(layout_columns(&candidates, 4).len(), 5);
    }
}
