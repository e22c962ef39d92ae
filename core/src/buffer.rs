#![deny(missing_docs)]

//! # Source Buffer
//!
//! A file's content as an ordered sequence of lines that keep their own
//! terminators, so that reassembling the buffer is byte-identical to the input.

use std::fmt;

const BOM: char = '\u{feff}';

/// One line of a buffer: its text and its terminator (`"\n"`, `"\r\n"` or `""`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Text without the terminator.
    pub text: String,
    /// Terminator exactly as it appeared in the source.
    pub ending: &'static str,
}

impl Line {
    /// Leading whitespace of the line, copied verbatim.
    pub fn indent(&self) -> &str {
        indent_of(&self.text)
    }
}

/// Full content of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceBuffer {
    bom: bool,
    lines: Vec<Line>,
}

impl SourceBuffer {
    /// Splits `source` into lines, remembering a leading byte-order mark.
    pub fn parse(source: &str) -> Self {
        let (bom, body) = match source.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, source),
        };

        let lines = body
            .split_inclusive('\n')
            .map(|raw| {
                if let Some(text) = raw.strip_suffix("\r\n") {
                    Line {
                        text: text.to_string(),
                        ending: "\r\n",
                    }
                } else if let Some(text) = raw.strip_suffix('\n') {
                    Line {
                        text: text.to_string(),
                        ending: "\n",
                    }
                } else {
                    Line {
                        text: raw.to_string(),
                        ending: "",
                    }
                }
            })
            .collect();

        Self { bom, lines }
    }

    /// Lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines (a trailing terminator does not open an extra line).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True for an empty file.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Terminator of the first terminated line, `"\n"` if there is none.
    pub fn dominant_ending(&self) -> &'static str {
        self.lines
            .iter()
            .map(|l| l.ending)
            .find(|e| !e.is_empty())
            .unwrap_or("\n")
    }

    /// Byte offset (excluding the BOM) at which each line starts.
    pub fn line_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.lines.len());
        let mut pos = 0;
        for line in &self.lines {
            offsets.push(pos);
            pos += line.text.len() + line.ending.len();
        }
        offsets
    }

    /// The body text (everything after the BOM).
    pub fn body(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.ending);
        }
        out
    }

    /// Returns a new buffer with `text` inserted as line `index`.
    ///
    /// The new line takes the terminator of the line it is pushed down; an
    /// unterminated final line lends the buffer's dominant terminator instead.
    pub fn insert_line(&self, index: usize, text: &str) -> Self {
        let ending = match self.lines.get(index) {
            Some(line) if !line.ending.is_empty() => line.ending,
            _ => self.dominant_ending(),
        };

        let mut lines = self.lines.clone();
        lines.insert(
            index.min(lines.len()),
            Line {
                text: text.to_string(),
                ending,
            },
        );

        Self {
            bom: self.bom,
            lines,
        }
    }
}

impl fmt::Display for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bom {
            write!(f, "{}", BOM)?;
        }
        for line in &self.lines {
            write!(f, "{}{}", line.text, line.ending)?;
        }
        Ok(())
    }
}

/// Leading whitespace of `text`.
pub fn indent_of(text: &str) -> &str {
    let trimmed = text.trim_start_matches([' ', '\t']);
    &text[..text.len() - trimmed.len()]
}
