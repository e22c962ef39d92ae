use crate::buffer::Line;
use regex::Regex;
use std::sync::OnceLock;

/// Whether each line *starts* inside a `/* ... */` comment.
///
/// Tracks `//` comments and single-line `"..."`, `@"..."`, `@$"..."` and `'.'` literals so
/// that comment openers inside them are ignored. Verbatim strings spanning
/// several lines are not followed.
pub(crate) fn block_comment_starts(lines: &[Line]) -> Vec<bool> {
    let mut in_block = false;
    let mut states = Vec::with_capacity(lines.len());

    for line in lines {
        states.push(in_block);
        in_block = scan_line(&line.text, in_block);
    }

    states
}

/// Returns the block-comment state at the end of `text`.
fn scan_line(text: &str, mut in_block: bool) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if in_block {
            if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                in_block = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                in_block = true;
                i += 2;
            }
            b'@' if bytes.get(i + 1) == Some(&b'"') => {
                i = skip_verbatim(bytes, i + 2);
            }
            b'@' if bytes.get(i + 1) == Some(&b'$') && bytes.get(i + 2) == Some(&b'"') => {
                i = skip_verbatim(bytes, i + 3);
            }
            quote @ (b'"' | b'\'') => {
                i = skip_literal(bytes, i + 1, quote);
            }
            _ => i += 1,
        }
    }

    in_block
}

/// Index just past the closing `quote`, honouring backslash escapes.
fn skip_literal(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Index just past the closing quote of a verbatim string (`""` is an escaped quote).
fn skip_verbatim(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Whether `name` is a plain identifier (optionally `@`-escaped).
pub(crate) fn is_identifier(name: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let ident_re = IDENT_RE
        .get_or_init(|| Regex::new(r"^@?[\p{L}_][\p{L}\p{N}_]*$").expect("Invalid regex"));
    ident_re.is_match(name)
}

/// Pattern for a header line: `public <keyword> <name>` as the first text on
/// the line, ending at end of line or a non-identifier character.
pub(crate) fn header_pattern(keyword: &str, name: &str) -> Regex {
    let pattern = format!(
        r"^[ \t]*public {} {}(?:$|[^\p{{L}}\p{{N}}_])",
        regex::escape(keyword),
        regex::escape(name)
    );
    Regex::new(&pattern).expect("Invalid regex")
}

/// Index of the first line of the run directly above `header` made only of
/// attributes, comments and blank lines. Equals `header` when there is none.
///
/// Lines inside an attribute that spans several lines belong to the run.
pub(crate) fn preamble_start(lines: &[Line], header: usize) -> usize {
    let mut top = header;
    // Unmatched `]` seen so far while walking up.
    let mut open: isize = 0;
    while top > 0 {
        let text = &lines[top - 1].text;
        if open <= 0 && !is_preamble(text) {
            break;
        }
        open += text.matches(']').count() as isize - text.matches('[').count() as isize;
        top -= 1;
    }
    top
}

fn is_preamble(text: &str) -> bool {
    let t = text.trim();
    t.is_empty()
        || t.starts_with('[')
        || t.starts_with("//")
        || t.starts_with("/*")
        || t.starts_with('*')
        || t.ends_with(']')
}

/// Start of the lookback window: `lookback` characters before `pos`, moved
/// back to the start of the line it falls in.
pub(crate) fn window_start(body: &str, pos: usize, lookback: usize) -> usize {
    if lookback == 0 {
        return pos;
    }
    let before = &body[..pos];
    let start = before
        .char_indices()
        .rev()
        .nth(lookback - 1)
        .map_or(0, |(i, _)| i);
    before[..start].rfind('\n').map_or(0, |nl| nl + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;

    #[test]
    fn test_block_comment_tracking() {
        let buf = SourceBuffer::parse("a\n/* start\npublic class A\n*/\nb");
        let states = block_comment_starts(buf.lines());
        assert_eq!(states, vec![false, false, true, true, false]);
    }

    #[test]
    fn test_comment_openers_in_literals_are_ignored() {
        let buf = SourceBuffer::parse("var s = \"/*\";\nvar v = @\"C:\\/*\";\n// /*\nx");
        let states = block_comment_starts(buf.lines());
        assert!(states.iter().all(|s| !s));
    }

    #[test]
    fn test_single_line_block_comment_closes() {
        let buf = SourceBuffer::parse("/* one */ x\ny");
        assert_eq!(block_comment_starts(buf.lines()), vec![false, false]);
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_identifier("IFoo"));
        assert!(is_identifier("_Bar2"));
        assert!(is_identifier("@class"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("IFoo<T>"));
        assert!(!is_identifier("2Fast"));
        assert!(!is_identifier("A B"));
    }

    #[test]
    fn test_header_pattern_boundaries() {
        let re = header_pattern("interface", "IFoo");
        assert!(re.is_match("public interface IFoo"));
        assert!(re.is_match("    public interface IFoo : IBar"));
        assert!(re.is_match("public interface IFoo<T>"));
        assert!(re.is_match("public interface IFoo{"));
        assert!(!re.is_match("public interface IFooBar"));
        assert!(!re.is_match("public  interface IFoo"));
        assert!(!re.is_match("// public interface IFoo"));
        assert!(!re.is_match("var s = \"public interface IFoo\";"));
    }

    #[test]
    fn test_preamble_stops_at_code() {
        let buf = SourceBuffer::parse(
            "[Obsolete]\npublic interface IA\n{\n}\n\n/// doc\n[Serializable]\npublic interface IB\n",
        );
        assert_eq!(preamble_start(buf.lines(), 7), 4);
        assert_eq!(preamble_start(buf.lines(), 1), 0);
        assert_eq!(preamble_start(buf.lines(), 2), 2);
    }

    #[test]
    fn test_preamble_spans_multi_line_attribute() {
        let buf = SourceBuffer::parse(
            "}\n[Obsolete(\n    \"long message\",\n    false)]\npublic interface IFoo\n",
        );
        assert_eq!(preamble_start(buf.lines(), 4), 1);
    }

    #[test]
    fn test_verbatim_interpolated_string_keeps_backslash() {
        let buf = SourceBuffer::parse("var p = @$\"C:\\\"; /* x\npublic class A\n*/\n");
        assert_eq!(block_comment_starts(buf.lines()), vec![false, true, true]);
    }

    #[test]
    fn test_window_snaps_to_line_start() {
        let body = "0123456789\nabcdef\nHEADER";
        let pos = body.find("HEADER").unwrap();
        // Three characters back lands inside "abcdef"
        assert_eq!(window_start(body, pos, 3), 11);
        assert_eq!(window_start(body, pos, 1000), 0);
        assert_eq!(window_start(body, pos, 0), pos);
    }
}
