//! Unified diff output for `--dry-run`.

use similar::{ChangeTag, TextDiff};

/// Renders the line changes between `original` and `modified` with three lines of context.
pub fn unified_diff(original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value().trim_end_matches(['\r', '\n']));
                output.push('\n');
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserted_line_is_marked() {
        let diff = unified_diff("a\nb\n", "a\n[Obsolete]\nb\n");
        assert_eq!(diff, " a\n+[Obsolete]\n b\n");
    }

    #[test]
    fn test_no_changes() {
        assert_eq!(unified_diff("same\n", "same\n"), "");
    }
}
