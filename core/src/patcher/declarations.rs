use crate::buffer::SourceBuffer;
use crate::error::{AppError, AppResult};
use crate::marker::Marker;
use crate::patcher::common::{
    block_comment_starts, header_pattern, is_identifier, preamble_start, window_start,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Characters inspected above a header when looking for an existing marker.
pub const DEFAULT_LOOKBACK: usize = 100;

/// The declaration keywords the patcher recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// `public interface Name`
    Interface,
    /// `public class Name`
    Class,
}

impl DeclarationKind {
    /// Keyword as written in source.
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Interface => "interface",
            DeclarationKind::Class => "class",
        }
    }
}

impl FromStr for DeclarationKind {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interface" => Ok(DeclarationKind::Interface),
            "class" => Ok(DeclarationKind::Class),
            _ => Err(AppError::UnsupportedKind(s.to_string())),
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What to find and what to put above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationTarget {
    kind: DeclarationKind,
    name: String,
    marker: Marker,
}

impl DeclarationTarget {
    /// Builds a target, rejecting names that are not plain identifiers.
    pub fn new(kind: DeclarationKind, name: impl Into<String>, marker: Marker) -> AppResult<Self> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(AppError::InvalidTarget(format!(
                "'{}' is not a valid {} name",
                name, kind
            )));
        }
        Ok(Self { kind, name, marker })
    }

    /// Declaration keyword.
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Declaration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute to insert.
    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

/// Outcome of searching a buffer for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    /// No header for the target in this buffer.
    NotFound,
    /// The header exists and its marker is already above it.
    AlreadyMarked {
        /// 0-based index of the header line.
        line: usize,
    },
    /// The header exists and is unmarked.
    FoundAt {
        /// 0-based index of the header line, which is also where the marker goes.
        line: usize,
        /// Leading whitespace of the header line.
        indent: String,
    },
}

/// Tuning for `locate` / `patch_with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Size of the lookback window, in characters.
    pub lookback: usize,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

/// A patched buffer together with what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    /// Resulting text; identical to the input unless `outcome` is `FoundAt`.
    pub content: String,
    /// Result of the search.
    pub outcome: MatchResult,
}

impl Patched {
    /// True when a marker line was inserted.
    pub fn changed(&self) -> bool {
        matches!(self.outcome, MatchResult::FoundAt { .. })
    }
}

/// Finds the first header for `target` and reports whether it is marked.
pub fn locate(
    buffer: &SourceBuffer,
    target: &DeclarationTarget,
    options: &PatchOptions,
) -> MatchResult {
    let header_re = header_pattern(target.kind.keyword(), &target.name);
    let in_comment = block_comment_starts(buffer.lines());

    let found = buffer
        .lines()
        .iter()
        .zip(&in_comment)
        .position(|(line, inside)| !*inside && header_re.is_match(&line.text));

    let Some(index) = found else {
        debug!(kind = %target.kind, name = %target.name, "declaration not found");
        return MatchResult::NotFound;
    };

    let indent = buffer.lines()[index].indent().to_string();
    let body = buffer.body();
    let offsets = buffer.line_offsets();
    let header_pos = offsets[index] + indent.len();
    // Measured from the start of the header line, never reaching past this
    // header's attributes and comments.
    let start = window_start(&body, offsets[index], options.lookback)
        .max(offsets[preamble_start(buffer.lines(), index)]);
    let window = &body[start..header_pos];
    trace!(line = index, window = %window, "inspecting lookback window");

    if target.marker.is_present_in(window) {
        debug!(name = %target.name, line = index, "declaration already marked");
        return MatchResult::AlreadyMarked { line: index };
    }

    debug!(name = %target.name, line = index, "declaration found");
    MatchResult::FoundAt {
        line: index,
        indent,
    }
}

/// Inserts the marker above the target's header using default options.
pub fn patch(source: &str, target: &DeclarationTarget) -> Patched {
    patch_with(source, target, &PatchOptions::default())
}

/// Inserts the marker above the target's header.
///
/// The marker line sits directly above the header, below any documentation
/// block or other attributes, and reuses the header's indentation and line
/// terminator. Every other line is left untouched.
pub fn patch_with(source: &str, target: &DeclarationTarget, options: &PatchOptions) -> Patched {
    let buffer = SourceBuffer::parse(source);
    let outcome = locate(&buffer, target, options);

    let content = match &outcome {
        MatchResult::FoundAt { line, indent } => {
            let marker_line = format!("{}{}", indent, target.marker.render());
            buffer.insert_line(*line, &marker_line).to_string()
        }
        _ => source.to_string(),
    };

    Patched { content, outcome }
}

/// Decodes `bytes` as UTF-8, then behaves like `patch_with`.
pub fn patch_bytes(
    bytes: &[u8],
    target: &DeclarationTarget,
    options: &PatchOptions,
) -> AppResult<Patched> {
    let source = std::str::from_utf8(bytes)?;
    Ok(patch_with(source, target, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obsolete(kind: DeclarationKind, name: &str) -> DeclarationTarget {
        DeclarationTarget::new(kind, name, Marker::obsolete("Not used.", false)).unwrap()
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "interface".parse::<DeclarationKind>().unwrap(),
            DeclarationKind::Interface
        );
        assert_eq!(
            " Class ".parse::<DeclarationKind>().unwrap(),
            DeclarationKind::Class
        );
        let err = "struct".parse::<DeclarationKind>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedKind(k) if k == "struct"));
    }

    #[test]
    fn test_target_rejects_bad_names() {
        let marker = Marker::new("Obsolete");
        assert!(matches!(
            DeclarationTarget::new(DeclarationKind::Class, "", marker.clone()),
            Err(AppError::InvalidTarget(_))
        ));
        assert!(DeclarationTarget::new(DeclarationKind::Class, "Foo Bar", marker).is_err());
    }

    #[test]
    fn test_empty_buffer_not_found() {
        let res = patch("", &obsolete(DeclarationKind::Class, "A"));
        assert_eq!(res.outcome, MatchResult::NotFound);
        assert_eq!(res.content, "");
    }

    #[test]
    fn test_simple_class() {
        let code = "namespace N;\n\npublic class A\n{\n}\n";
        let res = patch(code, &obsolete(DeclarationKind::Class, "A"));
        assert!(res.changed());
        assert_eq!(
            res.content,
            "namespace N;\n\n[Obsolete(\"Not used.\", false)]\npublic class A\n{\n}\n"
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let code = "public class A\n{\n}\npublic class A\n{\n}\n";
        let res = patch(code, &obsolete(DeclarationKind::Class, "A"));
        assert_eq!(
            res.outcome,
            MatchResult::FoundAt {
                line: 0,
                indent: String::new()
            }
        );
    }

    #[test]
    fn test_kind_must_match() {
        let code = "public class IFoo\n{\n}\n";
        let res = patch(code, &obsolete(DeclarationKind::Interface, "IFoo"));
        assert_eq!(res.outcome, MatchResult::NotFound);
        assert_eq!(res.content, code);
    }

    #[test]
    fn test_skips_header_in_block_comment() {
        let code = "/*\npublic class A\n*/\npublic class A\n{\n}\n";
        let res = patch(code, &obsolete(DeclarationKind::Class, "A"));
        assert_eq!(
            res.outcome,
            MatchResult::FoundAt {
                line: 3,
                indent: String::new()
            }
        );
    }

    #[test]
    fn test_hand_edited_marker_counts_as_present() {
        let code = "[Obsolete(\"Reworded by hand\", true)]\npublic class A\n{\n}\n";
        let res = patch(code, &obsolete(DeclarationKind::Class, "A"));
        assert_eq!(res.outcome, MatchResult::AlreadyMarked { line: 1 });
        assert_eq!(res.content, code);
    }

    #[test]
    fn test_zero_lookback_never_detects() {
        let code = "[Obsolete]\npublic class A\n";
        let options = PatchOptions { lookback: 0 };
        let res = patch_with(code, &obsolete(DeclarationKind::Class, "A"), &options);
        assert!(res.changed());
    }

    #[test]
    fn test_patch_bytes_rejects_invalid_utf8() {
        let bytes = b"public class A\n\xff\n";
        let res = patch_bytes(
            bytes,
            &obsolete(DeclarationKind::Class, "A"),
            &PatchOptions::default(),
        );
        assert!(matches!(res, Err(AppError::Decode(_))));
    }
}
