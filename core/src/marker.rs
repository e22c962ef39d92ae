#![deny(missing_docs)]

//! # Markers
//!
//! The attribute line inserted above a declaration, e.g.
//! `[Obsolete("Use ILogsProducer instead.", false)]`.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Attribute used when none is configured.
pub const DEFAULT_ATTRIBUTE: &str = "Obsolete";

/// An attribute to place above a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Attribute name without brackets (`Obsolete`).
    pub attribute: String,
    /// First positional argument, rendered as a string literal.
    pub message: Option<String>,
    /// Second positional argument; `true` turns usages into compile errors.
    pub is_error: Option<bool>,
}

impl Marker {
    /// A bare attribute, rendered as `[Name]`.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            message: None,
            is_error: None,
        }
    }

    /// `[Obsolete("message", is_error)]`.
    pub fn obsolete(message: impl Into<String>, is_error: bool) -> Self {
        Self::new(DEFAULT_ATTRIBUTE)
            .with_message(message)
            .with_error_flag(is_error)
    }

    /// Sets the message argument.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the error flag argument.
    pub fn with_error_flag(mut self, is_error: bool) -> Self {
        self.is_error = Some(is_error);
        self
    }

    /// The attribute text, without indentation or terminator.
    pub fn render(&self) -> String {
        let mut args = Vec::new();
        if let Some(message) = &self.message {
            args.push(format!("\"{}\"", escape_literal(message)));
        }
        if let Some(is_error) = self.is_error {
            if self.message.is_none() {
                args.push("null".to_string());
            }
            args.push(is_error.to_string());
        }

        if args.is_empty() {
            format!("[{}]", self.attribute)
        } else {
            format!("[{}({})]", self.attribute, args.join(", "))
        }
    }

    /// Pattern matching this attribute regardless of its arguments.
    ///
    /// Accepts `[Obsolete`, `[ System.Obsolete`, `[ObsoleteAttribute` and
    /// attribute lists such as `[Serializable, Obsolete(...)]`.
    pub fn token_pattern(&self) -> Regex {
        let name = regex::escape(&self.attribute);
        let pattern = format!(
            r"\[(?:[^\[\]]*,)?\s*(?:global::)?(?:System\.)?{name}(?:Attribute)?\s*[\(\],]"
        );
        Regex::new(&pattern).expect("Invalid regex")
    }

    /// Whether `text` already contains this attribute.
    pub fn is_present_in(&self, text: &str) -> bool {
        self.token_pattern().is_match(text)
    }
}

fn escape_literal(message: &str) -> String {
    message.replace('\\', "\\\\").replace('"', "\\\"")
}
