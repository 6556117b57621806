//! Recoverable problems found while parsing a definition.
//!
//! None of these stop a parse. Each one marks a value that was kept as raw
//! text because it could not be interpreted.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A bracketed whitelist-style value was not a valid JSON array.
    #[error("line {line}: invalid array for {label} in {section}: {message}")]
    InvalidArray {
        section: String,
        label: String,
        line: usize,
        raw: String,
        message: String,
    },

    /// A `{`-delimited block did not parse as JSON.
    #[error("line {line}: invalid JSON configuration{}: {message}", section_suffix(.section))]
    InvalidJsonBlock {
        section: Option<String>,
        line: usize,
        raw: String,
        message: String,
    },

    /// No JSON text was found where a block was expected.
    ///
    /// Only returned by direct [`crate::extract_json_block`] calls; the
    /// parser starts a block on a `{` line, so it never sees this variant.
    #[error("line {line}: empty JSON block")]
    EmptyJsonBlock { line: usize },
}

fn section_suffix(section: &Option<String>) -> String {
    section
        .as_deref()
        .map(|s| format!(" for {s}"))
        .unwrap_or_default()
}

impl ParseWarning {
    /// The 1-based line the offending value starts on.
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidArray { line, .. }
            | Self::InvalidJsonBlock { line, .. }
            | Self::EmptyJsonBlock { line } => *line,
        }
    }

    /// The text that was kept in place of the value.
    pub fn raw_text(&self) -> &str {
        match self {
            Self::InvalidArray { raw, .. } | Self::InvalidJsonBlock { raw, .. } => raw,
            Self::EmptyJsonBlock { .. } => "",
        }
    }

    /// Attach the treatment section a JSON block belonged to.
    pub fn in_section(self, name: &str) -> Self {
        match self {
            Self::InvalidJsonBlock {
                line, raw, message, ..
            } => Self::InvalidJsonBlock {
                section: Some(name.to_string()),
                line,
                raw,
                message,
            },
            other => other,
        }
    }
}
