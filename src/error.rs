//! Error types and result aliases for polyfmt.
//!
//! This module defines the error handling infrastructure:
//! - [`FormatError`]: typed failure kinds for the formatting pipeline
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used at the CLI boundary

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// A formatting request failure.
///
/// Classification never produces these (it degrades to `unknown`/low);
/// every formatting failure surfaces as exactly one of these kinds and
/// never carries partial output.
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// The requested label is outside the supported set.
    #[error("language `{label}` is not supported")]
    NotSupported { label: String },

    /// A required external formatter binary could not be spawned.
    #[error("formatter `{tool}` is not available")]
    ToolUnavailable { tool: String },

    /// An external formatter exceeded its time budget.
    #[error("formatter `{tool}` exceeded the {secs}s time budget")]
    Timeout { tool: String, secs: u64 },

    /// The built-in parser rejected the input. `offset` is a byte offset
    /// into the original text near where parsing broke.
    #[error("parse error at byte {offset}: {message}")]
    ParseError { offset: usize, message: String },

    /// An external formatter rejected the input as syntactically invalid.
    /// `diagnostic` is the tool's own message, verbatim.
    #[error("formatter `{tool}` rejected the input: {diagnostic}")]
    FormattingError { tool: String, diagnostic: String },
}

impl FormatError {
    /// Stable kind identifier used in the response contract.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FormatError::NotSupported { .. } => "not_supported",
            FormatError::ToolUnavailable { .. } => "tool_unavailable",
            FormatError::Timeout { .. } => "timeout",
            FormatError::ParseError { .. } => "parse_error",
            FormatError::FormattingError { .. } => "formatting_error",
        }
    }
}
