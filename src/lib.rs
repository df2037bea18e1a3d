//! polyfmt - language detection and formatting dispatch for code snippets
//!
//! Classifies an unlabeled snippet into a language label with a confidence
//! level, then routes it through the registered formatting pipeline for
//! that language.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::result_unit_err)]

pub mod api;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod format;
pub mod language;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use detect::detect;
pub use error::{FormatError, Result};
pub use language::{Confidence, Detection, DetectionMethod, Language, SUPPORTED_LANGUAGES};
pub use process::format_text;
