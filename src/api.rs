//! Request/response contracts for detection and formatting.
//!
//! Two document-shaped contracts are exchanged over the text boundary
//! (the CLI's `--json` mode): **Detect** carries the raw code and returns
//! the resolved label, confidence and heuristic identifier; **Format**
//! carries the raw code plus an optional explicit label and returns either
//! the formatted text or a failure descriptor. Detect always succeeds;
//! Format failures carry exactly one error kind and never partial output.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::detect::detect;
use crate::error::FormatError;
use crate::language::Language;
use crate::process::format_text;

/// Detect request: one field, the raw code text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    pub code: String,
}

/// Detect response. `detected_by` names the heuristic tier that resolved
/// the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub language: String,
    pub confidence: String,
    pub detected_by: String,
}

/// Format request: raw code plus an optional explicit label. When the
/// label is omitted, detection runs first; an explicit label is
/// authoritative and never re-classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatRequest {
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Format response: formatted text on success, or an error kind with a
/// human-readable message. Never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatResponse {
    Success { formatted_code: String },
    Failure { error: String, message: String },
}

impl FormatResponse {
    #[must_use]
    pub fn from_result(result: Result<String, FormatError>) -> Self {
        match result {
            Ok(formatted_code) => FormatResponse::Success { formatted_code },
            Err(err) => FormatResponse::Failure {
                error: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FormatResponse::Success { .. })
    }
}

/// Serve one Detect request. Infallible: unclassifiable input degrades to
/// `unknown`/low rather than erroring.
#[must_use]
pub fn handle_detect(request: &DetectRequest, config: &Config) -> DetectResponse {
    let detection = detect(&request.code, config);
    DetectResponse {
        language: detection.language.as_str().to_string(),
        confidence: detection.confidence.as_str().to_string(),
        detected_by: detection.method.as_str().to_string(),
    }
}

/// Serve one Format request, running detection first when no label was
/// supplied.
#[must_use]
pub fn handle_format(request: &FormatRequest, config: &Config) -> FormatResponse {
    let language = match &request.language {
        Some(label) => match label.parse::<Language>() {
            Ok(language) => language,
            Err(()) => {
                return FormatResponse::from_result(Err(FormatError::NotSupported {
                    label: label.clone(),
                }))
            }
        },
        None => detect(&request.code, config).language,
    };

    FormatResponse::from_result(format_text(&request.code, language, config))
}
