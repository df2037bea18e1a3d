//! Language labels and detection results.
//!
//! [`Language`] is the closed set of labels the classifier can emit and the
//! dispatcher accepts. The declaration order of the variants is significant:
//! it is the tie-break precedence used when two languages score equally
//! during pattern detection (earlier-declared wins).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported language label.
///
/// `Unknown` is the sentinel returned when classification finds no reliable
/// signal; it is never a valid formatting target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Html,
    Css,
    C,
    Cpp,
    Java,
    CSharp,
    Go,
    Ruby,
    Php,
    Json,
    Xml,
    Unknown,
}

/// All formattable languages, in tie-break precedence order.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language::Python,
    Language::JavaScript,
    Language::TypeScript,
    Language::Html,
    Language::Css,
    Language::C,
    Language::Cpp,
    Language::Java,
    Language::CSharp,
    Language::Go,
    Language::Ruby,
    Language::Php,
    Language::Json,
    Language::Xml,
];

impl Language {
    /// Lowercase wire identifier for this label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Json => "json",
            Language::Xml => "xml",
            Language::Unknown => "unknown",
        }
    }

    /// Whether this label has a registered formatting strategy.
    #[must_use]
    pub fn is_supported(self) -> bool {
        self != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    /// Parse a user-supplied label, accepting common aliases
    /// (`js`, `python3`, `c++`, `c#`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let language = match normalized.as_str() {
            "python" | "python3" | "py" => Language::Python,
            "javascript" | "js" | "node" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "c" => Language::C,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            "java" => Language::Java,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "go" | "golang" => Language::Go,
            "ruby" | "rb" => Language::Ruby,
            "php" => Language::Php,
            "json" => Language::Json,
            "xml" => Language::Xml,
            _ => return Err(()),
        };
        Ok(language)
    }
}

/// Qualitative certainty attached to a classification result.
///
/// Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which heuristic tier produced a detection verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// Input was empty or whitespace-only; no heuristic consulted.
    Empty,
    /// Input below the minimum reliable length; pattern verdict kept but
    /// confidence capped at low.
    Short,
    /// Tier-1 weighted pattern table resolved the language.
    Patterns,
    /// Tier-1 scored below threshold; its leader is reported at low
    /// confidence because tier 2 had nothing better.
    PatternsWeak,
    /// Tier-2 lexical library resolved the language.
    Lexer,
    /// Neither tier produced any signal.
    NoSignal,
}

impl DetectionMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Empty => "empty",
            DetectionMethod::Short => "short",
            DetectionMethod::Patterns => "patterns",
            DetectionMethod::PatternsWeak => "patterns-weak",
            DetectionMethod::Lexer => "lexer",
            DetectionMethod::NoSignal => "no-signal",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one snippet. Created fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub language: Language,
    pub confidence: Confidence,
    pub method: DetectionMethod,
}

impl Detection {
    #[must_use]
    pub fn new(language: Language, confidence: Confidence, method: DetectionMethod) -> Self {
        Detection {
            language,
            confidence,
            method,
        }
    }

    /// The fixed verdict for input carrying no usable signal.
    #[must_use]
    pub fn unknown(method: DetectionMethod) -> Self {
        Detection::new(Language::Unknown, Confidence::Low, method)
    }
}
