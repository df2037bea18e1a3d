//! Tier-2 fallback detection through a general-purpose lexical library.
//!
//! When the weighted pattern table cannot resolve a language, syntect's
//! bundled syntax definitions are consulted as a supporting signal (the
//! first-line matchers cover shebangs, XML prologs, doctypes and similar
//! markers). A verdict is accepted only when the syntax name maps onto one
//! of the supported [`Language`] labels.

use std::sync::LazyLock;

use syntect::parsing::SyntaxSet;

use crate::language::Language;

/// Loaded once; read-only after startup.
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Ask the lexical library for a verdict on `text`.
///
/// Returns `None` when the library has no opinion or when its verdict does
/// not map onto a supported label.
#[must_use]
pub fn lexer_guess(text: &str) -> Option<Language> {
    let first_line = text.lines().find(|line| !line.trim().is_empty())?;
    let syntax = SYNTAX_SET.find_syntax_by_first_line(first_line)?;
    map_syntax_name(&syntax.name, text)
}

/// Map a syntect syntax name onto a supported label.
///
/// Mirrors the alias folding of the detection layer, with one extra check:
/// a "C" or "CSS" verdict on text full of C++ markers is corrected to C++
/// (the two confuse generic lexers in both directions).
fn map_syntax_name(name: &str, text: &str) -> Option<Language> {
    let lower = name.to_ascii_lowercase();

    if lower.contains("python") {
        return Some(Language::Python);
    }
    if lower.contains("typescript") {
        return Some(Language::TypeScript);
    }
    if lower.contains("javascript") || lower.contains("ecmascript") {
        return Some(Language::JavaScript);
    }
    if lower.contains("html") {
        return Some(Language::Html);
    }
    if lower.contains("css") {
        if looks_like_cpp(text) {
            return Some(Language::Cpp);
        }
        return Some(Language::Css);
    }
    if lower.contains("c++") || lower.contains("cpp") {
        return Some(Language::Cpp);
    }
    if lower.contains("c#") || lower.contains("csharp") {
        return Some(Language::CSharp);
    }
    if lower.contains("java") {
        return Some(Language::Java);
    }
    if lower.contains("go") {
        return Some(Language::Go);
    }
    if lower.contains("ruby") {
        return Some(Language::Ruby);
    }
    if lower.contains("php") {
        return Some(Language::Php);
    }
    if lower.contains("json") {
        return Some(Language::Json);
    }
    if lower.contains("xml") {
        return Some(Language::Xml);
    }
    // Plain "C" only counts when C markers are actually present.
    if lower == "c" && (text.contains("#include") || text.contains("printf")) {
        if looks_like_cpp(text) {
            return Some(Language::Cpp);
        }
        return Some(Language::C);
    }
    None
}

fn looks_like_cpp(text: &str) -> bool {
    ["std::", "cout", "using namespace", "template<", "template <"]
        .iter()
        .any(|marker| text.contains(marker))
}
