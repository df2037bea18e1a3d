//! Weighted signature patterns for language detection.
//!
//! The table is declarative data, not branching code: each language owns
//! three buckets of regexes (strong/medium/weak) whose matches contribute
//! weighted scores during tier-1 detection. All patterns are compiled once
//! at first use via `LazyLock`.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::language::Language;

/// Score contributed by one matching strong signature.
pub const STRONG_WEIGHT: u32 = 3;
/// Score contributed by one matching medium signature.
pub const MEDIUM_WEIGHT: u32 = 2;
/// Score contributed by one matching weak signature.
pub const WEAK_WEIGHT: u32 = 1;
/// Weak signatures are generic (braces, semicolons); their total
/// contribution per language is capped so they can never outvote a
/// single strong signature plus change.
pub const WEAK_CAP: u32 = 3;

/// Build a multi-line regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid signature pattern: {pattern}"))
}

/// The signature buckets registered for one language.
pub struct SignatureSet {
    pub language: Language,
    strong: Vec<Regex>,
    medium: Vec<Regex>,
    weak: Vec<Regex>,
}

impl SignatureSet {
    fn new(language: Language, strong: &[&str], medium: &[&str], weak: &[&str]) -> Self {
        SignatureSet {
            language,
            strong: strong.iter().map(|p| build_re(p)).collect(),
            medium: medium.iter().map(|p| build_re(p)).collect(),
            weak: weak.iter().map(|p| build_re(p)).collect(),
        }
    }

    /// Aggregate weighted score of this language's signatures against `text`.
    #[must_use]
    pub fn score(&self, text: &str) -> u32 {
        let strong_hits = self.strong.iter().filter(|re| re.is_match(text)).count() as u32;
        let medium_hits = self.medium.iter().filter(|re| re.is_match(text)).count() as u32;
        let weak_hits = self.weak.iter().filter(|re| re.is_match(text)).count() as u32;

        strong_hits * STRONG_WEIGHT
            + medium_hits * MEDIUM_WEIGHT
            + (weak_hits * WEAK_WEIGHT).min(WEAK_CAP)
    }
}

/// The full signature table, in tie-break precedence order.
///
/// Ordering matters: `detect` scans this table front to back and only a
/// strictly greater score replaces the current leader, so on an exact tie
/// the earlier entry wins.
pub static SIGNATURES: LazyLock<Vec<SignatureSet>> = LazyLock::new(|| {
    vec![
        SignatureSet::new(
            Language::Python,
            &[
                r"^#!.*\bpython",
                r"\bdef\s+\w+\s*\(",
                r"\bdef\s+\w+\s*\(.*\)\s*:",
                r"^\s*(from\s+[\w.]+\s+)?import\s+[\w.]+",
                r#"\bif\s+__name__\s*==\s*['"]__main__['"]"#,
                r"^\s*elif\s.*:",
            ],
            &[
                r"\bself\.",
                r"\bprint\s*\(",
                r"\blambda\s+\w+\s*:",
                r"^\s*class\s+\w+(\(.*\))?\s*:",
            ],
            &[
                r":\s*$",
                r"\b(None|True|False)\b",
                r"\b(and|or|not)\s",
                r"\b(range|len)\s*\(",
            ],
        ),
        SignatureSet::new(
            Language::JavaScript,
            &[
                r"\bfunction\s+\w*\s*\(",
                r"=>",
                r"\b(const|let)\s+\w+\s*=",
                r"\bconsole\.log\s*\(",
                r"\b(document|window)\.",
                r#"\brequire\s*\(\s*['"]"#,
            ],
            &[
                r"===|!==",
                r"\btypeof\s",
                r"\bundefined\b",
                r"\bJSON\.",
                r"\bnew\s+\w+\s*\(",
            ],
            &[r"\bvar\s+\w+", r"\bthis\.", r";\s*$"],
        ),
        SignatureSet::new(
            Language::TypeScript,
            &[
                r"\binterface\s+\w+\s*\{",
                r"\btype\s+\w+\s*=",
                r":\s*(string|number|boolean)\b",
                r"\bexport\s+(default\s+)?(class|function|const|interface|type)\b",
                r"\breadonly\s+\w+",
            ],
            &[
                r"\basync\s+function\b|\bawait\s",
                r"\bPromise<",
                r"\bimplements\s+\w+",
                r"\benum\s+\w+\s*\{",
            ],
            &[r"=>", r"\bconst\s+\w+"],
        ),
        SignatureSet::new(
            Language::Html,
            &[
                r"(?i)<!DOCTYPE\s+html",
                r"(?i)<html[\s>]",
                r"(?i)</(div|span|body|head|html|p|li)>",
                r"(?i)<(div|span|body|head|script|style|nav|section)[\s>]",
            ],
            &[
                r"(?i)<(h[1-6]|a|img|form|ul|ol|li|table|tr|td)[\s>/]",
                r#"\bclass=""#,
                r#"\bhref=""#,
            ],
            &[r"</\w+>", r"/>"],
        ),
        SignatureSet::new(
            Language::Css,
            &[
                r"@(media|import|keyframes|font-face)\b",
                r"\b(color|background(-color)?|margin|padding|display|position)\s*:",
                r":\s*(hover|focus|active|before|after)\b",
                r"\bfont-(size|family|weight)\s*:",
            ],
            &[
                r"\b(width|height|border|float|opacity)\s*:",
                r"\b\d+(px|em|rem|vh|vw)\b",
                r"[.#][\w-]+\s*\{",
            ],
            &[r"\{", r";\s*$", r"!important"],
        ),
        SignatureSet::new(
            Language::C,
            &[
                r"#include\s*<\w+\.h>",
                r"\b(printf|scanf|fprintf)\s*\(",
                r"\bint\s+main\s*\(",
                r"\b(malloc|calloc|free)\s*\(",
            ],
            &[
                r"#define\s+\w+",
                r"\bstruct\s+\w+",
                r"\bchar\s*\*",
                r"\bvoid\s+\w+\s*\(",
            ],
            &[r";\s*$", r"\breturn\s"],
        ),
        SignatureSet::new(
            Language::Cpp,
            &[
                r"#include\s*<\w+>",
                r"\bstd::",
                r"\b(cout|cin|endl)\b",
                r"\busing\s+namespace\s+\w+",
                r"\btemplate\s*<",
            ],
            &[
                r"\bclass\s+\w+",
                r"\b(public|private|protected)\s*:",
                r"\bnullptr\b",
                r"<<|>>",
            ],
            &[r"\b(int|void|auto)\s", r";\s*$"],
        ),
        SignatureSet::new(
            Language::Java,
            &[
                r"\bpublic\s+class\s+\w+",
                r"\bpublic\s+static\s+void\s+main\b",
                r"\bSystem\.(out|err)\.",
                r"^\s*import\s+java[\w.]*;",
            ],
            &[
                r"\bString\s+\w+",
                r"\b(ArrayList|HashMap|List)<",
                r"\bthrows\s+\w+",
                r"\b(extends|implements)\s+\w+",
            ],
            &[r"\b(public|static|final)\s", r";\s*$"],
        ),
        SignatureSet::new(
            Language::CSharp,
            &[
                r"\busing\s+System\b",
                r"\bConsole\.Write",
                r"\bnamespace\s+[\w.]+",
                r"\bstatic\s+void\s+Main\s*\(",
            ],
            &[
                r"\bstring\s+\w+",
                r"\b(List|Dictionary)<",
                r"\bget;\s*set;",
                r"\bvar\s+\w+\s*=",
            ],
            &[r"\b(public|private|sealed)\s", r";\s*$"],
        ),
        SignatureSet::new(
            Language::Go,
            &[
                r"^\s*package\s+\w+",
                r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\s*\(",
                r"\bfmt\.\w+\(",
                r":=",
                r"\b(go\s+func|defer)\b",
            ],
            &[
                r"^\s*import\s+\(",
                r"\btype\s+\w+\s+struct\b",
                r"\bchan\s+\w+",
                r"\binterface\s*\{",
            ],
            &[r"\brange\s", r"\b(make|len)\s*\("],
        ),
        SignatureSet::new(
            Language::Ruby,
            &[
                r"^\s*(def|class|module)\s+\w+\s*$",
                r"^\s*end\s*$",
                r"\bputs\s",
                r#"^\s*require(_relative)?\s+['"]"#,
                r"\bdo\s*\|[^|]*\|",
            ],
            &[r"@\w+", r"\bnil\b", r"\bunless\s", r"\.each\b"],
            &[r"\bdef\s", r"\|\w+\|"],
        ),
        SignatureSet::new(
            Language::Php,
            &[
                r"<\?php",
                r"<\?=",
                r"\$_(GET|POST|SESSION|SERVER|REQUEST)\b",
                r"\becho\s",
                r"->\w+\s*\(",
            ],
            &[
                r"\$\w+\s*=",
                r"::\w+",
                r"\barray\s*\(",
                r"\b(isset|empty)\s*\(",
            ],
            &[r";\s*$", r"\bfunction\s"],
        ),
        SignatureSet::new(
            Language::Json,
            &[
                r#""[^"]+"\s*:\s*\{"#,
                r#""[^"]+"\s*:\s*\["#,
                r#"^\s*"[^"]+"\s*:"#,
            ],
            &[r#":\s*(true|false|null)\b"#, r#":\s*-?\d+(\.\d+)?\s*[,}\]]"#],
            &[r"^\s*[\{\[]", r"[\}\]]\s*,?\s*$", r#""[^"]*""#],
        ),
        SignatureSet::new(
            Language::Xml,
            &[r"<\?xml\b", r"\bxmlns(:\w+)?=", r#"\bencoding="[-\w]+""#],
            &[
                r#"\bversion="1\."#,
                r"\bstandalone=",
                r"<!\[CDATA\[",
                r"</[\w-]+:[\w-]+>",
            ],
            &[r"</[\w-]+>", r"/>"],
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    /// Force-compile every pattern; an invalid one panics here instead of
    /// deep inside a detection call.
    #[test]
    fn test_all_patterns_compile() {
        for set in SIGNATURES.iter() {
            assert!(
                !set.strong.is_empty(),
                "{} has no strong signatures",
                set.language
            );
        }
    }

    #[test]
    fn test_table_order_matches_language_precedence() {
        let table_order: Vec<Language> = SIGNATURES.iter().map(|s| s.language).collect();
        assert_eq!(table_order, crate::language::SUPPORTED_LANGUAGES.to_vec());
    }

    #[test]
    fn test_python_def_scores_strong() {
        let set = &SIGNATURES[0];
        assert_eq!(set.language, Language::Python);
        let score = set.score("def foo():\n    return 1\n");
        assert!(score >= 6, "expected strong python score, got {score}");
    }

    #[test]
    fn test_weak_contribution_is_capped() {
        // Semicolons and braces alone must stay below the medium threshold.
        let blob = "{ ; } { ; } { ; } { ; }";
        for set in SIGNATURES.iter() {
            assert!(
                set.score(blob) <= WEAK_CAP,
                "{} overscored generic punctuation",
                set.language
            );
        }
    }

    #[test]
    fn test_c_header_does_not_match_cpp_include() {
        let cpp = SIGNATURES
            .iter()
            .find(|s| s.language == Language::Cpp)
            .unwrap();
        assert_eq!(cpp.score("#include <stdio.h>\n"), 0);
    }
}
