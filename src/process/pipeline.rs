//! Formatting dispatch and pipeline execution.
//!
//! Every supported language maps to an ordered list of stages resolved once
//! at startup. Stages run strictly in sequence, the output of one feeding
//! the next. The failure policy is:
//! - missing or timed-out tool: skip the stage and continue with the text
//!   unchanged, unless it is the only stage (then the pipeline fails);
//! - tool exited zero but produced no output for non-empty input: treated
//!   as a skipped stage, never as the formatted result;
//! - tool rejected the input: abort immediately with the tool's diagnostic,
//!   never returning partial output;
//! - if no stage of a multi-stage pipeline ran at all, the pipeline fails
//!   rather than echoing the input as a fake success.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::Config;
use crate::error::FormatError;
use crate::format::format_json;
use crate::language::Language;
use crate::process::exec::{run_tool, ToolOutcome, ToolSpec};

/// One formatting step.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Shell out to a formatter binary.
    External(ToolSpec),
    /// Built-in JSON pretty-printer; needs no external binary.
    JsonPretty,
}

impl Stage {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Stage::External(spec) => spec.name(),
            Stage::JsonPretty => "json-pretty",
        }
    }
}

/// The static strategy registry: every supported language has at least one
/// stage. Resolved once; read-only afterwards.
static REGISTRY: LazyLock<HashMap<Language, Vec<Stage>>> = LazyLock::new(|| {
    let prettier = |parser: &str, stdin_name: &str| {
        Stage::External(ToolSpec::stdin(
            "npx",
            &[
                "--no-install",
                "prettier",
                "--parser",
                parser,
                "--stdin-filepath",
                stdin_name,
            ],
        ))
    };
    let clang_format = |style: &str, filename: &str| {
        let style_arg = format!("--style={style}");
        let filename_arg = format!("--assume-filename={filename}");
        Stage::External(ToolSpec::stdin(
            "clang-format",
            &[style_arg.as_str(), filename_arg.as_str()],
        ))
    };

    let mut registry = HashMap::new();
    // Two corrective passes: autopep8 repairs superficial issues so the
    // stricter black pass does not reject the input outright.
    registry.insert(
        Language::Python,
        vec![
            Stage::External(ToolSpec::stdin(
                "autopep8",
                &["--aggressive", "--aggressive", "-"],
            )),
            Stage::External(ToolSpec::stdin("black", &["--quiet", "-"])),
        ],
    );
    registry.insert(Language::JavaScript, vec![prettier("babel", "snippet.js")]);
    registry.insert(
        Language::TypeScript,
        vec![prettier("typescript", "snippet.ts")],
    );
    registry.insert(Language::Html, vec![prettier("html", "snippet.html")]);
    registry.insert(Language::Css, vec![prettier("css", "snippet.css")]);
    registry.insert(Language::C, vec![clang_format("Google", "snippet.c")]);
    registry.insert(Language::Cpp, vec![clang_format("Google", "snippet.cc")]);
    registry.insert(Language::Java, vec![clang_format("Google", "snippet.java")]);
    registry.insert(
        Language::CSharp,
        vec![clang_format("Microsoft", "snippet.cs")],
    );
    registry.insert(Language::Go, vec![Stage::External(ToolSpec::stdin("gofmt", &[]))]);
    registry.insert(Language::Ruby, vec![prettier("ruby", "snippet.rb")]);
    registry.insert(
        Language::Php,
        vec![Stage::External(ToolSpec::temp_file(
            "php-cs-fixer",
            &["fix", "{file}", "--quiet", "--using-cache=no"],
            ".php",
        ))],
    );
    registry.insert(Language::Json, vec![Stage::JsonPretty]);
    registry.insert(Language::Xml, vec![prettier("xml", "snippet.xml")]);
    registry
});

/// Resolve the stage list for `language`: a `[tools]` config override wins
/// over the built-in registry.
#[must_use]
pub fn resolve_stages(language: Language, config: &Config) -> Option<Vec<Stage>> {
    if let Some(overrides) = config.tools.get(language.as_str()) {
        let stages = overrides
            .iter()
            .map(|o| Stage::External(o.to_spec()))
            .collect::<Vec<_>>();
        if !stages.is_empty() {
            return Some(stages);
        }
    }
    REGISTRY.get(&language).cloned()
}

/// Format `text` as `language` through the registered pipeline.
///
/// Empty input is a no-op short-circuit; successful non-empty output is
/// normalized to end with exactly one trailing newline, which makes every
/// pipeline a fixed point under reapplication.
pub fn format_text(
    text: &str,
    language: Language,
    config: &Config,
) -> Result<String, FormatError> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let stages = resolve_stages(language, config).ok_or_else(|| FormatError::NotSupported {
        label: language.as_str().to_string(),
    })?;

    let timeout = Duration::from_secs(config.timeout_secs);
    let only_stage = stages.len() == 1;
    let mut current = text.to_string();
    let mut ran_any = false;
    let mut first_skip: Option<FormatError> = None;

    for stage in &stages {
        match stage {
            Stage::JsonPretty => {
                current = format_json(&current)?;
                ran_any = true;
            }
            Stage::External(spec) => match run_tool(spec, &current, timeout) {
                // A zero exit with an empty stdout would truncate the text
                // to nothing; keep the previous stage's output instead.
                ToolOutcome::Success(output) if output.is_empty() => {
                    let err = FormatError::FormattingError {
                        tool: spec.name().to_string(),
                        diagnostic: "tool exited successfully but produced no output"
                            .to_string(),
                    };
                    if only_stage {
                        return Err(err);
                    }
                    first_skip.get_or_insert(err);
                }
                ToolOutcome::Success(output) => {
                    current = output;
                    ran_any = true;
                }
                ToolOutcome::Unavailable => {
                    let err = FormatError::ToolUnavailable {
                        tool: spec.name().to_string(),
                    };
                    if only_stage {
                        return Err(err);
                    }
                    first_skip.get_or_insert(err);
                }
                ToolOutcome::TimedOut => {
                    let err = FormatError::Timeout {
                        tool: spec.name().to_string(),
                        secs: config.timeout_secs,
                    };
                    if only_stage {
                        return Err(err);
                    }
                    first_skip.get_or_insert(err);
                }
                ToolOutcome::Rejected { diagnostic } => {
                    return Err(FormatError::FormattingError {
                        tool: spec.name().to_string(),
                        diagnostic,
                    });
                }
            },
        }
    }

    if !ran_any {
        // Every stage was skipped; surface the first skip instead of
        // pretending the input was formatted.
        if let Some(err) = first_skip {
            return Err(err);
        }
    }

    Ok(normalize_trailing_newline(current))
}

/// Ensure non-empty output ends with exactly one `\n`.
fn normalize_trailing_newline(mut text: String) -> String {
    if text.is_empty() {
        return text;
    }
    while text.ends_with('\n') {
        text.pop();
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolOverride;
    use crate::language::SUPPORTED_LANGUAGES;

    fn override_config(language: Language, overrides: Vec<ToolOverride>) -> Config {
        let mut config = Config::default();
        config.tools.insert(language.as_str().to_string(), overrides);
        config
    }

    fn tool(command: &[&str]) -> ToolOverride {
        ToolOverride {
            command: command.iter().map(|s| (*s).to_string()).collect(),
            temp_file_suffix: None,
        }
    }

    #[test]
    fn test_every_supported_language_has_a_strategy() {
        let config = Config::default();
        for &language in SUPPORTED_LANGUAGES {
            assert!(
                resolve_stages(language, &config).is_some(),
                "{language} has no registered strategy"
            );
        }
        assert!(resolve_stages(Language::Unknown, &config).is_none());
    }

    #[test]
    fn test_empty_input_short_circuits_every_language() {
        let config = Config::default();
        for &language in SUPPORTED_LANGUAGES {
            assert_eq!(format_text("", language, &config).unwrap(), "");
        }
    }

    #[test]
    fn test_unknown_language_is_not_supported() {
        let err = format_text("x", Language::Unknown, &Config::default()).unwrap_err();
        assert_eq!(err.kind(), "not_supported");
    }

    #[test]
    fn test_json_pipeline_is_builtin_and_idempotent() {
        let config = Config::default();
        let once = format_text("{\"b\":1,\"a\":[2,3]}", Language::Json, &config).unwrap();
        let twice = format_text(&once, Language::Json, &config).unwrap();
        assert_eq!(once, twice);
        assert!(once.ends_with('\n'));
        assert!(!once.ends_with("\n\n"));
    }

    #[test]
    fn test_malformed_json_aborts_with_offset() {
        let err = format_text("{\"a\":}", Language::Json, &Config::default()).unwrap_err();
        match err {
            FormatError::ParseError { offset, .. } => assert!(offset <= 6),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_stage_missing_tool_fails() {
        let config = override_config(Language::Go, vec![tool(&["polyfmt-missing-gofmt"])]);
        let err = format_text("package main\n", Language::Go, &config).unwrap_err();
        assert_eq!(err.kind(), "tool_unavailable");
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_output_from_only_stage_never_erases_input() {
        // `true` exits zero without writing anything; accepting that as the
        // formatted result would turn the snippet into an empty string.
        let config = override_config(Language::Go, vec![tool(&["true"])]);
        let err = format_text("package main\n", Language::Go, &config).unwrap_err();
        assert_eq!(err.kind(), "formatting_error");
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_output_stage_keeps_previous_stage_text() {
        let config = override_config(
            Language::Python,
            vec![tool(&["tr", "a-z", "A-Z"]), tool(&["true"])],
        );
        let out = format_text("x = 1\n", Language::Python, &config).unwrap();
        assert_eq!(out, "X = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_launcher_missing_tool_skips_like_absent_binary() {
        // A launcher that spawns fine but cannot find its target reports
        // the stage as unavailable, not as rejected input.
        let config = override_config(
            Language::JavaScript,
            vec![ToolOverride {
                command: vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    "polyfmt-missing-prettier".to_string(),
                ],
                temp_file_suffix: None,
            }],
        );
        let err = format_text("let x = 1\n", Language::JavaScript, &config).unwrap_err();
        assert_eq!(err.kind(), "tool_unavailable");
    }

    #[cfg(unix)]
    #[test]
    fn test_second_stage_missing_degrades_to_first_stage_output() {
        let config = override_config(
            Language::Python,
            vec![
                tool(&["tr", "a-z", "A-Z"]),
                tool(&["polyfmt-missing-black"]),
            ],
        );
        let out = format_text("x = 1\n", Language::Python, &config).unwrap();
        assert_eq!(out, "X = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_all_stages_missing_is_not_a_silent_success() {
        let config = override_config(
            Language::Python,
            vec![tool(&["polyfmt-missing-a"]), tool(&["polyfmt-missing-b"])],
        );
        let err = format_text("x = 1\n", Language::Python, &config).unwrap_err();
        assert_eq!(err.kind(), "tool_unavailable");
    }

    #[cfg(unix)]
    #[test]
    fn test_rejection_aborts_with_tool_diagnostic() {
        let config = override_config(
            Language::Go,
            vec![ToolOverride {
                command: vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    "echo 'expected declaration' >&2; exit 2".to_string(),
                ],
                temp_file_suffix: None,
            }],
        );
        let err = format_text("not go\n", Language::Go, &config).unwrap_err();
        match err {
            FormatError::FormattingError { diagnostic, .. } => {
                assert!(diagnostic.contains("expected declaration"));
            }
            other => panic!("expected formatting error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stages_run_in_sequence() {
        // Stage one upper-cases, stage two doubles every line; order matters.
        let config = override_config(
            Language::Python,
            vec![
                tool(&["tr", "a-z", "A-Z"]),
                ToolOverride {
                    command: vec!["sed".to_string(), "p".to_string()],
                    temp_file_suffix: None,
                },
            ],
        );
        let out = format_text("ab\n", Language::Python, &config).unwrap();
        assert_eq!(out, "AB\nAB\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_pipeline_is_fixed_point() {
        let config = override_config(Language::Go, vec![tool(&["cat"])]);
        let input = "package main\n";
        let once = format_text(input, Language::Go, &config).unwrap();
        let twice = format_text(&once, Language::Go, &config).unwrap();
        assert_eq!(once, input);
        assert_eq!(once, twice);
    }
}
