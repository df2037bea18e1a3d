//! Integration tests for the formatting pipeline
//!
//! External formatters are simulated with ubiquitous shell tools (`cat`,
//! `tr`, `sh`) through the `[tools]` override table, so the suite never
//! depends on real formatter binaries being installed.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use polyfmt::api::{handle_format, FormatRequest, FormatResponse};
use polyfmt::config::ToolOverride;
use polyfmt::{format_text, Config, FormatError, Language, SUPPORTED_LANGUAGES};

fn tool(command: &[&str]) -> ToolOverride {
    ToolOverride {
        command: command.iter().map(|s| (*s).to_string()).collect(),
        temp_file_suffix: None,
    }
}

fn with_tools(language: Language, overrides: Vec<ToolOverride>) -> Config {
    let mut config = Config::default();
    config
        .tools
        .insert(language.as_str().to_string(), overrides);
    config
}

#[test]
fn test_empty_input_succeeds_for_every_language() {
    let config = Config::default();
    for &language in SUPPORTED_LANGUAGES {
        let out = format_text("", language, &config)
            .unwrap_or_else(|e| panic!("empty input failed for {language}: {e}"));
        assert_eq!(out, "");
    }
}

#[test]
fn test_unsupported_label_fails_without_output() {
    let response = handle_format(
        &FormatRequest {
            code: "IDENTIFICATION DIVISION.".to_string(),
            language: Some("cobol".to_string()),
        },
        &Config::default(),
    );
    match response {
        FormatResponse::Failure { error, message } => {
            assert_eq!(error, "not_supported");
            assert!(message.contains("cobol"));
        }
        FormatResponse::Success { .. } => panic!("cobol must not format"),
    }
}

#[test]
fn test_builtin_json_formatting_is_idempotent() {
    let config = Config::default();
    let input = "{\"b\": 1, \"a\": {\"nested\": [1, 2, 3]}}";
    let once = format_text(input, Language::Json, &config).unwrap();
    let twice = format_text(&once, Language::Json, &config).unwrap();
    assert_eq!(once, twice);

    // Key order is document order, not sorted.
    assert!(once.find("\"b\"").unwrap() < once.find("\"a\"").unwrap());
}

#[test]
fn test_malformed_json_reports_parse_error_with_offset() {
    let input = "{\"a\":}";
    let err = format_text(input, Language::Json, &Config::default()).unwrap_err();
    match err {
        FormatError::ParseError { offset, message } => {
            assert!(offset <= input.len());
            assert!(!message.is_empty());
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_single_stage_unavailable_tool_fails_pipeline() {
    let config = with_tools(Language::Go, vec![tool(&["polyfmt-test-absent-tool"])]);
    let err = format_text("package main\n", Language::Go, &config).unwrap_err();
    match err {
        FormatError::ToolUnavailable { tool } => {
            assert_eq!(tool, "polyfmt-test-absent-tool");
        }
        other => panic!("expected tool unavailable, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_silent_tool_never_formats_input_to_nothing() {
    // A formatter that exits zero with no output must not be taken at its
    // word, or in-place formatting would truncate the source file.
    let config = with_tools(Language::Go, vec![tool(&["true"])]);
    let err = format_text("package main\n", Language::Go, &config).unwrap_err();
    match err {
        FormatError::FormattingError { diagnostic, .. } => {
            assert!(diagnostic.contains("no output"));
        }
        other => panic!("expected formatting error, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_launcher_reported_missing_formatter_is_unavailable() {
    // `npx`-style launchers spawn successfully and only then discover the
    // formatter is absent; that is the normal missing-tool path.
    let config = with_tools(
        Language::JavaScript,
        vec![ToolOverride {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "polyfmt-test-absent-tool".to_string(),
            ],
            temp_file_suffix: None,
        }],
    );
    let err = format_text("let x = 1\n", Language::JavaScript, &config).unwrap_err();
    assert!(matches!(err, FormatError::ToolUnavailable { .. }));
}

#[cfg(unix)]
#[test]
fn test_two_stage_pipeline_survives_missing_second_stage() {
    let config = with_tools(
        Language::Python,
        vec![tool(&["tr", "-s", " "]), tool(&["polyfmt-test-absent-tool"])],
    );
    let out = format_text("x  =  1\n", Language::Python, &config).unwrap();
    assert_eq!(out, "x = 1\n");
}

#[cfg(unix)]
#[test]
fn test_two_stage_pipeline_chains_stage_output() {
    let config = with_tools(
        Language::Python,
        vec![tool(&["tr", "-s", " "]), tool(&["tr", "a-z", "A-Z"])],
    );
    let out = format_text("x  =  abc\n", Language::Python, &config).unwrap();
    assert_eq!(out, "X = ABC\n");
}

#[cfg(unix)]
#[test]
fn test_rejecting_tool_aborts_with_its_diagnostic() {
    let config = with_tools(
        Language::JavaScript,
        vec![ToolOverride {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo 'SyntaxError: unexpected token' >&2; exit 1".to_string(),
            ],
            temp_file_suffix: None,
        }],
    );
    let err = format_text("}{", Language::JavaScript, &config).unwrap_err();
    match err {
        FormatError::FormattingError { diagnostic, .. } => {
            assert!(diagnostic.contains("SyntaxError: unexpected token"));
        }
        other => panic!("expected formatting error, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_timed_out_single_stage_fails_pipeline() {
    let mut config = with_tools(
        Language::Go,
        vec![ToolOverride {
            command: vec!["sh".to_string(), "-c".to_string(), "sleep 30".to_string()],
            temp_file_suffix: None,
        }],
    );
    config.timeout_secs = 1;
    let err = format_text("package main\n", Language::Go, &config).unwrap_err();
    match err {
        FormatError::Timeout { secs, .. } => assert_eq!(secs, 1),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_identity_tool_output_is_fixed_point() {
    let config = with_tools(Language::Ruby, vec![tool(&["cat"])]);
    let input = "puts 'hello'\n";
    let once = format_text(input, Language::Ruby, &config).unwrap();
    let twice = format_text(&once, Language::Ruby, &config).unwrap();
    assert_eq!(once, input);
    assert_eq!(once, twice);
}

#[cfg(unix)]
#[test]
fn test_trailing_newline_is_normalized_once() {
    let config = with_tools(Language::Ruby, vec![tool(&["cat"])]);
    let out = format_text("puts 1\n\n\n", Language::Ruby, &config).unwrap();
    assert_eq!(out, "puts 1\n");
}

#[cfg(unix)]
#[test]
fn test_temp_file_stage_round_trips() {
    let config = with_tools(
        Language::Php,
        vec![ToolOverride {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                // Rewrite the file in place, as fix-style formatters do.
                "tr -s ' ' < \"$1\" > \"$1.out\" && mv \"$1.out\" \"$1\"".to_string(),
                "sh".to_string(),
                "{file}".to_string(),
            ],
            temp_file_suffix: Some(".php".to_string()),
        }],
    );
    let out = format_text("<?php  echo  1;\n", Language::Php, &config).unwrap();
    assert_eq!(out, "<?php echo 1;\n");
}

#[test]
fn test_format_request_without_label_uses_detection() {
    let response = handle_format(
        &FormatRequest {
            code: "{\"k\": [1, 2, 3], \"v\": true}".to_string(),
            language: None,
        },
        &Config::default(),
    );
    match response {
        FormatResponse::Success { formatted_code } => {
            assert!(formatted_code.starts_with('{'));
            assert!(formatted_code.contains("\"k\""));
        }
        FormatResponse::Failure { error, message } => {
            panic!("expected detection to route to the builtin JSON stage, got {error}: {message}");
        }
    }
}

#[test]
fn test_unclassifiable_code_without_label_is_not_supported() {
    let response = handle_format(
        &FormatRequest {
            code: "complete gibberish with no recognizable structure".to_string(),
            language: None,
        },
        &Config::default(),
    );
    match response {
        FormatResponse::Failure { error, .. } => assert_eq!(error, "not_supported"),
        FormatResponse::Success { .. } => panic!("unknown language must not format"),
    }
}
