//! Built-in JSON pretty-printer.
//!
//! JSON needs no external binary: the document is parsed and re-serialized
//! in process with two-space indentation. Object key order is the original
//! document order (serde_json's `preserve_order` feature), never sorted.
//! A document that fails to parse yields [`FormatError::ParseError`] with
//! an approximate byte offset; no best-effort output is ever produced.

use serde_json::Value;

use crate::error::FormatError;

/// Pretty-print a JSON document.
///
/// The output is a fixed point: formatting already-formatted JSON returns
/// it unchanged (the pipeline adds the single trailing newline).
pub fn format_json(text: &str) -> Result<String, FormatError> {
    let value: Value = serde_json::from_str(text).map_err(|e| FormatError::ParseError {
        offset: byte_offset(text, e.line(), e.column()),
        message: e.to_string(),
    })?;
    serde_json::to_string_pretty(&value).map_err(|e| FormatError::ParseError {
        offset: 0,
        message: e.to_string(),
    })
}

/// Convert serde_json's 1-based line/column into a byte offset into `text`,
/// clamped to the input length.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, content) in text.split('\n').enumerate() {
        if index + 1 == line {
            offset += column.saturating_sub(1).min(content.len());
            return offset.min(text.len());
        }
        offset += content.len() + 1;
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_prints_with_two_space_indent() {
        let out = format_json(r#"{"a":1,"b":[true,null]}"#).unwrap();
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}");
    }

    #[test]
    fn test_key_order_is_document_order() {
        let out = format_json(r#"{"zebra":1,"alpha":2,"mid":3}"#).unwrap();
        let zebra = out.find("zebra").unwrap();
        let alpha = out.find("alpha").unwrap();
        let mid = out.find("mid").unwrap();
        assert!(zebra < alpha && alpha < mid);
    }

    #[test]
    fn test_fixed_point() {
        let once = format_json(r#"{"a": {"b": [1, 2]}}"#).unwrap();
        let twice = format_json(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_input_reports_offset() {
        let input = r#"{"a":}"#;
        match format_json(input) {
            Err(FormatError::ParseError { offset, .. }) => {
                assert!(offset <= input.len());
                assert!(offset >= 5, "offset {offset} should point near the hole");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_offset_on_later_line() {
        let input = "{\n  \"a\": 1,\n  \"b\": oops\n}";
        match format_json(input) {
            Err(FormatError::ParseError { offset, .. }) => {
                assert!(offset > input.find('\n').unwrap());
                assert!(offset <= input.len());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_scalar_is_valid_json() {
        assert_eq!(format_json("42").unwrap(), "42");
        assert_eq!(format_json("\"hi\"").unwrap(), "\"hi\"");
    }
}
