//! Extraction of JSON objects that span several definition lines.
//!
//! A block starts on a line beginning with `{` and ends on the first line
//! after which the running count of `{` minus `}` is back to zero. Braces
//! are counted character by character, including those inside strings.

use crate::cursor::LineCursor;
use crate::warning::ParseWarning;
use serde_json::Value;

/// Extract and parse the JSON block starting at the cursor.
///
/// Consumed lines are trimmed and joined with a single space. On return the
/// cursor sits on the first line after the block, whether or not the text
/// parsed. If the braces never balance, the block runs to the end of input.
///
/// # Errors
/// Returns [`ParseWarning::InvalidJsonBlock`] carrying the joined text when
/// it is not valid JSON, or [`ParseWarning::EmptyJsonBlock`] when no text
/// was collected at all.
///
/// # Example
/// ```
/// use defparse_core::{LineCursor, extract_json_block};
///
/// let mut cursor = LineCursor::new("{\"a\": {\n\"b\": 1}}\nafter");
/// let value = extract_json_block(&mut cursor).unwrap();
/// assert_eq!(value["a"]["b"], 1);
/// assert_eq!(cursor.current(), Some("after"));
/// ```
pub fn extract_json_block(cursor: &mut LineCursor<'_>) -> Result<Value, ParseWarning> {
    let line = cursor.position() + 1;
    let mut text = String::new();
    let mut balance: i64 = 0;

    while let Some(raw) = cursor.current() {
        let trimmed = raw.trim();
        text.push_str(trimmed);
        balance += brace_delta(trimmed);
        cursor.advance();

        if balance == 0 && !text.trim().is_empty() {
            break;
        }
        if !cursor.is_exhausted() {
            text.push(' ');
        }
    }

    if text.trim().is_empty() {
        return Err(ParseWarning::EmptyJsonBlock { line });
    }

    serde_json::from_str(&text).map_err(|e| ParseWarning::InvalidJsonBlock {
        section: None,
        line,
        raw: text,
        message: e.to_string(),
    })
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_line_object() {
        let mut cursor = LineCursor::new(r#"{"color": "red"}"#);
        let value = extract_json_block(&mut cursor).unwrap();
        assert_eq!(value, json!({"color": "red"}));
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_multi_line_object_resumes_after_last_line() {
        let text = "{\n  \"premium\": {\n    \"size\": 10\n  }\n}\nnext line";
        let mut cursor = LineCursor::new(text);
        let value = extract_json_block(&mut cursor).unwrap();
        assert_eq!(value, json!({"premium": {"size": 10}}));
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.current(), Some("next line"));
    }

    #[test]
    fn test_unbalanced_block_falls_back_to_joined_text() {
        let mut cursor = LineCursor::new("{\"a\": 1,\n\"b\": {");
        let err = extract_json_block(&mut cursor).unwrap_err();
        assert_eq!(err.raw_text(), "{\"a\": 1, \"b\": {");
        assert_eq!(err.line(), 1);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        let mut cursor = LineCursor::new("{not json}\nrest");
        let err = extract_json_block(&mut cursor).unwrap_err();
        assert!(matches!(err, ParseWarning::InvalidJsonBlock { .. }));
        assert_eq!(err.raw_text(), "{not json}");
        assert_eq!(cursor.current(), Some("rest"));
    }

    #[test]
    fn test_braces_inside_strings_are_counted() {
        let mut cursor = LineCursor::new("{\"a\": \"{\"}\n}\ntail");
        // The string brace keeps the balance open until the next line.
        let err = extract_json_block(&mut cursor).unwrap_err();
        assert_eq!(err.raw_text(), "{\"a\": \"{\"} }");
        assert_eq!(cursor.current(), Some("tail"));
    }

    #[test]
    fn test_only_blank_lines_is_empty_block() {
        let mut cursor = LineCursor::new("\n   \n");
        let err = extract_json_block(&mut cursor).unwrap_err();
        assert_eq!(err, ParseWarning::EmptyJsonBlock { line: 1 });
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_brace_delta() {
        assert_eq!(brace_delta("{{}"), 1);
        assert_eq!(brace_delta("}}"), -2);
        assert_eq!(brace_delta("plain"), 0);
    }
}
