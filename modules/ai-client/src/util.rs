/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Return the span from the first `{` to the last `}` of a model response.
///
/// Models wrap JSON in prose or fences; this is the widest candidate object
/// and may still fail to parse.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_within_bounds() {
        let text = "Hello";
        assert_eq!(truncate_to_char_boundary(text, 100), "Hello");
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let raw = "Sure! Here is my answer:\n{\"label\": \"FAKE\"}\nHope that helps.";
        assert_eq!(extract_json_object(raw), Some("{\"label\": \"FAKE\"}"));
    }

    #[test]
    fn extract_spans_nested_objects() {
        let raw = "{\"a\": {\"b\": 1}}";
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn extract_none_without_braces() {
        assert!(extract_json_object("REAL, 0.9").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
