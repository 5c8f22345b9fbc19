//! JSON Scavenger (C8): pulls a JSON object out of a noisy model
//! response — code fences, trailing prose, truncation, line comments.

/// Strip `//` line comments that fall outside string literals, tracking
/// quote and escape state so a literal `//` inside a JSON string survives.
pub fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            continue;
        }

        if c == '/' && chars.peek() == Some(&'/') {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }

        out.push(c);
    }

    out
}

/// Extract the first balanced `{ … }` object, respecting string literals
/// and `\`-escapes. Returns the empty string on failure.
pub fn extract_balanced(text: &str) -> String {
    let bytes = text.as_bytes();
    let Some(start) = text.find('{') else {
        return String::new();
    };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = start;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else {
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return text[start..=i].to_string();
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    String::new()
}

/// Extract the body of a ` ```json ` fence if present, else any triple
/// fence. Returns the empty string on failure.
pub fn extract_fenced(text: &str) -> String {
    const FENCE: &str = "```";
    let Some(first) = text.find(FENCE) else {
        return String::new();
    };
    let after_first = first + FENCE.len();
    let Some(rel_end) = text[after_first..].find(FENCE) else {
        return String::new();
    };
    let body_start = after_first;
    let body_end = after_first + rel_end;
    let mut body = &text[body_start..body_end];

    // Strip an optional leading language tag line, e.g. "json\n{...}".
    if let Some(newline) = body.find('\n') {
        let first_line = body[..newline].trim();
        if !first_line.is_empty() && !first_line.starts_with('{') {
            body = &body[newline + 1..];
        }
    }

    body.trim().to_string()
}

/// Attempt to complete a truncated JSON object. Tries, in order: closing
/// an unterminated string then appending braces; appending exactly as
/// many `}` as there are unbalanced `{`; walking backward for the
/// longest valid prefix ending at `}`. Returns the empty string on
/// total failure.
pub fn complete_truncated(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return String::new();
    }
    if valid(trimmed) {
        return trimmed.to_string();
    }

    let open_braces = trimmed.matches('{').count();
    let close_braces = trimmed.matches('}').count();
    let missing = open_braces.saturating_sub(close_braces);

    if missing > 0 {
        let mut candidate = trimmed.to_string();
        // If the text ends mid-string (odd number of unescaped quotes),
        // close the string before closing the braces.
        let quote_count = count_unescaped_quotes(trimmed);
        if quote_count % 2 == 1 {
            candidate.push('"');
        }
        for _ in 0..missing {
            candidate.push('}');
        }
        if valid(&candidate) {
            return candidate;
        }
    }

    // Last resort: walk backward for the longest valid prefix ending at `}`.
    let bytes = trimmed.as_bytes();
    for i in (0..bytes.len()).rev() {
        if bytes[i] == b'}' {
            let candidate = &trimmed[..=i];
            if valid(candidate) {
                return candidate.to_string();
            }
        }
    }

    String::new()
}

fn count_unescaped_quotes(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// True iff `text` parses as JSON.
pub fn valid(text: &str) -> bool {
    !text.is_empty() && serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Scavenge a JSON object out of arbitrary model output, chaining the
/// primitives in the order the spec prescribes: strip comments, then
/// balanced-brace extraction, fenced extraction, truncated completion.
pub fn scavenge(text: &str) -> Option<serde_json::Value> {
    let cleaned = strip_line_comments(text);

    for candidate in [
        extract_balanced(&cleaned),
        extract_fenced(&cleaned),
        complete_truncated(&cleaned),
    ] {
        if valid(&candidate) {
            if let Ok(value) = serde_json::from_str(&candidate) {
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_balanced_object_after_noise() {
        let text = r#"Sure, here you go: {"a": 1, "b": {"c": 2}} trailing prose"#;
        assert_eq!(extract_balanced(text), r#"{"a": 1, "b": {"c": 2}}"#);
    }

    #[test]
    fn respects_braces_inside_string_literals() {
        let text = r#"{"note": "a } inside a string", "value": 1}"#;
        assert_eq!(extract_balanced(text), text);
    }

    #[test]
    fn extracts_fenced_json_block() {
        let text = "Here is the plan:\n```json\n{\"a\": 1}\n```\nHope that helps.";
        assert_eq!(extract_fenced(text), r#"{"a": 1}"#);
    }

    #[test]
    fn strips_line_comments_outside_strings() {
        let text = "{\"a\": 1, // trailing comment\n\"b\": \"http://not-a-comment\"}";
        let cleaned = strip_line_comments(text);
        assert!(valid(&extract_balanced(&cleaned)));
        assert!(cleaned.contains("http://not-a-comment"));
    }

    #[test]
    fn completes_truncated_object_missing_closing_braces() {
        let text = r#"{"a": {"b": 1"#;
        let completed = complete_truncated(text);
        assert!(valid(&completed));
    }

    #[test]
    fn scavenge_handles_full_noisy_model_response() {
        let text = "Sure! Here is the plan:\n```json\n{\"recommended_action\": \"retry_same\", // pick one\n\"recovery_options\": [{\"kind\": \"retry_same\"}]}\n```\nHope that helps.";
        let value = scavenge(text).expect("scavenges a value");
        assert_eq!(value["recommended_action"], "retry_same");
        assert!(value["recovery_options"].as_array().unwrap().len() == 1);
    }

    #[test]
    fn scavenge_returns_none_without_any_json() {
        assert!(scavenge("no json content here at all").is_none());
    }
}
