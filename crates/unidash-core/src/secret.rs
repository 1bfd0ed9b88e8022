//! Secret masking and log redaction.

/// Character used to hide secret prefixes.
pub const MASK_CHAR: char = '*';

/// Number of trailing characters left visible by default.
pub const DEFAULT_VISIBLE_SUFFIX: usize = 4;

/// Projection returned for values too short to reveal any suffix.
pub const SHORT_VALUE_MASK: &str = "****";

/// Masks all but the last `visible_suffix` characters of `value`.
///
/// Values whose length is less than or equal to `visible_suffix` are fully
/// masked as [`SHORT_VALUE_MASK`], so their length is not leaked either.
/// Length is counted in characters, not bytes.
pub fn mask(value: &str, visible_suffix: usize) -> String {
    let length = value.chars().count();
    if length <= visible_suffix {
        return SHORT_VALUE_MASK.to_string();
    }

    let hidden = length - visible_suffix;
    let mut masked: String = std::iter::repeat_n(MASK_CHAR, hidden).collect();
    masked.extend(value.chars().skip(hidden));
    masked
}

/// Returns `true` when `value` starts with [`MASK_CHAR`].
///
/// Used as a guard so that re-submitting a masked projection never
/// overwrites the real secret.
pub fn is_masked(value: &str) -> bool {
    value.starts_with(MASK_CHAR)
}

const REDACTED_KEYS: [&str; 5] = ["bearer", "admintoken", "password", "token", "authorization"];

/// Redacts values that follow common secret markers in log-safe output.
///
/// Recognises `key=value`, `key: value`, `"key":"value"` and `Bearer value`
/// shapes, case-insensitively.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in REDACTED_KEYS {
        redacted = redact_key_value(&redacted, key);
    }
    redacted
}

fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(key) {
        let key_end = cursor + found + key.len();
        output.push_str(&input[cursor..key_end]);

        let separator: String = input[key_end..]
            .chars()
            .take_while(|c| matches!(c, '"' | '\'' | ':' | '=' | ' '))
            .collect();
        let assigns = separator.contains([':', '=']) || (key == "bearer" && !separator.is_empty());
        if !assigns {
            cursor = key_end;
            continue;
        }
        let separator_len = separator.len();

        let value_start = key_end + separator_len;
        let value_len = input[value_start..]
            .chars()
            .take_while(|c| !matches!(c, '"' | '\'' | ',' | '&' | '}' | ';') && !c.is_whitespace())
            .map(char::len_utf8)
            .sum::<usize>();

        output.push_str(&input[key_end..value_start]);
        if value_len > 0 {
            output.push_str("<redacted>");
        }
        cursor = value_start + value_len;
    }

    output.push_str(&input[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_visible_suffix() {
        assert_eq!(mask("abcdef123456", 4), "********3456");
        assert_eq!(mask("abcdef", 2), "****ef");
    }

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(mask("abcd", 4), SHORT_VALUE_MASK);
        assert_eq!(mask("a", 4), SHORT_VALUE_MASK);
        assert_eq!(mask("", 4), SHORT_VALUE_MASK);
    }

    #[test]
    fn masking_counts_characters_not_bytes() {
        assert_eq!(mask("çãoçãoçã", 2), "******çã");
    }

    #[test]
    fn redacts_header_and_json_shapes() {
        let raw = r#"{"token":"abc123","name":"bot"} admintoken: zzz999"#;
        let redacted = redact_sensitive(raw);
        assert!(!redacted.contains("abc123"));
        assert!(!redacted.contains("zzz999"));
        assert!(redacted.contains(r#""name":"bot""#));
    }

    #[test]
    fn redacts_bearer_credentials() {
        let redacted = redact_sensitive("authorization=Bearer abc123");
        assert!(!redacted.contains("abc123"));
        assert!(redacted.contains("<redacted>"));
    }

    #[test]
    fn prose_mentioning_a_marker_is_kept() {
        assert_eq!(
            redact_sensitive("missing token for instance"),
            "missing token for instance"
        );
    }

    #[test]
    fn leaves_text_without_markers_untouched() {
        assert_eq!(redact_sensitive("instance sales-bot ready"), "instance sales-bot ready");
    }
}
