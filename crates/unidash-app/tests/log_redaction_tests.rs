//! Integration tests for log redaction.

use unidash_app::redact_sensitive;

#[test]
fn log_redaction_tests_removes_obvious_secret_markers() {
    let raw = "authorization=Bearer abc123";
    let redacted = redact_sensitive(raw);

    assert!(redacted.contains("<redacted>"));
    assert!(!redacted.contains("abc123"));
}

#[test]
fn log_redaction_tests_scrubs_gateway_headers_and_bodies() {
    let raw = r#"request failed: admintoken: s3cr3t-admin body={"token":"inst-9f8e"}"#;
    let redacted = redact_sensitive(raw);

    assert!(!redacted.contains("s3cr3t-admin"));
    assert!(!redacted.contains("inst-9f8e"));
    assert!(redacted.starts_with("request failed: "));
}
