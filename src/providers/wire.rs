//! JSON request and response shapes for the supported wire formats.

use crate::core::{ScoreError, WireFormat};

use serde_json::{json, Value};

/// Model sent with chat-style requests when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "default";

/// Builds the request body for `prompt`.
pub fn build_payload(format: WireFormat, prompt: &str, model: Option<&str>) -> Value {
    match format {
        WireFormat::Contents => json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        }),
        WireFormat::ChatMessages => json!({
            "model": model.unwrap_or(DEFAULT_CHAT_MODEL),
            "messages": [{ "role": "user", "content": prompt }]
        }),
    }
}

/// Pulls the reply text out of a response body.
///
/// # Errors
///
/// Returns `ScoreError::Parse` if the expected keys are missing or the
/// reply text is blank.
pub fn extract_text(format: WireFormat, provider: &str, body: &Value) -> Result<String, ScoreError> {
    let (text, path) = match format {
        WireFormat::Contents => (
            body.get("candidates")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("content"))
                .and_then(|c| c.get("parts"))
                .and_then(|p| p.get(0))
                .and_then(|p| p.get("text"))
                .and_then(Value::as_str),
            "candidates[0].content.parts[0].text",
        ),
        WireFormat::ChatMessages => (
            body.get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str),
            "choices[0].message.content",
        ),
    };

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(ScoreError::parse(provider, format!("{path} is blank"))),
        None => Err(ScoreError::parse(provider, format!("missing {path}"))),
    }
}

/// Pulls a human-readable error message out of an error body, if present.
pub fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_payload() {
        let payload = build_payload(WireFormat::Contents, "rate this", None);
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "rate this");
        assert!(payload.get("model").is_none());
    }

    #[test]
    fn test_chat_payload() {
        let payload = build_payload(WireFormat::ChatMessages, "rate this", Some("m-large"));
        assert_eq!(payload["model"], "m-large");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "rate this");

        let payload = build_payload(WireFormat::ChatMessages, "x", None);
        assert_eq!(payload["model"], DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_extract_contents() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Score: 0.85" }] } }]
        });
        assert_eq!(
            extract_text(WireFormat::Contents, "alpha", &body).unwrap(),
            "Score: 0.85"
        );
    }

    #[test]
    fn test_extract_chat() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "72%" } }]
        });
        assert_eq!(extract_text(WireFormat::ChatMessages, "beta", &body).unwrap(), "72%");
    }

    #[test]
    fn test_missing_keys_is_parse_error() {
        let body = json!({ "candidates": [] });
        let err = extract_text(WireFormat::Contents, "alpha", &body).unwrap_err();
        assert!(matches!(err, ScoreError::Parse { .. }));
        assert!(!err.is_transient());

        // A chat body is not a contents body.
        let body = json!({ "choices": [{ "message": { "content": "hi" } }] });
        assert!(extract_text(WireFormat::Contents, "alpha", &body).is_err());
    }

    #[test]
    fn test_blank_reply_is_parse_error() {
        let body = json!({ "choices": [{ "message": { "content": "   " } }] });
        let err = extract_text(WireFormat::ChatMessages, "beta", &body).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_error_message() {
        let body = json!({ "error": { "message": "quota exceeded", "code": 429 } });
        assert_eq!(error_message(&body).as_deref(), Some("quota exceeded"));
        assert_eq!(error_message(&json!({ "error": "bad key" })).as_deref(), Some("bad key"));
        assert_eq!(error_message(&json!({})), None);
    }
}
