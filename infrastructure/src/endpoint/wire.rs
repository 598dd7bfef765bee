//! JSON bodies exchanged with the completion edge function

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompletionBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CompletionReply {
    pub response: Option<String>,
    pub tokens: Option<u64>,
    pub cost: Option<f64>,
    pub error: Option<String>,
}

/// Pull a human-readable message out of an error body, falling back to the raw text
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .or_else(|| json.get("message"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = CompletionBody {
            model: "gpt-4o-mini",
            prompt: "hi",
            max_tokens: 64,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["maxTokens"], 64);
        assert_eq!(json["model"], "gpt-4o-mini");
    }

    #[test]
    fn test_reply_tolerates_missing_fields() {
        let reply: CompletionReply = serde_json::from_str(r#"{"response": "ok"}"#).unwrap();
        assert_eq!(reply.response.as_deref(), Some("ok"));
        assert_eq!(reply.tokens, None);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": "quota exceeded"}"#), "quota exceeded");
        assert_eq!(
            error_message(r#"{"error": {"message": "bad model"}}"#),
            "bad model"
        );
        assert_eq!(error_message(r#"{"message": "nope"}"#), "nope");
        assert_eq!(error_message("  plain text  "), "plain text");
    }
}
