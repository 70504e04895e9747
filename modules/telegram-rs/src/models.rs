use serde::{Deserialize, Serialize};

/// Telegram `parse_mode`. Messages are rendered as HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
}

impl SendMessageRequest {
    pub fn html(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: Some(ParseMode::Html),
            disable_web_page_preview: true,
        }
    }
}

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<u16>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub date: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_request_serializes_flags() {
        let req = SendMessageRequest::html("-100123", "<b>hi</b>");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["chat_id"], "-100123");
        assert_eq!(json["text"], "<b>hi</b>");
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["disable_web_page_preview"], true);
    }

    #[test]
    fn plain_request_omits_parse_mode() {
        let req = SendMessageRequest {
            parse_mode: None,
            ..SendMessageRequest::html("1", "x")
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("parse_mode").is_none());
    }

    #[test]
    fn parses_error_envelope() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let resp: ApiResponse<Message> = serde_json::from_str(body).unwrap();

        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.error_code, Some(400));
        assert_eq!(
            resp.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[test]
    fn parses_success_envelope() {
        let body = r#"{"ok":true,"result":{"message_id":7,"date":1700000000,"chat":{"id":-100123,"type":"channel"},"text":"hi"}}"#;
        let resp: ApiResponse<Message> = serde_json::from_str(body).unwrap();

        let msg = resp.result.unwrap();
        assert_eq!(msg.message_id, 7);
        assert_eq!(msg.chat.id, -100123);
        assert_eq!(msg.text.as_deref(), Some("hi"));
    }
}
