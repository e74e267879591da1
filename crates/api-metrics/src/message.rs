use serde::{Deserialize, Serialize};

/// `say` tag carried by messages that record the start of an API request.
pub const API_REQ_STARTED: &str = "api_req_started";

/// Discriminator of a session message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    Ask {
        #[serde(default)]
        ask: String,
    },
    Say {
        #[serde(default)]
        say: String,
    },
}

/// One entry of the host's session message log
///
/// Fields the metrics pipeline does not use (images, partial flags, ...)
/// are ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionMessage {
    /// Epoch millis; non-decreasing across a log, ties allowed
    pub ts: i64,
    #[serde(flatten)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SessionMessage {
    pub fn say(ts: i64, say: impl Into<String>, text: Option<String>) -> Self {
        Self {
            ts,
            kind: MessageKind::Say { say: say.into() },
            text,
        }
    }

    pub fn ask(ts: i64, ask: impl Into<String>, text: Option<String>) -> Self {
        Self {
            ts,
            kind: MessageKind::Ask { ask: ask.into() },
            text,
        }
    }

    /// Shorthand for an `api_req_started` message with the given payload
    pub fn api_request_started(ts: i64, payload: impl Into<String>) -> Self {
        Self::say(ts, API_REQ_STARTED, Some(payload.into()))
    }

    pub fn is_api_request_started(&self) -> bool {
        matches!(&self.kind, MessageKind::Say { say } if say == API_REQ_STARTED)
    }

    pub fn payload(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_request_message_and_ignores_extra_fields() {
        let raw = r#"{"ts":1000,"type":"say","say":"api_req_started","text":"{}","partial":false}"#;
        let message: SessionMessage = serde_json::from_str(raw).expect("deserialize");

        assert_eq!(message.ts, 1000);
        assert!(message.is_api_request_started());
        assert_eq!(message.payload(), Some("{}"));
    }

    #[test]
    fn ask_messages_are_not_api_requests() {
        let raw = r#"{"ts":5,"type":"ask","ask":"api_req_started"}"#;
        let message: SessionMessage = serde_json::from_str(raw).expect("deserialize");

        assert!(!message.is_api_request_started());
        assert_eq!(message.payload(), None);
    }

    #[test]
    fn other_say_tags_are_not_api_requests() {
        let message = SessionMessage::say(1, "text", Some("hello".to_string()));
        assert!(!message.is_api_request_started());
    }

    #[test]
    fn serialization_keeps_the_type_tag() {
        let message = SessionMessage::api_request_started(42, "{}");
        let json = serde_json::to_value(&message).expect("serialize");

        assert_eq!(json["type"], "say");
        assert_eq!(json["say"], API_REQ_STARTED);
        assert_eq!(json["ts"], 42);
    }
}
