use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sender {
    User,
    #[default]
    System,
}

impl Sender {
    /// Wire value understood by the history backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::System => "sys",
        }
    }

    /// Anything that is not a user message renders as a system reply.
    pub fn from_str(s: &str) -> Self {
        match s {
            "user" => Sender::User,
            _ => Sender::System,
        }
    }
}

impl Serialize for Sender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Sender::from_str(&s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Client-side identity, used to address a row while its text changes.
    #[serde(skip, default = "new_message_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sender: Sender,
    #[serde(rename = "conversationId", default)]
    pub conversation_id: String,
    #[serde(skip, default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(conversation_id: &str, text: &str) -> Self {
        Self::new(Sender::User, conversation_id, text)
    }

    pub fn system(conversation_id: &str, text: &str) -> Self {
        Self::new(Sender::System, conversation_id, text)
    }

    fn new(sender: Sender, conversation_id: &str, text: &str) -> Self {
        Self {
            id: new_message_id(),
            text: text.to_string(),
            sender,
            conversation_id: conversation_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let msg = Message::system("c1", "hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"text": "hello", "sender": "sys", "conversationId": "c1"})
        );
    }

    #[test]
    fn test_unknown_sender_is_system() {
        let json = r#"{"text":"hi","sender":"assistant","conversationId":"c1","_id":"m1"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender, Sender::System);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_missing_sender_is_system() {
        let json = r#"[{"text":"a","sender":"user"},{"text":"legacy"}]"#;
        let msgs: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].sender, Sender::System);
        assert_eq!(msgs[1].text, "legacy");
    }

    #[test]
    fn test_loaded_messages_get_distinct_ids() {
        let json = r#"[{"text":"a","sender":"user"},{"text":"b","sender":"sys"}]"#;
        let msgs: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(msgs[0].sender, Sender::User);
        assert_ne!(msgs[0].id, msgs[1].id);
    }
}
