use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::{authorize, endpoint, send, ClientError};
use super::session::Session;
use crate::models::{ConversationSummary, Message};

/// Conversation and message persistence on the backend.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Conversations in the order the backend returns them (oldest first).
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ClientError>;

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ClientError>;

    /// Create an empty conversation and return its id.
    async fn create_conversation(&self, name: &str) -> Result<String, ClientError>;

    async fn add_message(&self, message: &Message) -> Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
struct ConversationMessages {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct CreateConversation<'a> {
    name: &'a str,
    messages: [Message; 0],
}

#[derive(Debug, Deserialize)]
struct CreatedConversation {
    #[serde(rename = "_id")]
    id: String,
}

pub struct HistoryClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HistoryClient {
    pub fn new(base_url: Url, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }
}

#[async_trait]
impl HistoryApi for HistoryClient {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ClientError> {
        let url = endpoint(&self.base_url, &["api", "history"])?;
        let req = authorize(self.client.get(url), &self.session)?;
        let response = send(req, "Failed to fetch conversations").await?;

        response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse conversation list: {}", e))
        })
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ClientError> {
        let url = endpoint(&self.base_url, &["api", "history", conversation_id])?;
        let req = authorize(self.client.get(url), &self.session)?;
        let response = send(req, "Failed to fetch messages").await?;

        let body: ConversationMessages = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse messages: {}", e))
        })?;

        Ok(body
            .messages
            .into_iter()
            .map(|mut m| {
                if m.conversation_id.is_empty() {
                    m.conversation_id = conversation_id.to_string();
                }
                m
            })
            .collect())
    }

    async fn create_conversation(&self, name: &str) -> Result<String, ClientError> {
        let url = endpoint(&self.base_url, &["api", "create-history"])?;
        let body = CreateConversation { name, messages: [] };
        let req = authorize(self.client.post(url).json(&body), &self.session)?;
        let response = send(req, "Failed to create new chat").await?;

        let created: CreatedConversation = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse created conversation: {}", e))
        })?;
        Ok(created.id)
    }

    async fn add_message(&self, message: &Message) -> Result<(), ClientError> {
        let url = endpoint(&self.base_url, &["api", "add-message"])?;
        let req = authorize(self.client.post(url).json(message), &self.session)?;
        send(req, "Failed to save message").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HistoryClient {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        HistoryClient::new(base, Session::new(Some("tok".to_string())))
    }

    #[tokio::test]
    async fn test_list_conversations_keeps_service_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "a", "name": "A"},
                {"_id": "b", "name": "B"},
                {"_id": "c", "name": "C"}
            ])))
            .mount(&server)
            .await;

        let list = client_for(&server).list_conversations().await.unwrap();
        let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "c1",
                "name": "Chat",
                "messages": [
                    {"text": "hi", "sender": "user", "conversationId": "c1"},
                    {"text": "hello", "sender": "sys"}
                ]
            })))
            .mount(&server)
            .await;

        let messages = client_for(&server).fetch_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::System);
        assert_eq!(messages[1].conversation_id, "c1");
    }

    #[tokio::test]
    async fn test_fetch_messages_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_messages("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_conversations().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-history"))
            .and(body_json(json!({"name": "Recipes", "messages": []})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "new-id"})))
            .mount(&server)
            .await;

        let id = client_for(&server).create_conversation("Recipes").await.unwrap();
        assert_eq!(id, "new-id");
    }

    #[tokio::test]
    async fn test_add_message_posts_wire_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/add-message"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"text": "hi", "sender": "user", "conversationId": "c1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_message(&Message::user("c1", "hi"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logged_out_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let client = HistoryClient::new(base, Session::logged_out());
        let err = client.list_conversations().await.unwrap_err();
        assert!(matches!(err, ClientError::NotSignedIn));
    }
}
