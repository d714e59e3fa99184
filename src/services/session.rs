use anyhow::Result;

use super::database::Database;

const AUTH_TOKEN_KEY: &str = "auth_token";
const LAST_CONVERSATION_KEY: &str = "last_conversation";

/// Credentials for the current user, passed explicitly to every client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

pub struct SessionService;

impl SessionService {
    /// Read the session from the local store. A token supplied by the caller
    /// (the environment override) is written through first.
    pub async fn load(db: &Database, override_token: Option<String>) -> Result<Session> {
        if let Some(token) = override_token.filter(|t| !t.trim().is_empty()) {
            db.set_setting(AUTH_TOKEN_KEY, token.trim()).await?;
        }
        let token = db.get_setting(AUTH_TOKEN_KEY).await?;
        Ok(Session::new(token))
    }

    pub async fn last_conversation(db: &Database) -> Option<String> {
        match db.get_setting(LAST_CONVERSATION_KEY).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to read last conversation: {}", e);
                None
            }
        }
    }

    pub async fn remember_conversation(db: &Database, conversation_id: &str) -> Result<()> {
        db.set_setting(LAST_CONVERSATION_KEY, conversation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_logged_out() {
        let db = Database::new_in_memory().unwrap();
        let session = SessionService::load(&db, None).await.unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session, Session::logged_out());
    }

    #[tokio::test]
    async fn test_stored_token_is_logged_in() {
        let db = Database::new_in_memory().unwrap();
        db.set_setting(AUTH_TOKEN_KEY, "abc").await.unwrap();
        let session = SessionService::load(&db, None).await.unwrap();
        assert_eq!(session.token(), Some("abc"));
    }

    #[tokio::test]
    async fn test_override_is_persisted() {
        let db = Database::new_in_memory().unwrap();
        db.set_setting(AUTH_TOKEN_KEY, "old").await.unwrap();
        let session = SessionService::load(&db, Some(" new ".to_string())).await.unwrap();
        assert_eq!(session.token(), Some("new"));

        let again = SessionService::load(&db, None).await.unwrap();
        assert_eq!(again.token(), Some("new"));
    }

    #[tokio::test]
    async fn test_blank_token_is_logged_out() {
        let db = Database::new_in_memory().unwrap();
        db.set_setting(AUTH_TOKEN_KEY, "   ").await.unwrap();
        let session = SessionService::load(&db, Some(String::new())).await.unwrap();
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new(Some("secret".to_string()));
        assert!(!format!("{:?}", session).contains("secret"));
    }

    #[tokio::test]
    async fn test_last_conversation_roundtrip() {
        let db = Database::new_in_memory().unwrap();
        assert!(SessionService::last_conversation(&db).await.is_none());
        SessionService::remember_conversation(&db, "c42").await.unwrap();
        assert_eq!(SessionService::last_conversation(&db).await.as_deref(), Some("c42"));
    }
}
