use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use url::Url;

use super::session::Session;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("{context}: HTTP {status} {reason}")]
    RequestFailed {
        context: &'static str,
        status: u16,
        reason: &'static str,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Attach the bearer token of `session`, refusing to send anonymous requests.
pub fn authorize(req: RequestBuilder, session: &Session) -> Result<RequestBuilder, ClientError> {
    let token = session.token().ok_or(ClientError::NotSignedIn)?;
    Ok(req.bearer_auth(token))
}

/// Append path segments to a base URL, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub async fn send(req: RequestBuilder, context: &'static str) -> Result<Response, ClientError> {
    let response = req
        .send()
        .await
        .map_err(|e| ClientError::NetworkError(format!("{}: {}", context, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::RequestFailed {
            context,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown"),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("http://localhost:5000/").unwrap();
        let url = endpoint(&base, &["api", "history", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/history/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://host/prefix/").unwrap();
        let url = endpoint(&base, &["gemini"]).unwrap();
        assert_eq!(url.as_str(), "http://host/prefix/gemini");
    }

    #[test]
    fn test_status_error_message() {
        let err = ClientError::RequestFailed {
            context: "Failed to fetch messages",
            status: 404,
            reason: "Not Found",
        };
        assert_eq!(err.to_string(), "Failed to fetch messages: HTTP 404 Not Found");
    }

    #[test]
    fn test_anonymous_requests_are_refused() {
        let client = reqwest::Client::new();
        let req = client.get("http://localhost/");
        assert!(matches!(
            authorize(req, &Session::logged_out()),
            Err(ClientError::NotSignedIn)
        ));
    }
}
