use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::{authorize, endpoint, send, ClientError};
use super::session::Session;
use crate::models::{ImageAttachment, ModelId};

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub model: ModelId,
    pub query: String,
    pub image: Option<ImageAttachment>,
}

/// The model-serving endpoint: one complete reply per query.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

pub struct InferenceClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl InferenceClient {
    pub fn new(base_url: Url, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    fn build_form(query: String, image: ImageAttachment) -> Result<Form, ClientError> {
        let part = Part::bytes(image.data)
            .file_name(image.filename)
            .mime_str(&image.mime_type)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid image type: {}", e)))?;
        Ok(Form::new().text("query", query).part("image", part))
    }
}

#[async_trait]
impl InferenceApi for InferenceClient {
    async fn query(&self, request: QueryRequest) -> Result<String, ClientError> {
        let url = endpoint(&self.base_url, &[request.model.as_str()])?;

        let req = match request.image {
            Some(image) => {
                let form = Self::build_form(request.query, image)?;
                self.client.post(url).multipart(form)
            }
            None => self.client.post(url).json(&QueryBody {
                query: &request.query,
            }),
        };
        let req = authorize(req, &self.session)?;

        tracing::debug!("Querying model {}", request.model.as_str());
        let response = send(req, "Failed to fetch response from model").await?;

        let body: QueryResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse model response: {}", e))
        })?;
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> InferenceClient {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        InferenceClient::new(base, Session::new(Some("tok".to_string())))
    }

    #[tokio::test]
    async fn test_query_posts_to_model_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gpt2"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"query": "  hello "})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi there"})))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .query(QueryRequest {
                model: ModelId::Gpt2,
                query: "  hello ".to_string(),
                image: None,
            })
            .await
            .unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn test_query_with_image_is_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini"))
            .and(body_string_contains("name=\"query\""))
            .and(body_string_contains("name=\"image\"; filename=\"cat.png\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "A cat"})))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .query(QueryRequest {
                model: ModelId::Gemini,
                query: "what is this?".to_string(),
                image: Some(ImageAttachment {
                    filename: "cat.png".to_string(),
                    mime_type: "image/png".to_string(),
                    data: b"fake image bytes".to_vec(),
                }),
            })
            .await
            .unwrap();
        assert_eq!(reply, "A cat");
    }

    #[tokio::test]
    async fn test_bad_image_type_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "x"})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query(QueryRequest {
                model: ModelId::Gemini,
                query: "what is this?".to_string(),
                image: Some(ImageAttachment {
                    filename: "cat.png".to_string(),
                    mime_type: "not a mime type".to_string(),
                    data: b"fake image bytes".to_vec(),
                }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query(QueryRequest {
                model: ModelId::Llama3,
                query: "hi".to_string(),
                image: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_missing_response_field_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query(QueryRequest {
                model: ModelId::Bart,
                query: "hi".to_string(),
                image: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
