use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::generator::SongGenerator;

pub const NO_TEXT_SENTINEL: &str = "Error: Could not extract text from the Gemini response.";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig, timeout: Duration) -> Result<Self, GeneratorError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SongGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GeneratorError::Status { status, body });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty());

        match text {
            Some(text) => {
                debug!("Gemini returned {} characters", text.len());
                Ok(text)
            }
            None => {
                warn!("Gemini response contained no text");
                Ok(NO_TEXT_SENTINEL.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> GeminiClient {
        let config = GeneratorConfig {
            api_key: "test-key".to_string(),
            endpoint: format!("{}/v1beta/models/gemini:generateContent", server.url()),
        };
        GeminiClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini:generateContent")
            .match_query(Matcher::UrlEncoded("key".to_string(), "test-key".to_string()))
            .match_body(Matcher::Json(json!({
                "contents": [{"parts": [{"text": "make me a playlist"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"Queen, Under Pressure;"}]}}]}"#,
            )
            .create_async()
            .await;

        let text = client_for(&server).generate("make me a playlist").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Queen, Under Pressure;");
    }

    #[tokio::test]
    async fn test_generate_without_text_returns_sentinel() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let text = client_for(&server).generate("prompt").await.unwrap();
        assert_eq!(text, NO_TEXT_SENTINEL);
    }

    #[tokio::test]
    async fn test_generate_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini:generateContent")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = client_for(&server).generate("prompt").await;
        assert!(matches!(result, Err(GeneratorError::Status { .. })));
    }
}
