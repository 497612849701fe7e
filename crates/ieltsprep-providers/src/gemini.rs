//! Gemini essay examiner.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ieltsprep_core::error::ServiceError;
use ieltsprep_core::grading::{parse_assessment, EssayAssessment, EssayRequest};
use ieltsprep_core::traits::EssayEvaluator;

use crate::error::{check_status, google_error_message, http_client, send_error, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Grades essays through the Gemini `generateContent` endpoint.
pub struct GeminiEvaluator {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiEvaluator {
    pub fn new(
        api_key: &str,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: api_key.trim().to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl GeminiEvaluator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| ProviderError::Client(format!("invalid base url: {e}")))?;

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;

        let what = format!("model {}", self.model);
        let response = check_status(response, &what, google_error_message).await?;

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        reply
            .first_text()
            .ok_or_else(|| ProviderError::InvalidResponse("reply has no candidate text".into()))
    }
}

#[async_trait]
impl EssayEvaluator for GeminiEvaluator {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model, words = request.word_count))]
    async fn evaluate(&self, request: &EssayRequest) -> Result<EssayAssessment, ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::MissingCredential(
                "Gemini API key (set IELTSPREP_GEMINI_KEY or [evaluator].api_key)".into(),
            ));
        }

        let text = self.generate(&request.prompt()).await?;
        let assessment = parse_assessment(&text)?;
        tracing::debug!(score = assessment.score, "essay graded");
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    fn request() -> EssayRequest {
        EssayRequest {
            essay: "Universities should focus on both theory and practical skills for work.".into(),
            word_count: 12,
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        })
    }

    #[tokio::test]
    async fn grades_fenced_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("IELTS Writing Examiner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(
                "```json\n{\"score\": 6.5, \"feedback\": \"Clear position. Limited range.\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("test-key", None, Some(server.uri())).unwrap();
        let assessment = evaluator.evaluate(&request()).await.unwrap();
        assert_eq!(assessment.score, 6.5);
        assert!(assessment.feedback.starts_with("Clear position"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("  ", None, Some(server.uri())).unwrap();
        let err = evaluator.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn invalid_key_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("bad-key", None, Some(server.uri())).unwrap();
        let err = evaluator.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthenticationFailed(ref m) if m == "API key not valid."));
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("I think it is a 7.")))
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("test-key", None, Some(server.uri())).unwrap();
        let err = evaluator.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("test-key", None, Some(server.uri())).unwrap();
        let err = evaluator.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let evaluator = GeminiEvaluator::new("test-key", None, Some(server.uri())).unwrap();
        let err = evaluator.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 429, .. }));
        assert!(!err.is_permanent());
    }
}
