use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::HostedImageRef;

/// Instruction sent with every image. Asks for strict JSON and an explicit
/// "no food" shape so the interpreter can tell absence apart from failure.
const FOOD_PROMPT: &str = "Analyze this image carefully. If you can see any food items, \
identify them and provide nutritional values in JSON format:\n\
{\"has_food\":true, \"items\":[{\"item_name\":\"food name\", \"total_calories\":number, \
\"total_protein\":number, \"total_carbs\":number, \"total_fats\":number}]}\n\n\
If there is NO food visible in the image, respond with:\n\
{\"has_food\":false, \"items\":[]}\n\n\
Only identify actual food items that are clearly visible. Do not guess or assume.";

// Low temperature keeps the output format stable across calls.
const TEMPERATURE: f64 = 0.1;
const TOP_P: f64 = 0.9;
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Seam for the vision-model backend, so the pipeline can be exercised with
/// mocks in tests.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Ask a vision model to describe the food in the referenced image.
    /// Returns the model's raw text response.
    async fn classify_food(&self, image_ref: &HostedImageRef) -> Result<String, PipelineError>;
}

/// OpenAI-compatible chat-completions client with an ordered candidate
/// model list. Each candidate is tried once per invocation; the first
/// HTTP 2xx answer wins.
pub struct GroqVisionClient {
    api_key: Option<String>,
    models: Vec<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl GroqVisionClient {
    pub fn new(api_key: Option<String>, models: Vec<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key,
            models,
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, model: &str, image_ref: &HostedImageRef) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        content_type: "text".to_string(),
                        text: FOOD_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        content_type: "image_url".to_string(),
                        image_url: ImageData {
                            url: image_ref.as_str().to_string(),
                        },
                    },
                ],
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
            stream: false,
        }
    }

    async fn try_model(
        &self,
        model: &str,
        api_key: &str,
        image_ref: &HostedImageRef,
    ) -> Result<String, String> {
        let request = self.build_request(model, image_ref);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        log::debug!("📥 Model {} response status: {}", model, status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_model_rejection(status, &error_text) {
                log::warn!("🔁 Model identifier {} rejected by the endpoint", model);
            }
            return Err(format!("HTTP {}: {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| e.to_string())?;
        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| "response contained no choices".to_string())
    }
}

/// A 400 whose body names the model means the identifier itself was
/// rejected; the next candidate may still work.
fn is_model_rejection(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::BAD_REQUEST && body.contains("model")
}

#[async_trait]
impl VisionService for GroqVisionClient {
    async fn classify_food(&self, image_ref: &HostedImageRef) -> Result<String, PipelineError> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::error!("❌ No vision model API key configured");
            return Err(PipelineError::ConfigurationMissing);
        };

        let mut last_error = "no candidate models configured".to_string();

        for model in &self.models {
            log::info!("🤖 Requesting nutrition analysis from model: {}", model);
            match self.try_model(model, api_key, image_ref).await {
                Ok(content) => {
                    log::info!("✅ Model {} answered ({} bytes)", model, content.len());
                    return Ok(content);
                }
                Err(message) => {
                    log::warn!("⚠️ Model {} failed: {}", model, message);
                    last_error = message;
                }
            }
        }

        log::error!("❌ All candidate models exhausted");
        Err(PipelineError::ModelFailure { last_error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn client_with_key() -> GroqVisionClient {
        GroqVisionClient::new(
            Some("test-key".to_string()),
            vec!["model-a".to_string(), "model-b".to_string()],
            "http://localhost:0/v1/chat/completions",
        )
    }

    #[test]
    fn test_request_body_shape() {
        let client = client_with_key();
        let image_ref = HostedImageRef("https://i.ibb.co/abc/food.jpg".to_string());
        let request = client.build_request("model-a", &image_ref);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "model-a");
        assert_eq!(body["temperature"], 0.1);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["top_p"], 0.9);
        assert_eq!(body["stream"], false);

        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert!(content[0]["text"]
            .as_str()
            .unwrap()
            .contains("\"has_food\":false"));
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "https://i.ibb.co/abc/food.jpg");
    }

    #[test]
    fn test_model_rejection_detection() {
        assert!(is_model_rejection(
            StatusCode::BAD_REQUEST,
            "The model `model-a` does not exist"
        ));
        assert!(!is_model_rejection(StatusCode::BAD_REQUEST, "bad image url"));
        assert!(!is_model_rejection(
            StatusCode::INTERNAL_SERVER_ERROR,
            "model overloaded"
        ));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let client = GroqVisionClient::new(
            None,
            vec!["model-a".to_string()],
            "http://localhost:0/v1/chat/completions",
        );
        let image_ref = HostedImageRef("data:image/jpeg;base64,AAAA".to_string());

        let err = client.classify_food(&image_ref).await.unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationMissing));
    }

    #[tokio::test]
    async fn test_exhausted_models_report_model_failure() {
        // Port 0 is unroutable, so every candidate fails at the transport
        // level and the client must report the exhausted list.
        let client = client_with_key();
        let image_ref = HostedImageRef("data:image/jpeg;base64,AAAA".to_string());

        let err = client.classify_food(&image_ref).await.unwrap_err();
        assert!(matches!(err, PipelineError::ModelFailure { .. }));
    }
}
