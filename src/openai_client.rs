use crate::analysis::build_instruction_block;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ImageRef, Usage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the vision-capable chat-completion provider (OpenAI wire
/// format).
///
/// One request per building analysis; no retry. Vision completions are slow,
/// so the client timeout is generous compared to the geodata services.
#[derive(Clone)]
pub struct OpenAiVisionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// One part of a multimodal user message.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: String },
    ImageUrl { image_url: ImageUrlPart<'a> },
}

#[derive(Serialize)]
struct ImageUrlPart<'a> {
    url: &'a str,
    detail: &'static str,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    response_format: ResponseFormat,
}

/// Chat-completion response envelope; only the fields this service reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice, treating an empty string as no content.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

impl OpenAiVisionClient {
    /// Creates a new `OpenAiVisionClient` from configuration.
    ///
    /// An empty configured credential is a `ConfigurationError`; startup
    /// config loading normally rejects that case already.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        if config.openai_api_key.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "OpenAI API key not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                AppError::ConfigurationError(format!("Failed to create OpenAI client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        })
    }

    /// Submits one multimodal JSON-mode completion for the given address and
    /// image list.
    ///
    /// The message is a single user turn: the instruction block as text,
    /// followed by each image in order with its requested detail level.
    ///
    /// # Arguments
    ///
    /// * `address` - The caller-supplied address, pinned into the prompt.
    /// * `images` - Ordered image references (first conventionally aerial).
    ///
    /// # Returns
    ///
    /// * `Result<ChatCompletion, AppError>` - The provider response envelope.
    pub async fn analyze_building(
        &self,
        address: &str,
        images: &[ImageRef],
    ) -> Result<ChatCompletion, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut content = Vec::with_capacity(images.len() + 1);
        content.push(ContentPart::Text {
            text: build_instruction_block(address),
        });
        for image in images {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrlPart {
                    url: image.url(),
                    detail: image.detail().as_str(),
                },
            });
        }

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        tracing::info!(
            "Requesting building analysis for '{}' with {} image(s)",
            address,
            images.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "Model provider returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            AppError::UpstreamFormat(format!("Failed to parse model provider response: {}", e))
        })?;

        Ok(completion)
    }
}
