use crate::config::LlmSettings;
use crate::error::{BriefingError, Result};
use crate::llm::prompts::{analysis_prompt, SYSTEM_PROMPT_ANALYST};
use crate::llm::types::*;
use crate::schema::FlatRecord;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct NarrativeClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl NarrativeClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    /// Sends one user prompt and returns the model's text reply.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT_ANALYST),
                ChatMessage::user(prompt),
            ],
            temperature: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        };

        debug!("Sending {} character prompt to {}", prompt.len(), self.model);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(BriefingError::NarrativeFailed(format!(
                "Chat completion error (status {}): {}",
                status, err_text
            )));
        }

        let body: ChatCompletionResponse = res.json().await?;
        body.first_text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| BriefingError::NarrativeFailed("No content in completion".to_string()))
    }

    /// Asks for the six-section health analysis of one balance sheet.
    pub async fn analyze(&self, record: &FlatRecord, target_date: &str) -> Result<String> {
        info!("Requesting analysis of {} balance sheet", record.date);
        let record_json = serde_json::to_string(record)?;
        self.complete(&analysis_prompt(&record_json, target_date)).await
    }
}
