use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::db::ReviewerExchange;
use crate::error::{Error, Result};

const ASSESSMENT_PROMPT: &str = r#"You are an experienced academic editor. An author has received
peer-review feedback on a manuscript and has written a response to each reviewer's request.
For every reviewer you will see the REQUEST and the author's RESPONSE.

Judge how well the author's responses address what the reviewers asked for:
- A request with no response, or a response that ignores the request, counts as unaddressed
- A response that only promises future work counts as partially addressed
- A response that describes a concrete change to the manuscript counts as addressed

Write a short assessment in English covering each reviewer in turn, then give practical
suggestions for strengthening the weakest responses before resubmission.

End with these two sections, each starting on a new line:
SUGGESTION: <one paragraph with the most important next step>
FINAL SCORE: <an integer from 0 to 100 for how completely the requests were addressed>"#;

const CLAUDE_MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
    "claude-3-haiku-20240307",
];

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorBody {
    error: Option<ClaudeError>,
}

#[derive(Debug, Deserialize)]
struct ClaudeError {
    message: Option<String>,
}

pub struct ClaudeAgent {
    client: Client,
    api_key: String,
    model_index: usize,
}

/// Renders reviewer exchanges as the user message for the assessment prompt.
pub fn render_exchanges(exchanges: &[ReviewerExchange]) -> String {
    let mut out = String::new();
    for (i, exchange) in exchanges.iter().enumerate() {
        out.push_str(&format!("## Reviewer {}\n", i + 1));
        out.push_str("REQUEST:\n");
        out.push_str(exchange.request.as_deref().unwrap_or("(none)").trim());
        out.push_str("\nRESPONSE:\n");
        out.push_str(exchange.response.as_deref().unwrap_or("(no response)").trim());
        out.push_str("\n\n");
    }
    out
}

impl ClaudeAgent {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Agent(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model_index: 0,
        })
    }

    pub fn current_model(&self) -> &str {
        CLAUDE_MODELS[self.model_index]
    }

    fn next_model(&mut self) -> bool {
        if self.model_index < CLAUDE_MODELS.len() - 1 {
            self.model_index += 1;
            true
        } else {
            false
        }
    }

    pub async fn assess_revision(&mut self, exchanges: &[ReviewerExchange]) -> Result<String> {
        if exchanges.iter().all(ReviewerExchange::is_blank) {
            return Err(Error::InvalidInput(
                "review has no reviewer requests or responses to assess".to_string(),
            ));
        }

        let max_retries = 3;
        let mut retry_count = 0;
        let mut backoff = 2u64;
        let content = render_exchanges(exchanges);

        loop {
            let model = self.current_model().to_string();
            info!(
                "Assessing revision with model {} ({} reviewers)",
                model,
                exchanges.len()
            );

            let body = ClaudeRequest {
                model: model.clone(),
                max_tokens: 2000,
                system: ASSESSMENT_PROMPT.to_string(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: content.clone(),
                }],
            };

            let response = self
                .client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::Agent(format!("Request failed: {}", e)))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| Error::Agent(format!("Response read failed: {}", e)))?;

            if status.is_success() {
                let parsed: ClaudeResponse = serde_json::from_str(&text)
                    .map_err(|e| Error::Agent(format!("Parse error: {}", e)))?;

                if let Some(t) = parsed.content.into_iter().find_map(|block| block.text) {
                    info!("Revision assessed with model {}", model);
                    return Ok(t);
                }
                return Err(Error::Agent("No text in response".to_string()));
            }

            if status.as_u16() == 429 || status.as_u16() == 404 {
                warn!("Model {} unavailable ({})", model, status);
                if self.next_model() {
                    retry_count = 0;
                    continue;
                }
            }

            let retryable = status.is_server_error() || status.as_u16() == 429;
            if retry_count >= max_retries || !retryable {
                let message = serde_json::from_str::<ClaudeErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.error)
                    .and_then(|e| e.message)
                    .unwrap_or(text);
                return Err(Error::Agent(format!(
                    "{} after {} attempts: {}",
                    status,
                    retry_count + 1,
                    message
                )));
            }

            retry_count += 1;
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff *= 2;
        }
    }
}
