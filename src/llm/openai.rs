use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    OpenAiConfig,
    llm::{
        BillExtractor, Extraction, ReceiptImage,
        prompt::{self, FunctionTool, InputMessage},
    },
    web::bill::data::Bill,
};

/// Client for the hosted Responses API.
/// Built once at start-up and shared by all requests.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(cfg: &OpenAiConfig) -> Result<Self, anyhow::Error> {
        if cfg.api_key.trim().is_empty() {
            bail!("no OpenAI API key configured, set OPENAI_API_KEY");
        }
        Ok(Self {
            client: Client::new(),
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            model: cfg.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage>,
    tools: Vec<FunctionTool>,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    FunctionCall { arguments: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl ResponsesResponse {
    fn into_extraction(self) -> Result<Extraction, anyhow::Error> {
        let arguments = self
            .output
            .into_iter()
            .find_map(|item| match item {
                OutputItem::FunctionCall { arguments } => Some(arguments),
                OutputItem::Other => None,
            })
            .ok_or_else(|| anyhow!("model response contained no function call"))?;

        let bill: Bill =
            serde_json::from_str(&arguments).context("failed to decode bill from model output")?;

        Ok(Extraction {
            bill,
            status: self.status,
        })
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_owned(),
    }
}

#[async_trait]
impl BillExtractor for OpenAiClient {
    async fn extract(&self, image: &ReceiptImage) -> Result<Extraction, anyhow::Error> {
        let body = ResponsesRequest {
            model: &self.model,
            input: prompt::build_input(image),
            tools: vec![prompt::bill_tool()],
        };

        debug!(
            model = %self.model,
            size_bytes = image.bytes.len(),
            "Sending receipt to model"
        );

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("model request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("model returned {}: {}", status, api_error_message(&error_body));
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .context("failed to parse model response")?;

        parsed.into_extraction()
    }
}
