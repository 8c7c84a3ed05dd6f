use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::dividend::DividendInfo;
use super::traits::InsightProvider;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini text-generation API used as a dividend lookup.
///
/// - **Requires**: API key (set via settings as "gemini").
/// - **Reliability**: answers are model-generated and unverified; treat
///   every field as display text.
///
/// The request asks for JSON output constrained by a response schema, so
/// the reply body is a JSON array of `DividendInfo`.
pub struct GeminiInsightProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiInsightProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Prompt listing the (already de-duplicated) tickers.
    pub fn build_prompt(symbols: &[String]) -> String {
        format!(
            "Analyze these stock tickers: {}.\n\
             Provide the most recent or upcoming dividend information for each.\n\
             If a stock does not pay dividends, set yield to \"0%\".\n\
             Return a JSON array.",
            symbols.join(", ")
        )
    }

    /// Extract the dividend list from a `generateContent` response body.
    ///
    /// An empty candidate list or empty text yields an empty list.
    pub fn parse_response(body: &str) -> Result<Vec<DividendInfo>, CoreError> {
        let resp: GenerateContentResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "Gemini".into(),
            message: format!("Malformed response envelope: {e}"),
        })?;

        let text = resp
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(text).map_err(|e| CoreError::Api {
            provider: "Gemini".into(),
            message: format!("Response is not a dividend list: {e}"),
        })
    }

    fn request_body(symbols: &[String]) -> GenerateContentRequest {
        let string = json!({ "type": "STRING" });
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Self::build_prompt(symbols),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: json!({
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "symbol": string,
                            "companyName": string,
                            "yield": string,
                            "payDate": { "type": "STRING", "description": "Next pay date or recent pay date" },
                            "exDate": { "type": "STRING", "description": "Next or recent ex-dividend date" },
                            "amountPerShare": string,
                        }
                    }
                }),
            },
        }
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl InsightProvider for GeminiInsightProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn fetch_dividend_insights(
        &self,
        symbols: &[String],
    ) -> Result<Vec<DividendInfo>, CoreError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&Self::request_body(symbols))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(CoreError::Api {
                provider: "Gemini".into(),
                message: format!("HTTP {}: {snippet}", status.as_u16()),
            });
        }

        Self::parse_response(&body)
    }
}
