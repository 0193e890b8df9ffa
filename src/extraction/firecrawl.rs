//! Firecrawl-backed extraction client.
//!
//! Talks to the `/v1/extract` endpoint: one POST per category carrying a
//! prompt and a JSON schema, answered by a `{success, data, error}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::extraction::{
    ExtractError, ExtractionClient, FallbackMode, RawProduct, RetryPolicy, synthetic,
};
use crate::models::config::ExtractionConfig;

/// Client for the Firecrawl extract endpoint.
pub struct FirecrawlClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    target_url_pattern: String,
    retry: RetryPolicy,
    fallback: FallbackMode,
}

/// Response envelope of the extract endpoint.
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<ExtractData>,
}

#[derive(Debug, Deserialize)]
struct ExtractData {
    #[serde(default)]
    products: Vec<RawProduct>,
}

impl FirecrawlClient {
    /// Build a client from configuration.
    pub fn from_config(
        config: &ExtractionConfig,
        fallback: FallbackMode,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            target_url_pattern: config.target_url_pattern.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
            fallback,
        })
    }

    /// Replace the retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request_category(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<RawProduct>, ExtractError> {
        let body = json!({
            "urls": [self.target_url_pattern],
            "prompt": extraction_prompt(category, limit),
            "schema": extraction_schema(),
        });

        let response = self
            .http
            .post(format!("{}/v1/extract", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }

        let payload: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidPayload(e.to_string()))?;

        if !payload.success {
            return Err(ExtractError::Api(payload.error.unwrap_or_else(|| {
                "extraction reported failure without detail".to_string()
            })));
        }

        let data = payload.data.ok_or_else(|| {
            ExtractError::InvalidPayload("success response carried no data".to_string())
        })?;

        Ok(data.products)
    }
}

#[async_trait]
impl ExtractionClient for FirecrawlClient {
    async fn fetch_category(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<RawProduct>, ExtractError> {
        let mut attempt = 0;
        let result = loop {
            match self.request_category(category, limit).await {
                Ok(products) => break Ok(products),
                Err(e) if attempt < self.retry.max_retries && e.is_retryable() => {
                    attempt += 1;
                    log::warn!("extraction attempt {attempt} for {category} failed, retrying: {e}");
                    actix_web::rt::time::sleep(self.retry.delay(attempt)).await;
                }
                Err(e) => break Err(e),
            }
        };

        match result {
            Err(e) if self.fallback == FallbackMode::Synthetic => {
                log::warn!("extraction for {category} failed, serving synthetic listings: {e}");
                Ok(synthetic::sample_products(category, limit))
            }
            other => other,
        }
    }
}

fn extraction_prompt(category: &str, limit: u32) -> String {
    format!(
        "Extract up to {limit} construction material product listings from the \
         {category} category. For each product capture sku, name, description, \
         price as a plain number, category, url, image_url, vendor, stock, \
         unit, specifications and availability."
    )
}

fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "products": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "sku": { "type": "string" },
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "price": { "type": "number" },
                        "category": { "type": "string" },
                        "url": { "type": "string" },
                        "image_url": { "type": "string" },
                        "vendor": { "type": "string" },
                        "stock": { "type": "string" },
                        "unit": { "type": "string" },
                        "specifications": {
                            "type": "object",
                            "additionalProperties": { "type": "string" }
                        },
                        "availability": {
                            "type": "string",
                            "enum": ["in_stock", "available_soon", "special_order"]
                        }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["products"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_category_and_limit() {
        let prompt = extraction_prompt("lumber", 10);
        assert!(prompt.contains("lumber"));
        assert!(prompt.contains("10"));
    }

    #[test]
    fn schema_requires_products_array() {
        let schema = extraction_schema();
        assert_eq!(schema["required"][0], "products");
        assert_eq!(schema["properties"]["products"]["type"], "array");
    }

    #[test]
    fn from_config_trims_trailing_slash() {
        let config = ExtractionConfig {
            base_url: "https://api.firecrawl.dev/".to_string(),
            ..ExtractionConfig::default()
        };
        let client = FirecrawlClient::from_config(&config, FallbackMode::None).unwrap();
        assert_eq!(client.base_url, "https://api.firecrawl.dev");
    }

    #[test]
    fn extract_response_decodes_products() {
        let payload: ExtractResponse = serde_json::from_value(json!({
            "success": true,
            "data": {
                "products": [
                    { "name": "Drywall Sheet 4x8", "price": 12.5 },
                    { "product_id": "HD-77", "name": "Joint Compound" }
                ]
            }
        }))
        .unwrap();

        assert!(payload.success);
        let data = payload.data.unwrap();
        assert_eq!(data.products.len(), 2);
        assert_eq!(data.products[1].sku.as_deref(), Some("HD-77"));
    }

    #[test]
    fn extract_response_tolerates_error_envelope() {
        let payload: ExtractResponse =
            serde_json::from_value(json!({ "success": false, "error": "quota exceeded" }))
                .unwrap();

        assert!(!payload.success);
        assert_eq!(payload.error.as_deref(), Some("quota exceeded"));
        assert!(payload.data.is_none());
    }
}
