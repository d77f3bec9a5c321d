use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const NUTRITION_URL: &str = "https://api.calorieninjas.com/v1/nutrition";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// CalorieNinjas nutrition lookup. The record comes back as an opaque JSON
/// blob; nothing downstream depends on its exact fields.
#[derive(Debug)]
pub struct CalorieNinjasClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl CalorieNinjasClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: NUTRITION_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Nutrition facts for a food name. A non-OK upstream status yields
    /// `None` (the predict flow carries on without nutrition data); only
    /// transport failures bubble up as errors.
    pub async fn lookup(&self, food_name: &str) -> Result<Option<Value>> {
        let response = self
            .client
            .get(&self.base_url)
            .header("X-Api-Key", &self.api_key)
            .query(&[("query", food_name)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("nutrition lookup request failed")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[NUTRITION] CalorieNinjas returned {}: {}", status, body);
            return Ok(None);
        }

        let body = response
            .json()
            .await
            .context("invalid nutrition lookup response")?;
        Ok(Some(body))
    }
}
