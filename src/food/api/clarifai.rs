use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::food::api::FoodClassifier;

// Public food-item-recognition model hosted under clarifai/main.
const MODEL_ENDPOINT: &str =
    "https://api.clarifai.com/v2/users/clarifai/apps/main/models/food-item-recognition/outputs";

#[derive(Debug, Error)]
pub enum ClarifaiError {
    #[error("Clarifai request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Clarifai returned status {0}: {1}")]
    Api(reqwest::StatusCode, String),
    #[error("unexpected Clarifai response shape: {0}")]
    Shape(String),
}

/// One recognized label with the classifier's confidence (0.0–1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodConcept {
    pub name: String,
    pub value: f64,
}

#[derive(Debug)]
pub struct ClarifaiClient {
    pat: String,
    endpoint: String,
    client: reqwest::Client,
}

impl ClarifaiClient {
    pub fn new(pat: String) -> Self {
        Self {
            pat,
            endpoint: MODEL_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Ranked food labels for a raw image, in the classifier's own order
    /// (descending confidence, ties left as returned).
    async fn predict(&self, image_bytes: &[u8]) -> Result<Vec<FoodConcept>, ClarifaiError> {
        let encoded = general_purpose::STANDARD.encode(image_bytes);
        log::debug!(
            "[CLARIFAI] Sending {} image bytes ({} base64)",
            image_bytes.len(),
            encoded.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Key {}", self.pat))
            .json(&json!({
                "inputs": [
                    { "data": { "image": { "base64": encoded } } }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClarifaiError::Api(status, body));
        }

        let body: Value = response.json().await?;
        parse_concepts(&body)
    }
}

#[async_trait]
impl FoodClassifier for ClarifaiClient {
    async fn recognize(&self, image_bytes: &[u8]) -> anyhow::Result<Vec<FoodConcept>> {
        Ok(self.predict(image_bytes).await?)
    }
}

/// Pulls `outputs[0].data.concepts` out of a prediction response. An absent
/// concepts list means the model recognized nothing, not a malformed reply.
pub(crate) fn parse_concepts(body: &Value) -> Result<Vec<FoodConcept>, ClarifaiError> {
    let data = body
        .pointer("/outputs/0/data")
        .ok_or_else(|| ClarifaiError::Shape("missing outputs[0].data".to_string()))?;

    let concepts = match data.get("concepts").and_then(Value::as_array) {
        Some(concepts) => concepts,
        None => return Ok(Vec::new()),
    };

    concepts
        .iter()
        .map(|concept| {
            let name = concept
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ClarifaiError::Shape("concept without a name".to_string()))?;
            let value = concept
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| ClarifaiError::Shape("concept without a value".to_string()))?;

            Ok(FoodConcept {
                name: name.to_string(),
                value,
            })
        })
        .collect()
}
