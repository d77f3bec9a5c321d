use anyhow::Result;
use async_trait::async_trait;

pub mod calorieninjas;
pub mod clarifai;

// Re-export common types
pub use calorieninjas::CalorieNinjasClient;
pub use clarifai::{ClarifaiClient, FoodConcept};

/// Seam over the image classifier, so the predict flow can be driven
/// without the live Clarifai endpoint.
#[async_trait]
pub trait FoodClassifier: Send + Sync {
    /// Ranked food labels for a raw image, highest confidence first.
    async fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<FoodConcept>>;
}
