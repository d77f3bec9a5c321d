//! Standalone classify-then-lookup flow for a local image, no server needed.
//!
//! Usage: `foodninja <image-path>` with CLARIFAI_PAT (and optionally
//! CALORIE_API_KEY) in the environment.

use anyhow::{anyhow, Result};
use dotenv::dotenv;
use std::env;
use std::fs;

use nutrition_food_api::food::api::{CalorieNinjasClient, ClarifaiClient, FoodClassifier};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();

    let image_path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: foodninja <image-path>"))?;
    let pat = env::var("CLARIFAI_PAT").map_err(|_| anyhow!("CLARIFAI_PAT must be set"))?;

    let image_bytes = fs::read(&image_path)?;
    let classifier = ClarifaiClient::new(pat);
    let concepts = classifier.recognize(&image_bytes).await?;

    let top = match concepts.first() {
        Some(top) => top,
        None => {
            println!("Could not recognize a dish in the image.");
            return Ok(());
        }
    };
    println!(
        "Recognized dish: {} (confidence: {:.2})",
        top.name, top.value
    );

    match env::var("CALORIE_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let nutrition = CalorieNinjasClient::new(key).lookup(&top.name).await?;
            match nutrition {
                Some(facts) => {
                    println!("Nutrition facts:\n{}", serde_json::to_string_pretty(&facts)?)
                }
                None => println!("No nutrition data returned for '{}'", top.name),
            }
        }
        _ => println!("CALORIE_API_KEY not set, skipping nutrition lookup."),
    }

    Ok(())
}
