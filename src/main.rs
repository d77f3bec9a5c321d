use anyhow::Result;
use dotenv::dotenv;
use tokio::net::TcpListener;

use nutrition_food_api::api::create_api;
use nutrition_food_api::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Nutrition Food API...");

    let config = AppConfig::from_env();
    if config.clarifai_pat.is_none() {
        log::warn!("⚠️ CLARIFAI_PAT not set, /predict will reject every request");
    }
    if config.calorie_api_key.is_none() {
        log::warn!("⚠️ CALORIE_API_KEY not set, nutrition lookup will be skipped");
    }
    if config.cohere_api_key.is_none() {
        log::warn!("⚠️ COHERE_API_KEY not set, AI commentary is unavailable");
    }
    log::info!("✅ CORS origins: {:?}", config.allowed_origins);

    let app = create_api(&config);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("🌐 Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
