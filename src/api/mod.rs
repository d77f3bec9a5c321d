use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use validator::Validate;

use crate::config::{AppConfig, CorsOrigins, MAX_UPLOAD_BYTES};
use crate::food::api::{CalorieNinjasClient, ClarifaiClient, FoodClassifier};
use crate::providers::cohere::cohere::CohereProvider;
use crate::providers::traits::CompletionProvider;

const SERVICE_NAME: &str = "Nutrition Food API";

// The answer field is never left truly empty: an upstream reply with no
// content gets this fixed warning instead.
const EMPTY_REPLY_WARNING: &str =
    "[AI Warning] Cohere returned no content. Check your prompt or API quota.";
const MISSING_KEY_WARNING: &str =
    "[AI Warning] Missing COHERE_API_KEY, AI commentary is unavailable.";
const AI_ERROR_PREFIX: &str = "[AI Error]";

/// Shared per-process state: the three upstream clients, each present only
/// when its credential was configured at start-up.
#[derive(Clone)]
pub struct AppState {
    classifier: Option<Arc<dyn FoodClassifier>>,
    nutrition: Option<Arc<CalorieNinjasClient>>,
    assistant: Option<Arc<dyn CompletionProvider>>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            classifier: config
                .clarifai_pat
                .clone()
                .map(|pat| Arc::new(ClarifaiClient::new(pat)) as Arc<dyn FoodClassifier>),
            nutrition: config
                .calorie_api_key
                .clone()
                .map(|key| Arc::new(CalorieNinjasClient::new(key))),
            assistant: config
                .cohere_api_key
                .clone()
                .map(|key| Arc::new(CohereProvider::new(key)) as Arc<dyn CompletionProvider>),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    prompt: String,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    response: String,
}

#[derive(Debug, Serialize)]
struct AskReply {
    result: String,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    food_name: String,
    probability: f64,
    nutrition: Option<Value>,
    ai_answer: String,
}

/// Create and configure the API router
pub fn create_api(config: &AppConfig) -> Router {
    router(AppState::from_config(config)).layer(cors_layer(&config.allowed_origins))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict", post(predict))
        .route("/chat", post(chat).options(preflight))
        .route("/ask_ai", post(ask_ai))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    match origins {
        // Wildcard mode must not allow credentials, browsers reject the combination.
        CorsOrigins::Wildcard => layer.allow_origin(Any),
        CorsOrigins::List(list) => layer
            .allow_origin(AllowOrigin::list(origin_values(list)))
            .allow_credentials(origins.allow_credentials()),
    }
}

// A misconfigured origin must not silently vanish from the allow-list.
fn origin_values(list: &[String]) -> Vec<HeaderValue> {
    list.iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("[CORS] Dropping unparseable origin '{}'", origin);
                None
            }
        })
        .collect()
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// Health check / root endpoint
async fn root() -> Response {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "endpoints": ["/predict (POST)", "/chat (POST)", "/ask_ai (POST)"],
    }))
    .into_response()
}

// Fast path for preflight requests that bypass the CORS layer.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Runs one completion and substitutes the fixed warning when the model
/// answers with empty or whitespace-only text. Both chat-style endpoints
/// and the predict commentary step funnel through here.
async fn generate_text(
    provider: &dyn CompletionProvider,
    prompt: &str,
) -> anyhow::Result<String> {
    let text = provider.complete(prompt).await?;
    if text.trim().is_empty() {
        Ok(EMPTY_REPLY_WARNING.to_string())
    } else {
        Ok(text)
    }
}

/// Chat-relay core shared by /chat and /ask_ai; the two handlers differ
/// only in request/response field names.
async fn relay(state: &AppState, tag: &str, prompt: &str) -> Result<String, Response> {
    let provider = match &state.assistant {
        Some(provider) => provider,
        None => {
            return Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Missing COHERE_API_KEY",
            ))
        }
    };

    log::info!("[{}] Prompt sent to Cohere: {}", tag, prompt);
    match generate_text(provider.as_ref(), prompt).await {
        Ok(text) => {
            log::info!("[{}] Cohere replied: {}", tag, text);
            Ok(text)
        }
        Err(err) => {
            log::error!("[{}] Cohere error: {}", tag, err);
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_error(rejection.status(), rejection.body_text()),
    };
    if request.validate().is_err() {
        return json_error(StatusCode::BAD_REQUEST, "No message provided");
    }

    match relay(&state, "CHAT", &request.message).await {
        Ok(text) => Json(ChatReply { response: text }).into_response(),
        Err(response) => response,
    }
}

async fn ask_ai(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_error(rejection.status(), rejection.body_text()),
    };
    if request.validate().is_err() {
        return json_error(StatusCode::BAD_REQUEST, "No prompt provided");
    }

    match relay(&state, "ASK_AI", &request.prompt).await {
        Ok(text) => Json(AskReply { result: text }).into_response(),
        Err(response) => response,
    }
}

async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return json_error(rejection.status(), rejection.body_text()),
    };
    match run_predict(&state, multipart).await {
        Ok(response) => response,
        Err(err) => {
            log::error!("[PREDICT] Unhandled error: {}", err);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// The classify → nutrition → commentary sequence. Returns `Err` only for
/// failures the top-level catch should turn into a 500; every expected
/// outcome is already a shaped `Response`.
async fn run_predict(state: &AppState, mut multipart: Multipart) -> anyhow::Result<Response> {
    let image_bytes = match read_image_field(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Ok(json_error(StatusCode::BAD_REQUEST, "No image uploaded")),
        Err(response) => return Ok(response),
    };

    let classifier = match &state.classifier {
        Some(classifier) => classifier,
        None => {
            return Ok(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Missing CLARIFAI_PAT",
            ))
        }
    };

    let concepts = classifier.recognize(&image_bytes).await?;
    let top = match concepts.first() {
        Some(top) => top,
        None => {
            // Valid image, nothing recognized: reported inline, not as an
            // HTTP error, to keep it distinct from a missing upload.
            return Ok((StatusCode::OK, Json(json!({ "error": "No food detected" })))
                .into_response());
        }
    };
    let food_name = top.name.clone();
    let probability = top.value;
    log::info!(
        "[PREDICT] Recognized '{}' (confidence {:.2})",
        food_name,
        probability
    );

    let nutrition = match &state.nutrition {
        Some(client) => client.lookup(&food_name).await?,
        None => {
            log::warn!("[PREDICT] Missing CALORIE_API_KEY, skipping nutrition lookup");
            None
        }
    };
    log::debug!("[PREDICT] Nutrition raw: {:?}", nutrition);

    let prompt = commentary_prompt(&food_name, nutrition.as_ref());
    log::info!("[PREDICT] Prompt sent to Cohere: {}", prompt);

    // Commentary degrades instead of failing: once a label is known the
    // response is served even if the generation step cannot run.
    let ai_answer = match &state.assistant {
        Some(provider) => match generate_text(provider.as_ref(), &prompt).await {
            Ok(text) => text,
            Err(err) => {
                let answer = format!("{} {}", AI_ERROR_PREFIX, err);
                log::error!("[PREDICT] Cohere error: {}", answer);
                answer
            }
        },
        None => MISSING_KEY_WARNING.to_string(),
    };

    Ok(Json(PredictResponse {
        food_name,
        probability,
        nutrition,
        ai_answer,
    })
    .into_response())
}

fn commentary_prompt(food_name: &str, nutrition: Option<&Value>) -> String {
    let nutrition_str = nutrition
        .map(|n| n.to_string())
        .unwrap_or_else(|| "null".to_string());

    format!(
        "Analyze the dish '{}' given these nutrition facts: {}. \
         Point out the health benefits, any risks, and how to fit it into a \
         healthy diet. Keep the analysis short, easy to follow and aimed at \
         everyday consumers.",
        food_name, nutrition_str
    )
}

async fn read_image_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::body::Bytes>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(err) => return Err(multipart_error(err)),
        };

        if field.name() == Some("image") {
            match field.bytes().await {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(err) => return Err(multipart_error(err)),
            }
        }
    }
}

// Oversized uploads and malformed form data must still come back as JSON,
// never as the framework's plain-text error page.
fn multipart_error(err: MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        json_error(StatusCode::PAYLOAD_TOO_LARGE, "File too large, max 10MB")
    } else {
        json_error(err.status(), err.body_text())
    }
}
