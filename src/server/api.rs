//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::ServiceConfig;
use crate::core::engine::{EngineLoader, MarianLoader};
use crate::core::errors::InferenceError;
use crate::core::models::{
    Mode, TranslationRequest, TransliterationRequest, INVALID_MODE_MESSAGE,
};
use crate::core::pool::ModelPool;
use crate::core::registry::LanguagePairRegistry;
use crate::core::translator::TranslationDispatcher;
use crate::server::openapi::ApiDoc;
use crate::transliteration::TransliterationDispatcher;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Application state
#[derive(Clone)]
pub struct AppState {
    translation: Arc<TranslationDispatcher>,
    transliteration: Arc<TransliterationDispatcher>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// State over both dispatchers, stamped with the start time
    pub fn new(
        translation: Arc<TranslationDispatcher>,
        transliteration: Arc<TransliterationDispatcher>,
    ) -> Self {
        Self {
            translation,
            transliteration,
            started_at: Utc::now(),
        }
    }
}

/// Body of `POST /process`
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// `translate` or `transliterate`
    pub mode: String,
    /// Text to convert
    #[serde(default)]
    pub text: String,
    /// Source language code
    #[serde(default)]
    pub source_language: String,
    /// Ignored when transliterating
    #[serde(default)]
    pub target_language: String,
}

/// Result string: converted text or a "not available" / invalid-mode message
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// Converted text or message
    pub result: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while serving
    pub status: String,
    /// Package name
    pub service: String,
    /// Package version
    pub version: String,
    /// Process start time
    pub started_at: DateTime<Utc>,
    /// Engines in the pool
    pub models_loaded: usize,
}

/// One registered translation pair
#[derive(Serialize, ToSchema)]
pub struct PairInfo {
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
    /// Checkpoint serving the pair
    pub model_id: String,
    /// Whether the pool holds an engine for it
    pub loaded: bool,
}

/// Supported languages response
#[derive(Serialize, ToSchema)]
pub struct LanguagesResponse {
    /// Registered pairs in (source, target) order
    pub translation: Vec<PairInfo>,
    /// Transliteration language codes
    pub transliteration: Vec<String>,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error body
    pub error: ErrorDetail,
}

/// Error fields
#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Human-readable description
    pub message: String,
    /// Machine-readable code, e.g. `inference_timeout`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error class
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Inference failure surfaced as a non-200 response
#[derive(Debug)]
pub struct ApiError(InferenceError);

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InferenceError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "inference_timeout"),
            InferenceError::Engine { .. } | InferenceError::Worker { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_error")
            }
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: Some(code.to_string()),
                kind: Some("server_error".to_string()),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}

/// UI page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        models_loaded: state.translation.pool().len(),
    })
}

/// List translation pairs and transliteration codes
#[utoipa::path(
    get,
    path = "/v1/languages",
    responses((status = 200, description = "Supported languages", body = LanguagesResponse))
)]
pub async fn list_languages(State(state): State<AppState>) -> axum::Json<LanguagesResponse> {
    let translation = state
        .translation
        .registry()
        .iter()
        .map(|(pair, spec)| PairInfo {
            source: pair.source.clone(),
            target: pair.target.clone(),
            model_id: spec.model_id.clone(),
            loaded: state.translation.pool().contains(pair),
        })
        .collect();

    let transliteration = state
        .transliteration
        .supported_languages()
        .into_iter()
        .map(str::to_string)
        .collect();

    axum::Json(LanguagesResponse {
        translation,
        transliteration,
    })
}

/// Translate or transliterate the submitted text
#[utoipa::path(
    post,
    path = "/process",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Result or soft failure message", body = ProcessResponse),
        (status = 500, description = "Inference failed", body = ErrorResponse),
        (status = 504, description = "Inference timed out", body = ErrorResponse)
    )
)]
pub async fn process(
    State(state): State<AppState>,
    Json(payload): Json<ProcessRequest>,
) -> Result<axum::Json<ProcessResponse>, ApiError> {
    let result = match payload.mode.parse::<Mode>() {
        Ok(Mode::Translate) => {
            let request = TranslationRequest::new(
                payload.text,
                payload.source_language,
                payload.target_language,
            );
            state.translation.translate(&request).await?.into_message()
        }
        Ok(Mode::Transliterate) => {
            let request = TransliterationRequest::new(payload.text, payload.source_language);
            state.transliteration.transliterate(&request).into_message()
        }
        Err(invalid) => {
            warn!("Invalid mode selected: {:?}", invalid.0);
            INVALID_MODE_MESSAGE.to_string()
        }
    };

    Ok(axum::Json(ProcessResponse { result }))
}

async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

/// Build the router over prepared dispatchers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/health", get(health_check))
        .route("/v1/languages", get(list_languages))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Materialize the registry and pool; any model failure aborts startup
pub fn build_state(config: &ServiceConfig, loader: &dyn EngineLoader) -> anyhow::Result<AppState> {
    let registry = LanguagePairRegistry::from_config(config)?;

    let pb = ProgressBar::new(registry.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    let pool = ModelPool::load_with_progress(&registry, loader, &pb)?;

    let translation = TranslationDispatcher::new(
        Arc::new(registry),
        Arc::new(pool),
        config.max_output_tokens,
        config.request_timeout(),
    );

    Ok(AppState::new(
        Arc::new(translation),
        Arc::new(TransliterationDispatcher::default()),
    ))
}

/// Run the HTTP server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let loader = MarianLoader::from_config(&config)?;
    let state = tokio::task::block_in_place(|| build_state(&config, &loader))?;

    let app = create_router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
