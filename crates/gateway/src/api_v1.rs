//! REST API v1 for Codeward.
//!
//! Every route forwards to the shared [`ContextEngine`]. Engine errors map
//! to HTTP statuses: not found → 404, invalid configuration → 422,
//! everything else → 500, each with a JSON `{ "error": message }` body.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use codeward_context::{ContextEngine, Variant};
use codeward_core::{DetectedStack, ProfileSummary, SearchHit, StandardDocument, TaskType};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub type SharedApiState = Arc<ContextEngine>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/context", post(context_handler))
        .route("/stack", post(stack_handler))
        .route("/guardrails", post(guardrails_handler))
        .route("/classify", post(classify_handler))
        .route("/profiles", get(list_profiles_handler))
        .route("/profiles/{id}", get(get_profile_handler))
        .route("/standards/search", get(search_handler))
        .route("/standards/categories", get(categories_handler))
        .route("/standards/categories/{category}", get(category_handler))
        .route("/project-config", post(project_config_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error type returned by every v1 handler.
#[derive(Debug)]
pub enum ApiError {
    Engine(codeward_core::Error),
    BadRequest(String),
}

impl From<codeward_core::Error> for ApiError {
    fn from(e: codeward_core::Error) -> Self {
        Self::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Engine(e) if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            Self::Engine(e) if e.is_invalid() => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Engine(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ContextRequest {
    description: String,
    #[serde(default)]
    project_dir: Option<PathBuf>,
    /// Explicit profile id, beats every other selection rule.
    #[serde(default)]
    profile: Option<String>,
    /// `false` renders the compact variant without standards excerpts.
    #[serde(default = "default_true")]
    full: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct ProjectDirRequest {
    project_dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
pub struct StackResponse {
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<DetectedStack>,
}

#[derive(Deserialize)]
struct GuardrailsRequest {
    #[serde(default)]
    task_type: Option<TaskType>,
    /// Classified when no task type is given.
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    project_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct ClassifyRequest {
    description: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileSummary>,
    pub count: usize,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category: String,
    pub documents: Vec<StandardDocument>,
}

#[derive(Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub status: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn context_handler(
    State(engine): State<SharedApiState>,
    Json(req): Json<ContextRequest>,
) -> Result<Response, ApiError> {
    let variant = if req.full { Variant::Full } else { Variant::Compact };
    let resolved = engine
        .resolve(
            &req.description,
            req.project_dir.as_deref(),
            req.profile.as_deref(),
            variant,
        )
        .await?;
    Ok(Json(resolved).into_response())
}

async fn stack_handler(
    State(engine): State<SharedApiState>,
    Json(req): Json<ProjectDirRequest>,
) -> ApiResult<StackResponse> {
    let stack = engine.detect_stack(&req.project_dir).await?;
    Ok(Json(StackResponse {
        detected: stack.is_some(),
        stack,
    }))
}

async fn guardrails_handler(
    State(engine): State<SharedApiState>,
    Json(req): Json<GuardrailsRequest>,
) -> Result<Response, ApiError> {
    let task_type = match (req.task_type, req.description.as_deref()) {
        (Some(task_type), _) => task_type,
        (None, Some(description)) => engine.classify(description).task_type,
        (None, None) => {
            warn!("Guardrails requested without task type or description");
            return Err(ApiError::BadRequest(
                "either 'task_type' or 'description' is required".into(),
            ));
        }
    };
    let report = engine.guardrails(task_type, req.project_dir.as_deref()).await?;
    Ok(Json(report).into_response())
}

async fn classify_handler(
    State(engine): State<SharedApiState>,
    Json(req): Json<ClassifyRequest>,
) -> Response {
    Json(engine.classify(&req.description)).into_response()
}

async fn list_profiles_handler(State(engine): State<SharedApiState>) -> ApiResult<ProfileListResponse> {
    let profiles = engine.list_profiles().await?;
    Ok(Json(ProfileListResponse {
        count: profiles.len(),
        profiles,
    }))
}

async fn get_profile_handler(
    State(engine): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let profile = engine.describe_profile(&id).await?;
    Ok(Json(profile.as_ref()).into_response())
}

async fn search_handler(
    State(engine): State<SharedApiState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let results = engine.search_standards(&query.q).await?;
    Ok(Json(SearchResponse {
        query: query.q,
        results,
    }))
}

async fn categories_handler(State(engine): State<SharedApiState>) -> ApiResult<CategoryListResponse> {
    Ok(Json(CategoryListResponse {
        categories: engine.categories().await?,
    }))
}

async fn category_handler(
    State(engine): State<SharedApiState>,
    Path(category): Path<String>,
) -> ApiResult<CategoryResponse> {
    let documents = engine.standards_by_category(&category).await?;
    Ok(Json(CategoryResponse {
        category: category.to_lowercase(),
        documents,
    }))
}

async fn project_config_handler(
    State(engine): State<SharedApiState>,
    Json(req): Json<ProjectDirRequest>,
) -> Result<Response, ApiError> {
    let lookup = engine.load_project_config(&req.project_dir).await?;
    Ok(Json(lookup).into_response())
}

async fn invalidate_handler(State(engine): State<SharedApiState>) -> Json<InvalidateResponse> {
    engine.invalidate().await;
    Json(InvalidateResponse {
        status: "invalidated".into(),
    })
}
