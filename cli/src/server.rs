use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use cfw_core::{
    action::{self, BatchReport, NoopReporter, RunInput, RunReport},
    config::BuildProfile,
    extract_samples,
    storage::{self, ProblemDetail, ProblemSummary, Repository},
    testing::RawOutput,
    Sample, Verdict,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub struct AppState {
    repo: Repository,
    /// One build/run pipeline at a time: they share build dirs.
    pipeline: Mutex<()>,
}

impl AppState {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            pipeline: Mutex::new(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    /// The build/run pipeline could not be carried out.
    #[error("{0}")]
    Pipeline(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, verdict) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::Pipeline(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                Some(Verdict::internal_error(Local::now())),
            ),
        };
        (
            status,
            Json(ErrorResponse {
                error: message,
                verdict,
            }),
        )
            .into_response()
    }
}

impl From<storage::Error> for AppError {
    fn from(e: storage::Error) -> Self {
        use storage::Error::*;
        let msg = e.to_string();
        match e {
            NoSuchProblem(_) | NoSuchTestcase { .. } | NoSuchTemplate(_) => AppError::NotFound(msg),
            InvalidProblemName(_) => AppError::BadRequest(msg),
            ProblemAlreadyExists(_) => AppError::Conflict(msg),
            Fs(_) => AppError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<storage::Error>() {
            Ok(e) => e.into(),
            Err(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}

impl AppError {
    /// Storage errors keep their status; anything else means the program could not be run.
    fn pipeline(e: anyhow::Error) -> Self {
        match Self::from(e) {
            AppError::Internal(msg) => {
                log::error!("Pipeline failed: {}", msg);
                AppError::Pipeline(msg)
            }
            other => other,
        }
    }
}

type ApiResult<T> = Result<Json<T>, AppError>;

pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/problems", get(list_problems).post(create_problem))
        .route("/problems/{name}", get(get_problem))
        .route("/problems/{name}/statement", put(put_statement))
        .route("/problems/{name}/solution", put(put_solution))
        .route("/problems/{name}/run", post(run_problem))
        .route("/problems/{name}/test", post(test_problem))
        .route("/templates", get(list_templates))
        .route("/samples", post(extract))
        .route("/verdict", post(verdict))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

pub async fn serve(repo: Repository, address: &str) -> anyhow::Result<()> {
    use anyhow::Context as _;

    let app = router(Arc::new(AppState::new(repo)));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Cannot listen on {}", address))?;
    log::warn!("Serving on http://{}/api", listener.local_addr()?);
    axum::serve(listener, app).await.context("Server error")
}

async fn list_problems(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ProblemSummary>> {
    Ok(Json(state.repo.problems().summaries()?))
}

#[derive(Debug, Deserialize)]
struct CreateProblemRequest {
    name: String,
    template: Option<String>,
}

async fn create_problem(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProblemRequest>,
) -> Result<(StatusCode, Json<ProblemSummary>), AppError> {
    let problem = action::new_problem(&state.repo, &req.name, req.template.as_deref())?;
    Ok((StatusCode::CREATED, Json(problem.summary()?)))
}

async fn get_problem(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<ProblemDetail> {
    Ok(Json(state.repo.problems().open(&name)?.detail()?))
}

#[derive(Debug, Deserialize)]
struct StatementRequest {
    statement: String,
}

async fn put_statement(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<StatementRequest>,
) -> ApiResult<Vec<Sample>> {
    Ok(Json(action::import_statement(
        &state.repo,
        &name,
        &req.statement,
    )?))
}

#[derive(Debug, Deserialize)]
struct SolutionRequest {
    source: String,
}

async fn put_solution(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<SolutionRequest>,
) -> Result<StatusCode, AppError> {
    state.repo.problems().open(&name)?.save_solution(&req.source)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunRequest {
    profile: BuildProfile,
    /// Sample index; ignored when `input` is given.
    sample: Option<usize>,
    input: Option<String>,
}

async fn run_problem(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<RunRequest>,
) -> ApiResult<RunReport> {
    let input = match req.input {
        Some(text) => RunInput::Custom(text),
        None => RunInput::Sample(req.sample.unwrap_or(1)),
    };
    let _guard = state.pipeline.lock().await;
    let report = action::run_single(&state.repo, &name, req.profile, input)
        .await
        .map_err(AppError::pipeline)?;
    Ok(Json(report))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TestRequest {
    profile: BuildProfile,
}

async fn test_problem(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<TestRequest>,
) -> ApiResult<BatchReport> {
    let _guard = state.pipeline.lock().await;
    let report = action::test_all(&state.repo, &name, req.profile, &mut NoopReporter)
        .await
        .map_err(AppError::pipeline)?;
    Ok(Json(report))
}

async fn list_templates(State(state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    Ok(Json(state.repo.templates().list()?))
}

async fn extract(Json(req): Json<StatementRequest>) -> Json<Vec<Sample>> {
    Json(extract_samples(&req.statement))
}

async fn verdict(Json(raw): Json<RawOutput>) -> Json<Verdict> {
    Json(raw.verdict())
}
