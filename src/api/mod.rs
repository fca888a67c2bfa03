use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::catalog::{CatalogSource, sample};
use crate::db::sanitize_student_name;
use crate::error::{AppError, ParseError};
use crate::extract::{self, CreditTotals, FileReport, ParseOptions, ParsedFile};
use crate::models::*;
use crate::services::{self, Progress};
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Deserialize)]
struct CourseQueryParams {
    semester: Option<String>,
    requirement: Option<String>,
}

#[derive(Deserialize)]
struct ParseQueryParams {
    filename: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCourseRequest {
    pub semester: String,
    pub course_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlanChange {
    pub changed: bool,
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    #[serde(flatten)]
    pub progress: Progress,
    pub total_credits: f64,
    pub credits_by_semester: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct ParseStatus {
    pub source: CatalogSource,
    pub loaded_at: DateTime<Utc>,
    pub total_files_processed: usize,
    pub total_courses_found: usize,
    pub total_requirements_found: usize,
    pub parse_results: Vec<FileReport>,
    pub totals: CreditTotals,
}

#[derive(Debug, Serialize)]
pub struct CatalogData {
    pub courses: Vec<Course>,
    pub requirements: Vec<Requirement>,
}

/// Result of parsing one uploaded document. Failures are values so batches always complete.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    Success(ParsedFile),
    Error { filename: String, error: String },
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/requirements", get(list_requirements))
        .route("/sample-data", get(sample_data))
        .route("/parse-status", get(parse_status))
        .route("/catalog/reload", post(reload_catalog))
        .route("/parse", post(parse_upload))
        .route("/parse/batch", post(parse_batch))
        .route("/plans", get(list_plans))
        .route("/plans/{student}", get(get_plan).put(save_plan).delete(delete_plan))
        .route("/plans/{student}/courses", post(add_plan_course))
        .route("/plans/{student}/courses/{semester}/{course_id}", delete(remove_plan_course))
        .route("/plans/{student}/progress", get(plan_progress))
        .route("/plans/{student}/export", get(export_plan))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.plans.list().await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let catalog = state.catalog.snapshot().await;
    let courses = catalog
        .courses()
        .iter()
        .filter(|c| params.semester.as_deref().is_none_or(|s| c.semester == s))
        .filter(|c| params.requirement.as_deref().is_none_or(|r| c.satisfies_requirement(r)))
        .cloned()
        .collect();
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let catalog = state.catalog.snapshot().await;
    let course = catalog.course(&id).cloned().ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn list_requirements(State(state): State<AppState>) -> Result<Json<Vec<Requirement>>, AppError> {
    let catalog = state.catalog.snapshot().await;
    Ok(Json(catalog.requirements().to_vec()))
}

async fn sample_data() -> Json<CatalogData> {
    let catalog = sample::sample_catalog();
    Json(CatalogData {
        courses: catalog.courses().to_vec(),
        requirements: catalog.requirements().to_vec(),
    })
}

async fn parse_status(State(state): State<AppState>) -> Json<ParseStatus> {
    let catalog = state.catalog.snapshot().await;
    Json(ParseStatus {
        source: catalog.source,
        loaded_at: catalog.loaded_at,
        total_files_processed: catalog.reports.len(),
        total_courses_found: catalog.courses().len(),
        total_requirements_found: catalog.requirements().len(),
        parse_results: catalog.reports.clone(),
        totals: catalog.totals.clone(),
    })
}

async fn reload_catalog(State(state): State<AppState>) -> Result<Json<ParseStatus>, AppError> {
    state.catalog.reload().await?;
    Ok(parse_status(State(state)).await)
}

async fn parse_upload(
    State(state): State<AppState>,
    Query(params): Query<ParseQueryParams>,
    body: Bytes,
) -> (StatusCode, Json<ParseOutcome>) {
    let outcome = parse_document(state.catalog.options().parse.clone(), params.filename, body).await;
    let status = match &outcome {
        ParseOutcome::Success(_) => StatusCode::OK,
        ParseOutcome::Error { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(outcome))
}

async fn parse_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<ParseOutcome>>, AppError> {
    let options = state.catalog.options().parse.clone();
    let mut outcomes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        outcomes.push(parse_document(options.clone(), filename, bytes).await);
    }

    info!("Parsed batch of {} files", outcomes.len());
    Ok(Json(outcomes))
}

async fn parse_document(options: ParseOptions, filename: String, bytes: Bytes) -> ParseOutcome {
    let name = filename.clone();
    let result = tokio::task::spawn_blocking(move || extract::parse_bytes(&name, &bytes, &options)).await;
    match result {
        Ok(Ok(parsed)) => ParseOutcome::Success(parsed),
        Ok(Err(e)) => failed(filename, &e),
        Err(e) => {
            error!("parse task for {} failed: {}", filename, e);
            ParseOutcome::Error { filename, error: "Internal parser failure".to_string() }
        }
    }
}

fn failed(filename: String, error: &ParseError) -> ParseOutcome {
    ParseOutcome::Error { filename, error: error.to_string() }
}

/// Every store call and plan lock goes through this key, so names that
/// sanitize alike ("Jane Doe", "Jane_Doe") address one plan.
fn plan_key(student: &str) -> String {
    sanitize_student_name(student)
}

async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.plans.list().await?))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(student): Path<String>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(state.plans.load(&plan_key(&student)).await?))
}

async fn save_plan(
    State(state): State<AppState>,
    Path(student): Path<String>,
    body: String,
) -> Result<Json<Plan>, AppError> {
    let plan = Plan::from_json(&body)?;
    let key = plan_key(&student);
    let _guard = state.plan_locks.acquire(&key).await;
    state.plans.save(&key, &plan).await?;
    Ok(Json(plan))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(student): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = plan_key(&student);
    let _guard = state.plan_locks.acquire(&key).await;
    if state.plans.delete(&key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn add_plan_course(
    State(state): State<AppState>,
    Path(student): Path<String>,
    Json(req): Json<AddCourseRequest>,
) -> Result<Json<PlanChange>, AppError> {
    let catalog = state.catalog.snapshot().await;
    if catalog.course(&req.course_id).is_none() {
        return Err(AppError::BadRequest(format!("Unknown course: {}", req.course_id)));
    }

    let key = plan_key(&student);
    let _guard = state.plan_locks.acquire(&key).await;
    let mut plan = state.plans.load(&key).await?;
    let changed = plan.add_course(&req.semester, &req.course_id);
    if changed {
        state.plans.save(&key, &plan).await?;
    }
    Ok(Json(PlanChange { changed, plan }))
}

async fn remove_plan_course(
    State(state): State<AppState>,
    Path((student, semester, course_id)): Path<(String, String, String)>,
) -> Result<Json<PlanChange>, AppError> {
    let key = plan_key(&student);
    let _guard = state.plan_locks.acquire(&key).await;
    let mut plan = state.plans.load(&key).await?;
    let changed = plan.remove_course(&semester, &course_id);
    if changed {
        state.plans.save(&key, &plan).await?;
    }
    Ok(Json(PlanChange { changed, plan }))
}

async fn plan_progress(
    State(state): State<AppState>,
    Path(student): Path<String>,
) -> Result<Json<PlanReport>, AppError> {
    let catalog = state.catalog.snapshot().await;
    let plan = state.plans.load(&plan_key(&student)).await?;
    let courses = catalog.courses();

    let credits_by_semester = plan
        .selections
        .keys()
        .map(|sem| (sem.clone(), services::calculate_total_credits(&plan, courses, Some(sem))))
        .collect();

    Ok(Json(PlanReport {
        progress: services::requirement_progress(&plan, courses, catalog.requirements()),
        total_credits: services::calculate_total_credits(&plan, courses, None),
        credits_by_semester,
    }))
}

async fn export_plan(
    State(state): State<AppState>,
    Path(student): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = plan_key(&student);
    let catalog = state.catalog.snapshot().await;
    let plan = state.plans.load(&key).await?;
    let csv = services::export_plan_csv(&plan, catalog.courses())?;
    let disposition = format!("attachment; filename=\"{}-plan.csv\"", key);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
