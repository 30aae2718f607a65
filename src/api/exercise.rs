use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use super::{check_ids, created_response, entity_not_found, page_response, require_text};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Exercise, ExercisePatch, PageRequest};
use crate::state::AppState;

const CORRECTION_IS_NULL: &str = "correction-is-null";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ExerciseQuery {
    page: Option<u32>,
    size: Option<u32>,
    sort: Option<String>,
    filter: Option<String>,
}

impl ExerciseQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            size: self.size.unwrap_or(defaults.size),
            sort: self.sort.clone(),
        }
    }
}

/// Validates scalar fields and returns the id of an existing course.
async fn validate(db: &SqlitePool, exercise: &Exercise) -> Result<i64, AppError> {
    require_text("title", &exercise.title)?;
    require_text("content", &exercise.content)?;
    if exercise.mark < 0 {
        return Err(AppError::BadRequest("mark must be at least 0".to_string()));
    }

    let course_id = exercise
        .course
        .as_ref()
        .and_then(|c| c.id)
        .ok_or_else(|| AppError::BadRequest("course is required".to_string()))?;
    if !repository::course_exists(db, course_id).await? {
        return Err(AppError::BadRequest(format!("course {} does not exist", course_id)));
    }
    Ok(course_id)
}

pub(super) async fn list_exercises(
    State(state): State<AppState>,
    Query(query): Query<ExerciseQuery>,
) -> Result<Response, AppError> {
    if query.filter.as_deref() == Some(CORRECTION_IS_NULL) {
        debug!("REST request to get all Exercises where correction is null");
        let exercises = repository::fetch_exercises_without_correction(&state.db).await?;
        let total = exercises.len() as i64;
        return Ok(page_response(exercises, total));
    }

    let page = query.page_request();
    debug!("REST request to get a page of Exercises: {:?}", page);
    let exercises = repository::fetch_exercises(&state.db, &page).await?;
    let total = repository::count_exercises(&state.db).await?;
    Ok(page_response(exercises, total))
}

pub(super) async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Exercise>, AppError> {
    debug!("REST request to get Exercise : {}", id);
    let exercise = repository::find_exercise_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(exercise))
}

pub(super) async fn create_exercise(
    State(state): State<AppState>,
    Json(exercise): Json<Exercise>,
) -> Result<Response, AppError> {
    debug!("REST request to save Exercise : {:?}", exercise);
    if exercise.id.is_some() {
        return Err(AppError::BadRequest("A new exercise cannot already have an ID".to_string()));
    }
    let course_id = validate(&state.db, &exercise).await?;

    let saved = repository::insert_exercise(&state.db, &exercise, course_id)
        .await?
        .ok_or(AppError::InternalServerError)?;
    Ok(created_response("exercises", saved.id, saved))
}

pub(super) async fn update_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(exercise): Json<Exercise>,
) -> Result<Json<Exercise>, AppError> {
    debug!("REST request to update Exercise : {}, {:?}", id, exercise);
    check_ids(id, exercise.id)?;
    if !repository::exercise_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }
    let course_id = validate(&state.db, &exercise).await?;

    let saved = repository::update_exercise(&state.db, id, &exercise, course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn partial_update_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ExercisePatch>,
) -> Result<Json<Exercise>, AppError> {
    debug!("REST request to partial update Exercise : {}, {:?}", id, patch);
    check_ids(id, patch.id)?;
    if !repository::exercise_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }

    let mut current = repository::find_exercise_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(title) = patch.title {
        current.title = title;
    }
    if let Some(content) = patch.content {
        current.content = content;
    }
    if let Some(mark) = patch.mark {
        current.mark = mark;
    }
    let course_id = validate(&state.db, &current).await?;

    let saved = repository::update_exercise(&state.db, id, &current, course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn delete_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("REST request to delete Exercise : {}", id);
    repository::delete_exercise(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
