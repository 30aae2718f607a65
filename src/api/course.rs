use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use tracing::debug;

use super::{check_ids, created_response, entity_not_found, page_response, require_text};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, CoursePatch, PageRequest};
use crate::state::AppState;

fn validate(course: &Course) -> Result<(), AppError> {
    require_text("title", &course.title)?;
    require_text("content", &course.content)
}

pub(super) async fn list_courses(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Response, AppError> {
    debug!("REST request to get a page of Courses: {:?}", page);
    let courses = repository::fetch_courses(&state.db, &page).await?;
    let total = repository::count_courses(&state.db).await?;
    Ok(page_response(courses, total))
}

pub(super) async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    debug!("REST request to get Course : {}", id);
    let course = repository::find_course_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

pub(super) async fn create_course(
    State(state): State<AppState>,
    Json(course): Json<Course>,
) -> Result<Response, AppError> {
    debug!("REST request to save Course : {:?}", course);
    if course.id.is_some() {
        return Err(AppError::BadRequest("A new course cannot already have an ID".to_string()));
    }
    validate(&course)?;

    let saved = repository::insert_course(&state.db, &course).await?;
    Ok(created_response("courses", saved.id, saved))
}

pub(super) async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(course): Json<Course>,
) -> Result<Json<Course>, AppError> {
    debug!("REST request to update Course : {}, {:?}", id, course);
    check_ids(id, course.id)?;
    if !repository::course_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }
    validate(&course)?;

    let saved = repository::update_course(&state.db, id, &course)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn partial_update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Course>, AppError> {
    debug!("REST request to partial update Course : {}, {:?}", id, patch);
    check_ids(id, patch.id)?;
    if !repository::course_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }

    let mut current = repository::find_course_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(title) = patch.title {
        current.title = title;
    }
    if let Some(content) = patch.content {
        current.content = content;
    }
    validate(&current)?;

    let saved = repository::update_course(&state.db, id, &current)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("REST request to delete Course : {}", id);
    repository::delete_course(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
