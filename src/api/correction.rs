use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use sqlx::SqlitePool;
use tracing::debug;

use super::{check_ids, created_response, entity_not_found, page_response, require_text};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Correction, CorrectionPatch, PageRequest};
use crate::state::AppState;

/// Validates the content and the exercise link, returning the exercise id.
/// An exercise carries at most one correction.
async fn validate(
    db: &SqlitePool,
    correction: &Correction,
    own_id: Option<i64>,
) -> Result<i64, AppError> {
    require_text("content", &correction.content)?;

    let exercise_id = correction
        .exercise
        .as_ref()
        .and_then(|e| e.id)
        .ok_or_else(|| AppError::BadRequest("exercise is required".to_string()))?;
    if !repository::exercise_exists(db, exercise_id).await? {
        return Err(AppError::BadRequest(format!("exercise {} does not exist", exercise_id)));
    }

    match repository::find_correction_id_by_exercise(db, exercise_id).await? {
        Some(existing) if Some(existing) != own_id => Err(AppError::Conflict(format!(
            "exercise {} already has correction {}",
            exercise_id, existing
        ))),
        _ => Ok(exercise_id),
    }
}

pub(super) async fn list_corrections(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Response, AppError> {
    debug!("REST request to get a page of Corrections: {:?}", page);
    let corrections = repository::fetch_corrections(&state.db, &page).await?;
    let total = repository::count_corrections(&state.db).await?;
    Ok(page_response(corrections, total))
}

pub(super) async fn get_correction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Correction>, AppError> {
    debug!("REST request to get Correction : {}", id);
    let correction = repository::find_correction_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(correction))
}

pub(super) async fn create_correction(
    State(state): State<AppState>,
    Json(correction): Json<Correction>,
) -> Result<Response, AppError> {
    debug!("REST request to save Correction : {:?}", correction);
    if correction.id.is_some() {
        return Err(AppError::BadRequest("A new correction cannot already have an ID".to_string()));
    }
    let exercise_id = validate(&state.db, &correction, None).await?;

    let saved = repository::insert_correction(&state.db, &correction, exercise_id)
        .await?
        .ok_or(AppError::InternalServerError)?;
    Ok(created_response("corrections", saved.id, saved))
}

pub(super) async fn update_correction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(correction): Json<Correction>,
) -> Result<Json<Correction>, AppError> {
    debug!("REST request to update Correction : {}, {:?}", id, correction);
    check_ids(id, correction.id)?;
    if !repository::correction_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }
    let exercise_id = validate(&state.db, &correction, Some(id)).await?;

    let saved = repository::update_correction(&state.db, id, &correction, exercise_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn partial_update_correction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CorrectionPatch>,
) -> Result<Json<Correction>, AppError> {
    debug!("REST request to partial update Correction : {}, {:?}", id, patch);
    check_ids(id, patch.id)?;
    if !repository::correction_exists(&state.db, id).await? {
        return Err(entity_not_found());
    }

    let mut current = repository::find_correction_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(content) = patch.content {
        current.content = content;
    }
    let exercise_id = validate(&state.db, &current, Some(id)).await?;

    let saved = repository::update_correction(&state.db, id, &current, exercise_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(saved))
}

pub(super) async fn delete_correction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("REST request to delete Correction : {}", id);
    repository::delete_correction(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
