mod correction;
mod course;
mod exercise;

use axum::Json;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(course::list_courses).post(course::create_course))
        .route(
            "/api/courses/{id}",
            get(course::get_course)
                .put(course::update_course)
                .patch(course::partial_update_course)
                .delete(course::delete_course),
        )
        .route("/api/exercises", get(exercise::list_exercises).post(exercise::create_exercise))
        .route(
            "/api/exercises/{id}",
            get(exercise::get_exercise)
                .put(exercise::update_exercise)
                .patch(exercise::partial_update_exercise)
                .delete(exercise::delete_exercise),
        )
        .route(
            "/api/corrections",
            get(correction::list_corrections).post(correction::create_correction),
        )
        .route(
            "/api/corrections/{id}",
            get(correction::get_correction)
                .put(correction::update_correction)
                .patch(correction::partial_update_correction)
                .delete(correction::delete_correction),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// Path id and body id must agree, and the body must carry one.
fn check_ids(path_id: i64, body_id: Option<i64>) -> Result<(), AppError> {
    match body_id {
        None => Err(AppError::BadRequest("Invalid id".to_string())),
        Some(id) if id != path_id => Err(AppError::BadRequest("Invalid ID".to_string())),
        Some(_) => Ok(()),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn entity_not_found() -> AppError {
    AppError::BadRequest("Entity not found".to_string())
}

fn page_response<T: Serialize>(items: Vec<T>, total: i64) -> Response {
    let mut response = Json(items).into_response();
    if let Ok(value) = HeaderValue::from_str(&total.to_string()) {
        response.headers_mut().insert(TOTAL_COUNT_HEADER, value);
    }
    response
}

fn created_response<T: Serialize>(resource: &str, id: Option<i64>, body: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    if let Some(id) = id {
        if let Ok(value) = HeaderValue::from_str(&format!("/api/{}/{}", resource, id)) {
            response.headers_mut().insert(header::LOCATION, value);
        }
    }
    response
}
