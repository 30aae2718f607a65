use ape::api::router;
use ape::db;
use ape::state::AppState;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    router(AppState { db: pool })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, headers, value)
}

async fn create_course(app: &Router, title: &str) -> i64 {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/courses",
        Some(json!({ "title": title, "content": "Syllabus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("course id")
}

async fn create_exercise(app: &Router, course_id: i64, title: &str) -> i64 {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/exercises",
        Some(json!({ "title": title, "content": "Solve", "mark": 10, "course": { "id": course_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("exercise id")
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, _, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_assigns_id_and_location() {
    let app = test_app().await;

    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "title": "Analysis", "content": "Limits and series" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("id assigned");
    assert_eq!(
        headers.get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("/api/courses/{}", id).as_str())
    );

    let (status, _, body) = send(&app, Method::GET, &format!("/api/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Analysis");
}

#[tokio::test]
async fn create_with_id_is_rejected() {
    let app = test_app().await;
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "id": 7, "title": "Analysis", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A new course cannot already have an ID");
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let app = test_app().await;
    let (status, _, _) = send(&app, Method::GET, "/api/exercises/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_checks_ids() {
    let app = test_app().await;
    let id = create_course(&app, "Algebra").await;
    let uri = format!("/api/courses/{}", id);

    let (status, _, body) = send(&app, Method::PUT, &uri, Some(json!({ "title": "A", "content": "B" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid id");

    let (status, _, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "id": id + 1, "title": "A", "content": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid ID");

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/api/courses/500",
        Some(json!({ "id": 500, "title": "A", "content": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Entity not found");

    let (status, _, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "id": id, "title": "Linear algebra", "content": "Matrices" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Linear algebra");
}

#[tokio::test]
async fn patch_keeps_absent_fields() {
    let app = test_app().await;
    let course_id = create_course(&app, "Physics").await;
    let exercise_id = create_exercise(&app, course_id, "Pendulum").await;

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/exercises/{}", exercise_id),
        Some(json!({ "id": exercise_id, "mark": 15 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mark"], 15);
    assert_eq!(body["title"], "Pendulum");
    assert_eq!(body["course"]["id"], course_id);
}

#[tokio::test]
async fn exercise_validation() {
    let app = test_app().await;
    let course_id = create_course(&app, "Chemistry").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/exercises",
        Some(json!({ "title": "Titration", "content": "x", "mark": -1, "course": { "id": course_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "mark must be at least 0");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/exercises",
        Some(json!({ "title": "Titration", "content": "x", "mark": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "course is required");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/exercises",
        Some(json!({ "title": "Titration", "content": "x", "mark": 3, "course": { "id": 404 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_reports_total_and_pages() {
    let app = test_app().await;
    for title in ["C", "A", "B"] {
        create_course(&app, title).await;
    }

    let (status, headers, body) =
        send(&app, Method::GET, "/api/courses?page=0&size=2&sort=title,asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("x-total-count").and_then(|v| v.to_str().ok()),
        Some("3")
    );
    let titles: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|c| c["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);

    let (_, _, body) = send(&app, Method::GET, "/api/courses?page=1&size=2&sort=title,asc", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn exercises_without_correction_filter() {
    let app = test_app().await;
    let course_id = create_course(&app, "Biology").await;
    let corrected = create_exercise(&app, course_id, "Cells").await;
    let open = create_exercise(&app, course_id, "Genes").await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/corrections",
        Some(json!({ "content": "Mitochondria", "exercise": { "id": corrected } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) =
        send(&app, Method::GET, "/api/exercises?filter=correction-is-null", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|e| e["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![open]);
}

#[tokio::test]
async fn second_correction_for_exercise_conflicts() {
    let app = test_app().await;
    let course_id = create_course(&app, "History").await;
    let exercise_id = create_exercise(&app, course_id, "Revolutions").await;
    let body = json!({ "content": "1789", "exercise": { "id": exercise_id } });

    let (status, _, created) = send(&app, Method::POST, "/api/corrections", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["exercise"]["id"], exercise_id);

    let (status, _, _) = send(&app, Method::POST, "/api/corrections", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_returns_no_content_and_guards_references() {
    let app = test_app().await;
    let course_id = create_course(&app, "Music").await;
    let exercise_id = create_exercise(&app, course_id, "Scales").await;

    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT, "course still has exercises");

    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/exercises/{}", exercise_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, Method::GET, &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
