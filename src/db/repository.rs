use sqlx::SqlitePool;

use crate::models::{
    Correction, CorrectionRow, Course, CourseRow, Exercise, ExerciseRow, PageRequest,
};

const COURSE_SELECT: &str = "SELECT c.id, c.title, c.content FROM course c";
const COURSE_SORT: &[(&str, &str)] = &[("id", "c.id"), ("title", "c.title"), ("content", "c.content")];

const EXERCISE_SELECT: &str = r#"
    SELECT
        e.id, e.title, e.content, e.mark,
        c.id AS course_id, c.title AS course_title, c.content AS course_content,
        r.id AS correction_id, r.content AS correction_content
    FROM exercise e
    JOIN course c ON c.id = e.course_id
    LEFT JOIN correction r ON r.exercise_id = e.id
"#;
const EXERCISE_SORT: &[(&str, &str)] = &[
    ("id", "e.id"),
    ("title", "e.title"),
    ("content", "e.content"),
    ("mark", "e.mark"),
];

const CORRECTION_SELECT: &str = r#"
    SELECT
        r.id, r.content,
        e.id AS exercise_id, e.title AS exercise_title,
        e.content AS exercise_content, e.mark AS exercise_mark
    FROM correction r
    JOIN exercise e ON e.id = r.exercise_id
"#;
const CORRECTION_SORT: &[(&str, &str)] = &[("id", "r.id"), ("content", "r.content")];

// ---- courses ----

pub async fn fetch_courses(db: &SqlitePool, page: &PageRequest) -> Result<Vec<Course>, sqlx::Error> {
    let sql = format!(
        "{} {} LIMIT ?1 OFFSET ?2",
        COURSE_SELECT,
        page.order_clause(COURSE_SORT, "c.id")
    );

    let rows = sqlx::query_as::<_, CourseRow>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(Course::from).collect())
}

pub async fn count_courses(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course")
        .fetch_one(db)
        .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    let sql = format!("{} WHERE c.id = ?1", COURSE_SELECT);
    let row = sqlx::query_as::<_, CourseRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(Course::from))
}

pub async fn course_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM course WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_course(db: &SqlitePool, course: &Course) -> Result<Course, sqlx::Error> {
    let id = sqlx::query("INSERT INTO course (title, content) VALUES (?1, ?2)")
        .bind(&course.title)
        .bind(&course.content)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Course {
        id: Some(id),
        title: course.title.clone(),
        content: course.content.clone(),
        exercises: None,
    })
}

/// Overwrites the scalar columns of an existing course. `None` when the row is gone.
pub async fn update_course(db: &SqlitePool, id: i64, course: &Course) -> Result<Option<Course>, sqlx::Error> {
    let affected = sqlx::query("UPDATE course SET title = ?1, content = ?2 WHERE id = ?3")
        .bind(&course.title)
        .bind(&course.content)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_course_by_id(db, id).await
}

pub async fn delete_course(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM course WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

// ---- exercises ----

pub async fn fetch_exercises(db: &SqlitePool, page: &PageRequest) -> Result<Vec<Exercise>, sqlx::Error> {
    let sql = format!(
        "{} {} LIMIT ?1 OFFSET ?2",
        EXERCISE_SELECT,
        page.order_clause(EXERCISE_SORT, "e.id")
    );

    let rows = sqlx::query_as::<_, ExerciseRow>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(Exercise::from).collect())
}

pub async fn fetch_exercises_without_correction(db: &SqlitePool) -> Result<Vec<Exercise>, sqlx::Error> {
    let sql = format!("{} WHERE r.id IS NULL ORDER BY e.id ASC", EXERCISE_SELECT);
    let rows = sqlx::query_as::<_, ExerciseRow>(&sql).fetch_all(db).await?;

    Ok(rows.into_iter().map(Exercise::from).collect())
}

pub async fn count_exercises(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exercise")
        .fetch_one(db)
        .await
}

pub async fn find_exercise_by_id(db: &SqlitePool, id: i64) -> Result<Option<Exercise>, sqlx::Error> {
    let sql = format!("{} WHERE e.id = ?1", EXERCISE_SELECT);
    let row = sqlx::query_as::<_, ExerciseRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(Exercise::from))
}

pub async fn exercise_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM exercise WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_exercise(
    db: &SqlitePool,
    exercise: &Exercise,
    course_id: i64,
) -> Result<Option<Exercise>, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO exercise (title, content, mark, course_id) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&exercise.title)
    .bind(&exercise.content)
    .bind(exercise.mark)
    .bind(course_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_exercise_by_id(db, id).await
}

pub async fn update_exercise(
    db: &SqlitePool,
    id: i64,
    exercise: &Exercise,
    course_id: i64,
) -> Result<Option<Exercise>, sqlx::Error> {
    let affected = sqlx::query(
        "UPDATE exercise SET title = ?1, content = ?2, mark = ?3, course_id = ?4 WHERE id = ?5",
    )
    .bind(&exercise.title)
    .bind(&exercise.content)
    .bind(exercise.mark)
    .bind(course_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_exercise_by_id(db, id).await
}

pub async fn delete_exercise(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM exercise WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

// ---- corrections ----

pub async fn fetch_corrections(db: &SqlitePool, page: &PageRequest) -> Result<Vec<Correction>, sqlx::Error> {
    let sql = format!(
        "{} {} LIMIT ?1 OFFSET ?2",
        CORRECTION_SELECT,
        page.order_clause(CORRECTION_SORT, "r.id")
    );

    let rows = sqlx::query_as::<_, CorrectionRow>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(Correction::from).collect())
}

pub async fn count_corrections(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM correction")
        .fetch_one(db)
        .await
}

pub async fn find_correction_by_id(db: &SqlitePool, id: i64) -> Result<Option<Correction>, sqlx::Error> {
    let sql = format!("{} WHERE r.id = ?1", CORRECTION_SELECT);
    let row = sqlx::query_as::<_, CorrectionRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(Correction::from))
}

/// Id of the correction already attached to `exercise_id`, if any.
pub async fn find_correction_id_by_exercise(
    db: &SqlitePool,
    exercise_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM correction WHERE exercise_id = ?1")
        .bind(exercise_id)
        .fetch_optional(db)
        .await
}

pub async fn correction_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM correction WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_correction(
    db: &SqlitePool,
    correction: &Correction,
    exercise_id: i64,
) -> Result<Option<Correction>, sqlx::Error> {
    let id = sqlx::query("INSERT INTO correction (content, exercise_id) VALUES (?1, ?2)")
        .bind(&correction.content)
        .bind(exercise_id)
        .execute(db)
        .await?
        .last_insert_rowid();

    find_correction_by_id(db, id).await
}

pub async fn update_correction(
    db: &SqlitePool,
    id: i64,
    correction: &Correction,
    exercise_id: i64,
) -> Result<Option<Correction>, sqlx::Error> {
    let affected = sqlx::query("UPDATE correction SET content = ?1, exercise_id = ?2 WHERE id = ?3")
        .bind(&correction.content)
        .bind(exercise_id)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_correction_by_id(db, id).await
}

pub async fn delete_correction(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM correction WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
