use std::sync::Arc;

use ape::client::{ApiConfig, HttpEntityApi};
use ape::models::{Correction, Course, Entity, Exercise};
use ape::store::EntityStore;
use ape::views::{FormValues, MemoryHistory, ReferenceField, RouteParams, SubmitOutcome, UpdateForm};
use dotenvy::dotenv;
use reqwest::Client;

fn is_dry_run() -> bool {
    !std::env::args().any(|a| a == "--apply")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = ApiConfig::new_from_env()?;
    let client = Client::new();
    let history = Arc::new(MemoryHistory::new("/"));

    let courses = EntityStore::<Course>::new(Arc::new(HttpEntityApi::<Course>::with_client(
        client.clone(),
        config.clone(),
    )));
    let exercises = EntityStore::<Exercise>::new(Arc::new(HttpEntityApi::<Exercise>::with_client(
        client.clone(),
        config.clone(),
    )));
    let corrections = EntityStore::<Correction>::new(Arc::new(
        HttpEntityApi::<Correction>::with_client(client, config.clone()),
    ));

    let dry_run = is_dry_run();

    let course_values = FormValues::new()
        .with("title", "Algebra")
        .with("content", "Groups, rings and fields");
    let mut course_form = UpdateForm::new(courses.clone(), RouteParams::new(), history.clone());
    course_form.mount().await?;
    let course = save(&mut course_form, &course_values, dry_run).await?;

    let Some(course_id) = course.id else {
        println!("[DRY RUN] Would create an exercise and a correction for the new course");
        return Ok(());
    };

    let course_field = ReferenceField::for_field::<Exercise>("course", courses.clone())?;
    let mut exercise_form =
        UpdateForm::new(exercises.clone(), RouteParams::new(), history.clone()).with_reference(course_field);
    exercise_form.mount().await?;
    let exercise_values = FormValues::new()
        .with("title", "Subgroups")
        .with("content", "Show that the kernel of a homomorphism is a normal subgroup.")
        .with("mark", "10")
        .with("course", course_id.to_string());
    let exercise = save(&mut exercise_form, &exercise_values, dry_run).await?;

    let exercise_id = exercise.id.ok_or("exercise was saved without an id")?;
    let exercise_field = ReferenceField::for_field::<Correction>("exercise", exercises.clone())?;
    let mut correction_form =
        UpdateForm::new(corrections.clone(), RouteParams::new(), history.clone()).with_reference(exercise_field);
    correction_form.mount().await?;
    let correction_values = FormValues::new()
        .with("content", "Conjugating a kernel element gives another kernel element.")
        .with("exercise", exercise_id.to_string());
    save(&mut correction_form, &correction_values, dry_run).await?;

    println!(
        "Seeded course {} and exercise {} at {}",
        course_id, exercise_id, config.base_url
    );

    Ok(())
}

async fn save<E: Entity>(
    form: &mut UpdateForm<E>,
    values: &FormValues,
    dry_run: bool,
) -> Result<E, Box<dyn std::error::Error>> {
    if dry_run {
        let entity = form.save_entity(values)?;
        println!("[DRY RUN] Would create {} {}", E::NAME, serde_json::to_string(&entity)?);
        return Ok(entity);
    }

    match form.submit(values).await? {
        SubmitOutcome::Saved(saved) => {
            println!("Created {} {:?}", E::NAME, saved.id());
            Ok(saved)
        }
        SubmitOutcome::Invalid(errors) => Err(format!("{} rejected: {:?}", E::NAME, errors).into()),
        SubmitOutcome::NotReady | SubmitOutcome::Busy => {
            Err(format!("{} form was not ready", E::NAME).into())
        }
    }
}
