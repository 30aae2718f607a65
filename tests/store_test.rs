use std::collections::HashMap;
use std::sync::Arc;

use ape::client::{EntityApi, MemoryEntityApi, Page};
use ape::error::AppError;
use ape::models::{Course, PageRequest};
use ape::store::EntityStore;
use async_trait::async_trait;
use tokio::sync::Notify;

fn course(id: i64, title: &str) -> Course {
    Course {
        id: Some(id),
        title: title.to_string(),
        content: "Intro".to_string(),
        exercises: None,
    }
}

fn memory_store(records: Vec<Course>) -> (Arc<MemoryEntityApi<Course>>, EntityStore<Course>) {
    let api = Arc::new(MemoryEntityApi::with_records(records));
    let store = EntityStore::<Course>::new(api.clone());
    (api, store)
}

/// Holds every `fetch` until its id is released.
struct GatedApi {
    gates: HashMap<i64, Arc<Notify>>,
}

impl GatedApi {
    fn new(ids: &[i64]) -> Self {
        Self {
            gates: ids.iter().map(|id| (*id, Arc::new(Notify::new()))).collect(),
        }
    }

    fn release(&self, id: i64) {
        if let Some(gate) = self.gates.get(&id) {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl EntityApi<Course> for GatedApi {
    async fn fetch_all(&self, _page: &PageRequest) -> Result<Page<Course>, AppError> {
        Ok(Page::new(Vec::new(), None))
    }

    async fn fetch(&self, id: i64) -> Result<Course, AppError> {
        let gate = self.gates.get(&id).cloned().ok_or(AppError::NotFound)?;
        gate.notified().await;
        Ok(course(id, &format!("Course {}", id)))
    }

    async fn create(&self, entity: &Course) -> Result<Course, AppError> {
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Course) -> Result<Course, AppError> {
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> Result<i64, AppError> {
        Ok(id)
    }
}

#[tokio::test]
async fn fetch_fills_entity_and_clears_loading() {
    let (api, store) = memory_store(vec![course(3, "Algebra")]);

    store.fetch(3).await.expect("fetch succeeds");

    let state = store.snapshot();
    assert_eq!(state.entity.title, "Algebra");
    assert!(!state.loading);
    assert!(!state.update_success);
    assert_eq!(state.error_message, None);
    assert_eq!(api.calls().fetched_ids, vec![3]);
}

#[tokio::test]
async fn fetch_all_sets_entities_and_total() {
    let (_, store) = memory_store(vec![course(1, "A"), course(2, "B"), course(3, "C")]);

    store
        .fetch_all(&PageRequest::new(0, 2))
        .await
        .expect("fetch_all succeeds");

    let state = store.snapshot();
    assert_eq!(state.entities.len(), 2);
    assert_eq!(state.total_items, 3);
    assert!(!state.loading);
}

#[tokio::test]
async fn create_raises_update_success_and_next_read_clears_it() {
    let (_, store) = memory_store(Vec::new());
    let mut rx = store.subscribe();

    let saved = store
        .create(&Course {
            title: "Algebra".into(),
            content: "Intro".into(),
            ..Course::default()
        })
        .await
        .expect("create succeeds");

    assert_eq!(saved.id, Some(1));
    assert!(rx.has_changed().expect("store alive"));
    let state = rx.borrow_and_update().clone();
    assert!(state.update_success);
    assert!(!state.updating);
    assert_eq!(state.entity, saved);

    store.fetch(1).await.expect("fetch succeeds");
    assert!(!store.snapshot().update_success);
}

#[tokio::test]
async fn rejection_records_message_and_keeps_entity() {
    let (api, store) = memory_store(vec![course(3, "Algebra")]);
    store.fetch(3).await.expect("fetch succeeds");

    api.fail_next(500, "database unavailable");
    let err = store
        .update(&course(3, "Renamed"))
        .await
        .expect_err("update fails");

    assert!(matches!(err, AppError::Api { status: 500, .. }));
    let state = store.snapshot();
    assert!(!state.updating);
    assert!(!state.loading);
    assert!(!state.update_success);
    assert_eq!(state.entity.title, "Algebra");
    assert!(
        state
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("database unavailable"))
    );
}

#[tokio::test]
async fn delete_resets_entity() {
    let (api, store) = memory_store(vec![course(5, "Music")]);
    store.fetch(5).await.expect("fetch succeeds");

    let deleted = store.delete(5).await.expect("delete succeeds");

    assert_eq!(deleted, 5);
    let state = store.snapshot();
    assert!(state.update_success);
    assert_eq!(state.entity, Course::default());
    assert!(api.records().is_empty());
}

#[tokio::test]
async fn reset_restores_initial_state() {
    let (_, store) = memory_store(vec![course(1, "A")]);
    store.fetch(1).await.expect("fetch succeeds");
    store
        .fetch_all(&PageRequest::default())
        .await
        .expect("fetch_all succeeds");

    store.reset();

    assert_eq!(store.snapshot(), Default::default());
}

#[tokio::test]
async fn superseded_fetch_response_is_discarded() {
    let api = Arc::new(GatedApi::new(&[1, 2]));
    let store = EntityStore::<Course>::new(api.clone());

    let release = async {
        // The newer fetch answers first; the older one arrives late.
        api.release(2);
        tokio::task::yield_now().await;
        api.release(1);
    };
    let (first, second, _) = tokio::join!(store.fetch(1), store.fetch(2), release);

    assert!(first.is_ok());
    assert!(second.is_ok());
    let state = store.snapshot();
    assert_eq!(state.entity.id, Some(2));
    assert!(!state.loading);
}
