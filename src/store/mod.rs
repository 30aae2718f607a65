//! Per-entity state container.
//!
//! Every view reads one [`EntityStore`] and dispatches its operations. The
//! flags follow the request lifecycle: `loading` while a read is in flight,
//! `updating` while a mutation is, and `update_success` once a mutation
//! settled successfully. State changes are broadcast on a watch channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::EntityApi;
use crate::error::AppError;
use crate::models::{Entity, PageRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<E> {
    pub entity: E,
    pub entities: Vec<E>,
    pub loading: bool,
    pub updating: bool,
    pub update_success: bool,
    pub total_items: u64,
    pub error_message: Option<String>,
}

impl<E: Default> Default for EntityState<E> {
    fn default() -> Self {
        Self {
            entity: E::default(),
            entities: Vec::new(),
            loading: false,
            updating: false,
            update_success: false,
            total_items: 0,
            error_message: None,
        }
    }
}

#[derive(Clone, Copy)]
enum Mutation {
    Create,
    Update,
}

pub struct EntityStore<E: Entity> {
    api: Arc<dyn EntityApi<E>>,
    state: Arc<watch::Sender<EntityState<E>>>,
    entity_seq: Arc<AtomicU64>,
    list_seq: Arc<AtomicU64>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            entity_seq: self.entity_seq.clone(),
            list_seq: self.list_seq.clone(),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new(api: Arc<dyn EntityApi<E>>) -> Self {
        let (state, _) = watch::channel(EntityState::default());
        Self {
            api,
            state: Arc::new(state),
            entity_seq: Arc::new(AtomicU64::new(0)),
            list_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> EntityState<E> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EntityState<E>> {
        self.state.subscribe()
    }

    pub fn reset(&self) {
        debug!("{} store reset", E::NAME);
        // Any fetch still in flight belongs to the state being discarded.
        self.entity_seq.fetch_add(1, Ordering::SeqCst);
        self.list_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(EntityState::default());
    }

    pub async fn fetch_all(&self, page: &PageRequest) -> Result<(), AppError> {
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin_read();

        let result = self.api.fetch_all(page).await;
        if self.list_seq.load(Ordering::SeqCst) != seq {
            warn!("{} collection response discarded: superseded by a newer fetch", E::NAME);
            return result.map(|_| ());
        }

        match result {
            Ok(page) => {
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.total_items = page.total;
                    s.entities = page.items;
                });
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    pub async fn fetch(&self, id: i64) -> Result<(), AppError> {
        let seq = self.entity_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin_read();

        let result = self.api.fetch(id).await;
        if self.entity_seq.load(Ordering::SeqCst) != seq {
            warn!("{} {} response discarded: superseded by a newer fetch", E::NAME, id);
            return result.map(|_| ());
        }

        match result {
            Ok(entity) => {
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.entity = entity;
                });
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    pub async fn create(&self, entity: &E) -> Result<E, AppError> {
        self.mutate(Mutation::Create, entity).await
    }

    pub async fn update(&self, entity: &E) -> Result<E, AppError> {
        self.mutate(Mutation::Update, entity).await
    }

    pub async fn delete(&self, id: i64) -> Result<i64, AppError> {
        self.begin_write();
        debug!("{} delete {}", E::NAME, id);

        match self.api.delete(id).await {
            Ok(deleted) => {
                self.entity_seq.fetch_add(1, Ordering::SeqCst);
                self.state.send_modify(|s| {
                    s.updating = false;
                    s.loading = false;
                    s.update_success = true;
                    s.entity = E::default();
                });
                Ok(deleted)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    async fn mutate(&self, kind: Mutation, entity: &E) -> Result<E, AppError> {
        self.begin_write();

        let result = match kind {
            Mutation::Create => {
                debug!("{} create", E::NAME);
                self.api.create(entity).await
            }
            Mutation::Update => {
                debug!("{} update {:?}", E::NAME, entity.id());
                self.api.update(entity).await
            }
        };

        match result {
            Ok(saved) => {
                // The saved record supersedes whatever read is still in flight.
                self.entity_seq.fetch_add(1, Ordering::SeqCst);
                self.state.send_modify(|s| {
                    s.updating = false;
                    s.loading = false;
                    s.update_success = true;
                    s.entity = saved.clone();
                });
                Ok(saved)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn begin_read(&self) {
        self.state.send_modify(|s| {
            s.error_message = None;
            s.update_success = false;
            s.loading = true;
        });
    }

    fn begin_write(&self) {
        self.state.send_modify(|s| {
            s.error_message = None;
            s.update_success = false;
            s.updating = true;
        });
    }

    fn reject(&self, err: AppError) -> AppError {
        warn!("{} request failed: {}", E::NAME, err);
        self.state.send_modify(|s| {
            s.loading = false;
            s.updating = false;
            s.update_success = false;
            s.error_message = Some(err.to_string());
        });
        err
    }
}
