use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;
use crate::models::Entity;
use crate::store::EntityStore;
use crate::views::route::RouteParams;
use crate::views::{Navigator, Phase, SuccessLatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(i64),
    /// The routed record has not been loaded.
    NotReady,
    Busy,
}

/// Confirmation dialog that deletes the routed record.
pub struct DeleteDialog<E: Entity> {
    store: EntityStore<E>,
    navigator: Arc<dyn Navigator>,
    route: RouteParams,
    phase: Phase,
    latch: SuccessLatch,
}

impl<E: Entity> DeleteDialog<E> {
    pub fn new(store: EntityStore<E>, route: RouteParams, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            route,
            phase: Phase::Idle,
            latch: SuccessLatch::new(),
        }
    }

    /// Fetches the routed record and arms the dialog, whether or not the
    /// fetch succeeds.
    pub async fn mount(&mut self) -> Result<(), AppError> {
        let Some(id) = self.route.id else {
            return Err(AppError::BadRequest(format!("no {} id in route", E::NAME)));
        };

        debug!("{} delete dialog mount {}", E::NAME, id);
        self.phase = Phase::Fetching;
        let result = self.store.fetch(id).await;
        self.latch.arm(self.store.snapshot().update_success);

        match result {
            Ok(()) => {
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Idle;
                Err(err)
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.latch.is_armed()
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::SuccessNavigated
    }

    pub fn question(&self) -> String {
        match self.loaded_id() {
            Some(id) => format!("Are you sure you want to delete {} {}?", E::NAME, id),
            None => format!("Are you sure you want to delete this {}?", E::NAME),
        }
    }

    pub fn cancel(&self) {
        self.navigator.push(&self.route.list_location::<E>());
    }

    pub async fn confirm(&mut self) -> Result<DeleteOutcome, AppError> {
        let Some(id) = self.loaded_id() else {
            return Ok(DeleteOutcome::NotReady);
        };
        if self.phase != Phase::Ready {
            return Ok(DeleteOutcome::NotReady);
        }
        if self.store.snapshot().updating {
            return Ok(DeleteOutcome::Busy);
        }

        self.phase = Phase::Submitting;
        // Dispatch clears update_success before it awaits anything.
        if self.latch.is_armed() {
            self.latch.arm(false);
        }

        match self.store.delete(id).await {
            Ok(deleted) => {
                self.refresh();
                Ok(DeleteOutcome::Deleted(deleted))
            }
            Err(err) => {
                self.phase = Phase::Ready;
                Err(err)
            }
        }
    }

    /// Navigates back and disarms when the delete has just succeeded.
    pub fn refresh(&mut self) -> bool {
        if self.latch.observe(self.store.snapshot().update_success) {
            self.phase = Phase::SuccessNavigated;
            self.latch.disarm();
            self.navigator.push(&self.route.list_location::<E>());
            return true;
        }
        false
    }

    fn loaded_id(&self) -> Option<i64> {
        let loaded = self.store.snapshot().entity.id()?;
        (Some(loaded) == self.route.id).then_some(loaded)
    }
}
