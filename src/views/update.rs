use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::Entity;
use crate::store::EntityStore;
use crate::views::form::{self, FormValues, ValidationErrors};
use crate::views::reference::{ReferenceSource, SelectOption};
use crate::views::route::RouteParams;
use crate::views::{Navigator, Phase, SuccessLatch};

/// Fixed when the form is built: no routed id means create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    Saved(E),
    Invalid(ValidationErrors),
    /// Own record or a reference collection has not loaded yet.
    NotReady,
    /// A mutation on this entity is still in flight.
    Busy,
}

/// Edit-or-create form for one entity type.
pub struct UpdateForm<E: Entity> {
    store: EntityStore<E>,
    references: Vec<Box<dyn ReferenceSource>>,
    navigator: Arc<dyn Navigator>,
    route: RouteParams,
    mode: FormMode,
    phase: Phase,
    latch: SuccessLatch,
}

impl<E: Entity> UpdateForm<E> {
    pub fn new(store: EntityStore<E>, route: RouteParams, navigator: Arc<dyn Navigator>) -> Self {
        let mode = match route.id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };

        Self {
            store,
            references: Vec::new(),
            navigator,
            route,
            mode,
            phase: Phase::Idle,
            latch: SuccessLatch::new(),
        }
    }

    pub fn with_reference(mut self, source: impl ReferenceSource + 'static) -> Self {
        self.references.push(Box::new(source));
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_new(&self) -> bool {
        self.mode == FormMode::Create
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    /// Clears (create) or fetches (edit) the own record while the reference
    /// collections load alongside.
    pub async fn mount(&mut self) -> Result<(), AppError> {
        debug!("{} form mount {:?}", E::NAME, self.mode);
        self.phase = Phase::Fetching;

        let mode = self.mode;
        let store = &self.store;
        let references = &self.references;

        let own = async move {
            match mode {
                FormMode::Create => {
                    store.reset();
                    Ok(())
                }
                FormMode::Edit(id) => store.fetch(id).await,
            }
        };
        let siblings = async move {
            let mut first_error = None;
            for source in references {
                if let Err(err) = source.load().await {
                    warn!("{} options for {} failed to load: {}", source.spec().target, E::NAME, err);
                    first_error.get_or_insert(err);
                }
            }
            first_error.map_or(Ok(()), Err)
        };
        let (own, siblings) = tokio::join!(own, siblings);

        match own.and(siblings) {
            Ok(()) => {
                self.phase = Phase::Ready;
                self.latch.arm(self.store.snapshot().update_success);
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Idle;
                Err(err)
            }
        }
    }

    /// All data the form depends on has arrived.
    pub fn is_ready(&self) -> bool {
        if !matches!(self.phase, Phase::Ready | Phase::Submitting) {
            return false;
        }
        if !self.references.iter().all(|r| r.is_loaded()) {
            return false;
        }
        match self.mode {
            FormMode::Create => true,
            FormMode::Edit(id) => self.store.snapshot().entity.id() == Some(id),
        }
    }

    /// Whether the save control is enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Ready && self.is_ready() && !self.store.snapshot().updating
    }

    pub fn default_values(&self) -> Result<FormValues, AppError> {
        match self.mode {
            FormMode::Create => Ok(FormValues::new()),
            FormMode::Edit(_) => form::default_values(&self.store.snapshot().entity),
        }
    }

    pub fn options(&self, field: &str) -> Vec<SelectOption> {
        self.references
            .iter()
            .find(|r| r.spec().name == field)
            .map(|r| r.options())
            .unwrap_or_default()
    }

    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        form::validate::<E>(values)
    }

    /// The record that a submit of `values` would dispatch.
    pub fn save_entity(&self, values: &FormValues) -> Result<E, AppError> {
        form::merge_values(&self.store.snapshot().entity, values, &self.references)
    }

    pub async fn submit(&mut self, values: &FormValues) -> Result<SubmitOutcome<E>, AppError> {
        if self.phase != Phase::Ready || !self.is_ready() {
            return Ok(SubmitOutcome::NotReady);
        }
        if self.store.snapshot().updating {
            return Ok(SubmitOutcome::Busy);
        }
        if let Err(errors) = self.validate(values) {
            debug!("{} form rejected: {:?}", E::NAME, errors);
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let entity = self.save_entity(values)?;
        self.phase = Phase::Submitting;
        // Dispatch clears update_success before it awaits anything.
        self.latch.arm(false);

        let result = match self.mode {
            FormMode::Create => self.store.create(&entity).await,
            FormMode::Edit(_) => self.store.update(&entity).await,
        };

        match result {
            Ok(saved) => {
                self.refresh();
                Ok(SubmitOutcome::Saved(saved))
            }
            Err(err) => {
                self.phase = Phase::Ready;
                Err(err)
            }
        }
    }

    /// Re-reads the store; navigates back to the list when a save has just
    /// succeeded. Returns true if it navigated.
    pub fn refresh(&mut self) -> bool {
        if self.phase == Phase::SuccessNavigated {
            return false;
        }
        if self.latch.observe(self.store.snapshot().update_success) {
            self.phase = Phase::SuccessNavigated;
            self.navigator.push(&self.route.list_location::<E>());
            return true;
        }
        false
    }

    /// The back control.
    pub fn cancel(&self) {
        self.navigator.push(&self.route.list_location::<E>());
    }
}
