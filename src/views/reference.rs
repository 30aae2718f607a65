use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::models::page::MAX_PAGE_SIZE;
use crate::models::{Entity, PageRequest, ReferenceSpec};
use crate::store::EntityStore;
use crate::views::form::{display, to_object};

/// One entry of a reference selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// The sibling collection behind one reference field of a form.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    fn spec(&self) -> &ReferenceSpec;

    async fn load(&self) -> Result<(), AppError>;

    /// True once a collection fetch has completed successfully.
    fn is_loaded(&self) -> bool;

    /// The full record whose id prints as `raw`, by linear lookup.
    fn resolve(&self, raw: &str) -> Option<Value>;

    fn options(&self) -> Vec<SelectOption>;
}

pub struct ReferenceField<T: Entity> {
    spec: ReferenceSpec,
    store: EntityStore<T>,
    page: PageRequest,
    loaded: AtomicBool,
}

impl<T: Entity> ReferenceField<T> {
    /// Binds field `name` of `E` to the store of the entity it points at.
    pub fn for_field<E: Entity>(name: &str, store: EntityStore<T>) -> Result<Self, AppError> {
        let spec = E::references()
            .iter()
            .find(|r| r.name == name)
            .copied()
            .ok_or_else(|| AppError::Config(format!("{} has no reference field {}", E::NAME, name)))?;

        if spec.target != T::NAME {
            return Err(AppError::Config(format!(
                "{}.{} points at {}, not {}",
                E::NAME,
                name,
                spec.target,
                T::NAME
            )));
        }

        Ok(Self {
            spec,
            store,
            page: PageRequest::new(0, MAX_PAGE_SIZE),
            loaded: AtomicBool::new(false),
        })
    }

    pub fn store(&self) -> &EntityStore<T> {
        &self.store
    }

    fn find(&self, raw: &str) -> Option<T> {
        let raw = raw.trim();
        self.store
            .snapshot()
            .entities
            .into_iter()
            .find(|candidate| candidate.id().map(|id| id.to_string()).as_deref() == Some(raw))
    }
}

#[async_trait]
impl<T: Entity> ReferenceSource for ReferenceField<T> {
    fn spec(&self) -> &ReferenceSpec {
        &self.spec
    }

    async fn load(&self) -> Result<(), AppError> {
        self.loaded.store(false, Ordering::SeqCst);
        self.store.fetch_all(&self.page).await?;
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn resolve(&self, raw: &str) -> Option<Value> {
        self.find(raw).and_then(|record| serde_json::to_value(record).ok())
    }

    fn options(&self) -> Vec<SelectOption> {
        self.store
            .snapshot()
            .entities
            .iter()
            .filter_map(|record| {
                let id = record.id()?;
                let label = to_object(record)
                    .map(|object| display(object.get(self.spec.display_field)))
                    .unwrap_or_default();
                Some(SelectOption {
                    value: id.to_string(),
                    label,
                })
            })
            .collect()
    }
}
