use tracing::debug;

use crate::error::AppError;
use crate::models::Entity;
use crate::store::EntityStore;
use crate::views::form::{display, to_object};
use crate::views::route::RouteParams;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// Read-only view of one record.
pub struct DetailView<E: Entity> {
    store: EntityStore<E>,
    route: RouteParams,
}

impl<E: Entity> DetailView<E> {
    pub fn new(store: EntityStore<E>, route: RouteParams) -> Self {
        Self { store, route }
    }

    /// Issues the single fetch for the routed id.
    pub async fn mount(&self) -> Result<(), AppError> {
        match self.route.id {
            Some(id) => {
                debug!("{} detail mount {}", E::NAME, id);
                self.store.fetch(id).await
            }
            None => Ok(()),
        }
    }

    /// The routed record, once it has been fetched.
    pub fn entity(&self) -> Option<E> {
        let entity = self.store.snapshot().entity;
        match (self.route.id, entity.id()) {
            (Some(wanted), Some(id)) if wanted == id => Some(entity),
            _ => None,
        }
    }

    /// Id, scalar fields and references (by their display field). Values are
    /// blank until the routed record has arrived.
    pub fn rows(&self) -> Vec<DetailRow> {
        let object = self.entity().and_then(|e| to_object(&e).ok()).unwrap_or_default();

        let mut rows = vec![DetailRow {
            label: "ID",
            value: display(object.get("id")),
        }];
        rows.extend(E::fields().iter().map(|field| DetailRow {
            label: field.label,
            value: display(object.get(field.name)),
        }));
        rows.extend(E::references().iter().map(|reference| DetailRow {
            label: reference.label,
            value: display(
                object
                    .get(reference.name)
                    .and_then(|r| r.get(reference.display_field)),
            ),
        }));
        rows
    }

    pub fn back_location(&self) -> String {
        self.route.list_location::<E>()
    }

    pub fn edit_location(&self) -> Option<String> {
        self.route.id.map(|id| format!("/{}/{}/edit", E::NAME, id))
    }
}
