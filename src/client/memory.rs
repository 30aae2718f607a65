use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{EntityApi, Page};
use crate::error::AppError;
use crate::models::{Entity, PageRequest};

/// Calls received by a [`MemoryEntityApi`], in arrival order per operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallLog<E> {
    pub fetch_all: usize,
    pub fetched_ids: Vec<i64>,
    pub created: Vec<E>,
    pub updated: Vec<E>,
    pub deleted_ids: Vec<i64>,
}

impl<E> CallLog<E> {
    pub fn mutations(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted_ids.len()
    }
}

struct Inner<E> {
    records: BTreeMap<i64, E>,
    next_id: i64,
    calls: CallLog<E>,
    fail_next: Option<(u16, String)>,
}

/// In-process stand-in for the REST service. Assigns ids the way the
/// service does and keeps a log of every call.
pub struct MemoryEntityApi<E> {
    inner: Mutex<Inner<E>>,
}

impl<E: Entity> Default for MemoryEntityApi<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryEntityApi<E> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
                calls: CallLog::default(),
                fail_next: None,
            }),
        }
    }

    /// Seeds records that already carry ids; records without one get the next free id.
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let api = Self::new();
        {
            let mut inner = api.lock();
            for mut record in records {
                let id = record.id().unwrap_or(inner.next_id);
                record.set_id(Some(id));
                inner.next_id = inner.next_id.max(id + 1);
                inner.records.insert(id, record);
            }
        }
        api
    }

    /// The next call of any kind fails with this status and message.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.lock().fail_next = Some((status, message.into()));
    }

    pub fn calls(&self) -> CallLog<E> {
        self.lock().calls.clone()
    }

    pub fn records(&self) -> Vec<E> {
        self.lock().records.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(inner: &mut Inner<E>) -> Result<(), AppError> {
        match inner.fail_next.take() {
            Some((status, message)) => Err(AppError::Api { status, message }),
            None => Ok(()),
        }
    }
}

fn not_found() -> AppError {
    AppError::Api {
        status: 404,
        message: "Not Found".to_string(),
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for MemoryEntityApi<E> {
    async fn fetch_all(&self, page: &PageRequest) -> Result<Page<E>, AppError> {
        let mut inner = self.lock();
        inner.calls.fetch_all += 1;
        Self::take_failure(&mut inner)?;

        let total = inner.records.len() as u64;
        let items = inner
            .records
            .values()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, Some(total)))
    }

    async fn fetch(&self, id: i64) -> Result<E, AppError> {
        let mut inner = self.lock();
        inner.calls.fetched_ids.push(id);
        Self::take_failure(&mut inner)?;

        inner.records.get(&id).cloned().ok_or_else(not_found)
    }

    async fn create(&self, entity: &E) -> Result<E, AppError> {
        let mut inner = self.lock();
        inner.calls.created.push(entity.clone());
        Self::take_failure(&mut inner)?;

        if entity.id().is_some() {
            return Err(AppError::Api {
                status: 400,
                message: format!("A new {} cannot already have an ID", E::NAME),
            });
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let mut created = entity.clone();
        created.set_id(Some(id));
        inner.records.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, entity: &E) -> Result<E, AppError> {
        let mut inner = self.lock();
        inner.calls.updated.push(entity.clone());
        Self::take_failure(&mut inner)?;

        let id = entity.id().ok_or_else(|| AppError::Api {
            status: 400,
            message: "Invalid id".to_string(),
        })?;
        if !inner.records.contains_key(&id) {
            return Err(AppError::Api {
                status: 400,
                message: "Entity not found".to_string(),
            });
        }

        inner.records.insert(id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> Result<i64, AppError> {
        let mut inner = self.lock();
        inner.calls.deleted_ids.push(id);
        Self::take_failure(&mut inner)?;

        inner.records.remove(&id);
        Ok(id)
    }
}
