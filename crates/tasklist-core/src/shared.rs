use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{Category, Draft, Task};
use crate::validate::ValidationErrors;

/// A store shared between writers. Each operation reads and replaces the
/// snapshot under one lock acquisition.
#[derive(Debug, Clone, Default)]
pub struct SharedTaskStore {
    inner: Arc<Mutex<TaskStore>>,
}

impl SharedTaskStore {
    pub fn snapshot(&self) -> TaskStore {
        self.inner.lock().clone()
    }

    pub fn sequence(&self, category: Category) -> Vec<Task> {
        self.inner.lock().sequence(category).to_vec()
    }

    #[instrument(skip(self, draft, now))]
    pub fn submit(
        &self,
        draft: &Draft,
        target: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<ValidationErrors> {
        let mut store = self.inner.lock();
        let (next, errors) = store.submit(draft, target, now)?;
        *store = next;
        Ok(errors)
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: Uuid) -> Result<()> {
        let mut store = self.inner.lock();
        *store = store.remove(id)?;
        Ok(())
    }

    #[instrument(skip(self, now))]
    pub fn toggle_done(&self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let mut store = self.inner.lock();
        *store = store.toggle_done(id, now)?;
        Ok(())
    }
}
