//! The caller side of the store: tracks which task is being edited and
//! which per-task actions are currently allowed.

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::store::TaskStore;
use crate::task::{Draft, Task};
use crate::validate::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskActions {
    pub can_edit: bool,
    pub can_remove: bool,
    pub can_toggle: bool,
}

impl TaskActions {
    /// Done tasks are frozen for edit/remove; the task being edited is
    /// frozen entirely until the edit is saved or cancelled.
    pub fn for_task(task: &Task, editing: Option<Uuid>) -> Self {
        let is_editing = editing == Some(task.id);
        Self {
            can_edit: !task.done && !is_editing,
            can_remove: !task.done && !is_editing,
            can_toggle: !is_editing,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    store: TaskStore,
    editing: Option<Uuid>,
}

impl Session {
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn actions(&self, task: &Task) -> TaskActions {
        TaskActions::for_task(task, self.editing)
    }

    fn task(&self, id: Uuid) -> anyhow::Result<&Task> {
        self.store
            .find(id)
            .ok_or_else(|| anyhow!("task not found: {id}"))
    }

    #[instrument(skip(self))]
    pub fn begin_edit(&mut self, id: Uuid) -> anyhow::Result<Draft> {
        let task = self.task(id)?;
        if !self.actions(task).can_edit {
            return Err(anyhow!(
                "task {} cannot be edited while it is done or already being edited",
                task.short_id()
            ));
        }

        let draft = Draft::from_task(task);
        self.editing = Some(id);
        info!(%id, "editing task");
        Ok(draft)
    }

    pub fn cancel_edit(&mut self) -> Option<Uuid> {
        let cancelled = self.editing.take();
        debug!(?cancelled, "edit cancelled");
        cancelled
    }

    /// Submits the draft as a create, or as an edit of the task being
    /// edited. The editing id is cleared only when the submit succeeds.
    #[instrument(skip(self, draft, now))]
    pub fn submit(&mut self, draft: &Draft, now: DateTime<Utc>) -> anyhow::Result<ValidationErrors> {
        let (next, errors) = self
            .store
            .submit(draft, self.editing, now)
            .context("submit failed")?;

        if errors.is_empty() {
            self.store = next;
            self.editing = None;
        }
        Ok(errors)
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> anyhow::Result<Task> {
        let task = self.task(id)?.clone();
        if !self.actions(&task).can_remove {
            return Err(anyhow!(
                "task {} cannot be removed while it is done or being edited",
                task.short_id()
            ));
        }
        self.store = self.store.remove(id).context("remove failed")?;
        Ok(task)
    }

    #[instrument(skip(self, now))]
    pub fn toggle_done(&mut self, id: Uuid, now: DateTime<Utc>) -> anyhow::Result<&Task> {
        let task = self.task(id)?;
        if !self.actions(task).can_toggle {
            return Err(anyhow!(
                "task {} is being edited; save or cancel first",
                task.short_id()
            ));
        }
        self.store = self.store.toggle_done(id, now).context("toggle failed")?;
        self.task(id)
    }
}
