use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::task::{Category, Draft, Task};
use crate::validate::{ValidationErrors, validate};

/// Both category sequences. Every operation returns a new snapshot and
/// leaves `self` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStore {
    personal: Vec<Task>,
    work: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(&self, category: Category) -> &[Task] {
        match category {
            Category::Personal => &self.personal,
            Category::Work => &self.work,
        }
    }

    fn sequence_mut(&mut self, category: Category) -> &mut Vec<Task> {
        match category {
            Category::Personal => &mut self.personal,
            Category::Work => &mut self.work,
        }
    }

    /// All tasks, personal first, each sequence in display order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.personal.iter().chain(self.work.iter())
    }

    pub fn len(&self) -> usize {
        self.personal.len() + self.work.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks().find(|task| task.id == id)
    }

    fn locate(&self, id: Uuid) -> Result<(Category, usize)> {
        Category::ALL
            .into_iter()
            .find_map(|category| {
                self.sequence(category)
                    .iter()
                    .position(|task| task.id == id)
                    .map(|idx| (category, idx))
            })
            .ok_or(StoreError::NotFound(id))
    }

    pub fn validate(&self, draft: &Draft) -> ValidationErrors {
        validate(draft)
    }

    /// Creates a task when `target` is `None`, otherwise edits the task
    /// with that id. Validation failures return an unchanged store.
    #[instrument(skip(self, draft, now), fields(category = %draft.category))]
    pub fn submit(
        &self,
        draft: &Draft,
        target: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(TaskStore, ValidationErrors)> {
        let errors = validate(draft);
        let category = match draft.category.parse::<Category>() {
            Ok(category) if errors.is_empty() => category,
            _ => return Ok((self.clone(), errors)),
        };

        let mut next = self.clone();
        match target {
            None => {
                let mut task = Task::new_open(
                    category,
                    draft.title.clone(),
                    draft.description.clone(),
                    now,
                );
                while next.find(task.id).is_some() {
                    task.id = Uuid::new_v4();
                }
                info!(id = %task.id, %category, "task created");
                next.sequence_mut(category).push(task);
            }
            Some(id) => {
                let (current, idx) = next.locate(id)?;
                if current == category {
                    let task = &mut next.sequence_mut(current)[idx];
                    task.title = draft.title.clone();
                    task.description = draft.description.clone();
                    task.time.updated_at = now;
                    info!(%id, %category, position = idx, "task edited in place");
                } else {
                    let mut task = next.sequence_mut(current).remove(idx);
                    task.category = category;
                    task.title = draft.title.clone();
                    task.description = draft.description.clone();
                    task.time.updated_at = now;
                    next.sequence_mut(category).push(task);
                    info!(%id, from = %current, to = %category, "task moved");
                }
            }
        }

        debug!(
            personal = next.personal.len(),
            work = next.work.len(),
            "submit applied"
        );
        Ok((next, ValidationErrors::default()))
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: Uuid) -> Result<TaskStore> {
        let (category, idx) = self.locate(id)?;
        let mut next = self.clone();
        next.sequence_mut(category).remove(idx);
        info!(%id, %category, "task removed");
        Ok(next)
    }

    /// Flips `done`. Content timestamps are left alone.
    #[instrument(skip(self, now))]
    pub fn toggle_done(&self, id: Uuid, now: DateTime<Utc>) -> Result<TaskStore> {
        let (category, idx) = self.locate(id)?;
        let mut next = self.clone();
        let task = &mut next.sequence_mut(category)[idx];
        task.done = !task.done;
        task.time.done_at = task.done.then_some(now);
        info!(%id, done = task.done, "task done toggled");
        Ok(next)
    }
}
