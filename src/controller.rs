//! Mutations on the task list: form submit, delete, drop, import, reset.
//!
//! Each one mutates the [`KanbanBoard`] it is handed and then persists the full
//! list. A failed save keeps the local change and is reported through
//! [`Outcome::SaveFailed`].

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::confirm::{Confirm, DELETE_PROMPT, RESET_PROMPT};
use crate::drag::DragState;
use crate::error::{FormatError, StoreError, ValidationError};
use crate::kanban_board::KanbanBoard;
use crate::repository::TaskRepository;
use crate::seed::demo_tasks;
use crate::store::TaskStore;
use crate::task::{iso_timestamp, new_task_id, Priority, Status, Task, TaskId, MAX_TITLE_LEN};
use crate::transfer::import_all;

/// What happened to the task list and the store.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing changed and nothing was written.
    Unchanged,
    /// The list changed and the store now matches it.
    Saved,
    /// The list changed but the store could not be written.
    SaveFailed(StoreError),
}

impl Outcome {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::SaveFailed(err) => Some(format!(
                "Could not save, your changes may not persist ({err})"
            )),
            _ => None,
        }
    }
}

/// Raw values from the create/edit form.
///
/// `due_date` is a `YYYY-MM-DD` calendar date or blank. An absent or blank `id`
/// means a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
}

impl TaskForm {
    /// A blank form for a new task in the backlog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form prefilled for editing `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            owner: task.owner.clone(),
            due_date: task.due_date.get(..10).unwrap_or_default().to_string(),
            priority: task.priority,
            status: task.status,
        }
    }

    /// Trims and checks the fields, producing the task to store.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or over-long title or a due
    /// date that is not a calendar date.
    pub fn into_task(self) -> Result<Task, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN });
        }

        let due = self.due_date.trim();
        let due_date = if due.is_empty() {
            String::new()
        } else {
            NaiveDate::parse_from_str(due, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|at| iso_timestamp(at.and_utc()))
                .ok_or_else(|| ValidationError::InvalidDueDate(due.to_string()))?
        };

        Ok(Task {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_task_id),
            title,
            description: self.description.trim().to_string(),
            owner: self.owner.trim().to_string(),
            due_date,
            priority: self.priority,
            status: self.status,
        })
    }
}

pub struct BoardController<S> {
    repository: Arc<TaskRepository<S>>,
    confirm_destructive: bool,
}

impl<S: TaskStore> BoardController<S> {
    #[must_use]
    pub fn new(repository: Arc<TaskRepository<S>>) -> Self {
        Self {
            repository,
            confirm_destructive: true,
        }
    }

    /// When `false`, delete and reset skip the confirmation gate.
    #[must_use]
    pub fn with_confirmation(mut self, confirm_destructive: bool) -> Self {
        self.confirm_destructive = confirm_destructive;
        self
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<TaskRepository<S>> {
        &self.repository
    }

    fn confirmed(&self, confirm: &dyn Confirm, prompt: &str) -> bool {
        !self.confirm_destructive || confirm.confirm(prompt)
    }

    async fn persist(&self, board: &KanbanBoard) -> Outcome {
        match self.repository.save(board.tasks()).await {
            Ok(()) => Outcome::Saved,
            Err(err) => Outcome::SaveFailed(err),
        }
    }

    /// Creates or updates a task from form input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] without touching the board or the store.
    pub async fn submit(
        &self,
        board: &mut KanbanBoard,
        form: TaskForm,
    ) -> Result<(Task, Outcome), ValidationError> {
        let task = form.into_task()?;
        debug!(id = %task.id, "upserting task");
        board.upsert(task.clone());
        Ok((task, self.persist(board).await))
    }

    /// Removes the task with `id` once confirmed. Unknown ids are a no-op.
    pub async fn delete(&self, board: &mut KanbanBoard, id: &str, confirm: &dyn Confirm) -> Outcome {
        if board.find(id).is_none() || !self.confirmed(confirm, DELETE_PROMPT) {
            return Outcome::Unchanged;
        }
        board.remove(id);
        debug!(%id, "deleted task");
        self.persist(board).await
    }

    /// Applies a drop onto the `target` column and returns the drag to idle.
    ///
    /// The task is taken from the drag state, or from `payload` when no drag
    /// was recorded. An unresolvable id is a no-op.
    pub async fn drop_on(
        &self,
        board: &mut KanbanBoard,
        drag: &mut DragState,
        target: Status,
        payload: Option<&str>,
    ) -> Outcome {
        let id = drag.resolve(payload).map(str::to_owned);
        drag.end();
        let Some(id) = id else {
            return Outcome::Unchanged;
        };
        if !board.move_task(&id, target) {
            return Outcome::Unchanged;
        }
        debug!(%id, status = %target, "moved task");
        self.persist(board).await
    }

    /// Replaces the whole board with a sanitized import.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] without touching the board or the store.
    pub async fn import(&self, board: &mut KanbanBoard, raw: &str) -> Result<Outcome, FormatError> {
        let tasks = import_all(raw)?;
        debug!(count = tasks.len(), "importing tasks");
        board.replace_all(tasks);
        Ok(self.persist(board).await)
    }

    /// Replaces the whole board with a fresh demo seed once confirmed.
    pub async fn reset_demo(&self, board: &mut KanbanBoard, confirm: &dyn Confirm) -> Outcome {
        if !self.confirmed(confirm, RESET_PROMPT) {
            return Outcome::Unchanged;
        }
        board.replace_all(demo_tasks(Utc::now()));
        self.persist(board).await
    }
}
