//! Loads and persists the whole task list against a [`TaskStore`].
//!
//! Every save replaces the complete remote collection. Saves are serialized
//! through a single lock, so the read-existing-ids / batch-replace pair of one
//! save never interleaves with another.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::seed::demo_tasks;
use crate::store::{StoreResult, TaskStore};
use crate::task::{Task, TaskId};

/// Where the tasks returned by [`TaskRepository::load`] came from.
#[derive(Debug, Clone)]
pub enum LoadSource {
    /// Read from the store.
    Stored,
    /// The store was empty; the demo board was seeded and written.
    SeededAndSaved,
    /// The store was empty; the demo board was seeded but could not be written.
    SeededSaveFailed(StoreError),
    /// The store could not be read; the demo board is local only.
    SeededOffline(StoreError),
}

/// Result of a startup load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    pub source: LoadSource,
}

impl Loaded {
    /// Message for the user when the load did not go cleanly.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match &self.source {
            LoadSource::Stored | LoadSource::SeededAndSaved => None,
            LoadSource::SeededSaveFailed(err) => Some(format!(
                "Could not save the demo board, changes may not persist ({err})"
            )),
            LoadSource::SeededOffline(err) => Some(format!(
                "Could not reach the task store, showing demo data ({err})"
            )),
        }
    }
}

pub struct TaskRepository<S> {
    store: S,
    save_lock: Mutex<()>,
}

impl<S: TaskStore> TaskRepository<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            save_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the full collection, seeding the demo board when there is none.
    ///
    /// An empty but reachable store is seeded and written through. An
    /// unreachable store is seeded locally and never written.
    pub async fn load(&self) -> Loaded {
        match self.store.get_all().await {
            Ok(tasks) if !tasks.is_empty() => {
                info!(count = tasks.len(), "loaded tasks from store");
                Loaded {
                    tasks,
                    source: LoadSource::Stored,
                }
            }
            Ok(_) => {
                info!("no tasks found, seeding with demo data");
                let tasks = demo_tasks(Utc::now());
                let source = match self.save(&tasks).await {
                    Ok(()) => LoadSource::SeededAndSaved,
                    Err(err) => LoadSource::SeededSaveFailed(err),
                };
                Loaded { tasks, source }
            }
            Err(err) => {
                error!(error = %err, "error loading tasks, using demo data");
                Loaded {
                    tasks: demo_tasks(Utc::now()),
                    source: LoadSource::SeededOffline(err),
                }
            }
        }
    }

    /// Replaces the remote collection with `tasks` in one batch.
    ///
    /// Failures are logged and returned; nothing is retried and the caller's
    /// list is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the existing ids cannot be read or the batch
    /// is rejected.
    pub async fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let _guard = self.save_lock.lock().await;
        let result = self.replace_all(tasks).await;
        match &result {
            Ok(()) => info!(count = tasks.len(), "saved tasks"),
            Err(err) => warn!(error = %err, "could not save tasks, changes may not persist"),
        }
        result
    }

    async fn replace_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let existing: Vec<TaskId> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        self.store.batch_replace(&existing, tasks).await
    }
}
