//! Document store contract and its adapters.
//!
//! A store is an addressable collection of task records keyed by id. The only
//! write primitive is [`TaskStore::batch_replace`], which deletes and inserts
//! as one unit.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::error::StoreError;
use crate::task::{Task, TaskId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Remote task collection.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Reads every stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the collection cannot be read.
    async fn get_all(&self) -> StoreResult<Vec<Task>>;

    /// Deletes `ids_to_delete`, then inserts `records` keyed by their id.
    ///
    /// Either the whole batch is applied or none of it is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the batch could not be committed.
    async fn batch_replace(&self, ids_to_delete: &[TaskId], records: &[Task]) -> StoreResult<()>;
}

#[async_trait]
impl<S: TaskStore + ?Sized> TaskStore for Arc<S> {
    async fn get_all(&self) -> StoreResult<Vec<Task>> {
        (**self).get_all().await
    }

    async fn batch_replace(&self, ids_to_delete: &[TaskId], records: &[Task]) -> StoreResult<()> {
        (**self).batch_replace(ids_to_delete, records).await
    }
}

fn apply_batch(documents: &mut BTreeMap<TaskId, Task>, ids_to_delete: &[TaskId], records: &[Task]) {
    for id in ids_to_delete {
        documents.remove(id);
    }
    for task in records {
        documents.insert(task.id.clone(), task.clone());
    }
}

/// Process-local store, used for tests and `--store memory`.
///
/// Can be switched offline to model an unreachable backend.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore {
    documents: Arc<RwLock<BTreeMap<TaskId, Task>>>,
    available: Arc<AtomicBool>,
    batch_writes: Arc<AtomicUsize>,
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self {
            documents: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
            batch_writes: Arc::default(),
        }
    }
}

impl InMemoryTaskStore {
    /// Creates an empty, reachable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reachable store holding `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        if let Ok(mut documents) = store.documents.write() {
            documents.extend(tasks.into_iter().map(|t| (t.id.clone(), t)));
        }
        store
    }

    /// Marks the store reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of batches committed so far.
    #[must_use]
    pub fn batch_writes(&self) -> usize {
        self.batch_writes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

fn poisoned(err: impl ToString) -> StoreError {
    StoreError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_all(&self) -> StoreResult<Vec<Task>> {
        self.ensure_available()?;
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.values().cloned().collect())
    }

    async fn batch_replace(&self, ids_to_delete: &[TaskId], records: &[Task]) -> StoreResult<()> {
        self.ensure_available()?;
        let mut documents = self.documents.write().map_err(poisoned)?;
        apply_batch(&mut documents, ids_to_delete, records);
        self.batch_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store backed by one JSON object document (`{ "<id>": Task, .. }`).
///
/// A missing file is an empty collection. Batches are written to a sibling
/// temp file and renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileTaskStore {
    path: PathBuf,
}

impl JsonFileTaskStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_documents(&self) -> StoreResult<BTreeMap<TaskId, Task>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                StoreError::Unavailable(format!("{} is not a task document: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::Unavailable(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TaskStore for JsonFileTaskStore {
    async fn get_all(&self) -> StoreResult<Vec<Task>> {
        Ok(self.read_documents().await?.into_values().collect())
    }

    async fn batch_replace(&self, ids_to_delete: &[TaskId], records: &[Task]) -> StoreResult<()> {
        let mut documents = self.read_documents().await?;
        apply_batch(&mut documents, ids_to_delete, records);

        let body = serde_json::to_string_pretty(&documents).map_err(StoreError::backend)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::backend)?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, body)
            .await
            .map_err(StoreError::backend)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(StoreError::backend)?;
        debug!(path = %self.path.display(), records = documents.len(), "task document written");
        Ok(())
    }
}
