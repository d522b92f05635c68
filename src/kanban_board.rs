use crate::task::{Status, Task};

/// The session's working set of tasks.
///
/// Logically unordered; render order comes from [`crate::projection`]. Ids are
/// unique: [`KanbanBoard::upsert`] replaces on a matching id instead of pushing
/// a second copy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Replaces the task with the same id, or appends it.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Removes the task with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Moves a task to another column. Returns `false` when `id` is unknown.
    pub fn move_task(&mut self, id: &str, status: Status) -> bool {
        match self.find_mut(id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Swaps in a whole new task list.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}
