//! Filtered, sorted, per-column view of the task list.
//!
//! Pure over its two inputs: the same tasks and query always give the same
//! columns.

use crate::task::{Status, Task};

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: Status,
    pub cards: Vec<&'a Task>,
}

/// The five columns, in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView<'a> {
    pub columns: Vec<Column<'a>>,
}

impl<'a> BoardView<'a> {
    #[must_use]
    pub fn column(&self, status: Status) -> &Column<'a> {
        &self.columns[status.index()]
    }

    /// Total cards across all columns.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

/// Case-insensitive substring match on title or owner. A blank query matches
/// everything.
#[must_use]
pub fn matches_query(task: &Task, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || task.title.to_lowercase().contains(&needle)
        || task.owner.to_lowercase().contains(&needle)
}

/// Filters by `query`, sorts by priority then due date, and groups by status.
#[must_use]
pub fn project<'a>(tasks: &'a [Task], query: &str) -> BoardView<'a> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| matches_query(t, query)).collect();

    // Stable: ties keep list order.
    visible.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.due_date.cmp(&b.due_date))
    });

    let mut columns: Vec<Column<'a>> = Status::ALL
        .into_iter()
        .map(|status| Column {
            status,
            cards: Vec::new(),
        })
        .collect();
    for task in visible {
        columns[task.status.index()].cards.push(task);
    }

    BoardView { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn task(id: &str, title: &str, owner: &str, due: &str, priority: Priority, status: Status) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            owner: owner.into(),
            due_date: due.into(),
            priority,
            status,
        }
    }

    fn ids<'a>(column: &Column<'a>) -> Vec<&'a str> {
        column.cards.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_priority_then_due_date() {
        let tasks = vec![
            task("1", "a", "", "2024-02-01T00:00:00.000Z", Priority::Baja, Status::Todo),
            task("2", "b", "", "2024-03-01T00:00:00.000Z", Priority::Alta, Status::Todo),
            task("3", "c", "", "", Priority::Alta, Status::Todo),
            task("4", "d", "", "2024-01-01T00:00:00.000Z", Priority::Media, Status::Todo),
            task("5", "e", "", "2024-01-15T00:00:00.000Z", Priority::Alta, Status::Todo),
        ];
        let view = project(&tasks, "");
        assert_eq!(ids(view.column(Status::Todo)), vec!["3", "5", "2", "4", "1"]);
    }

    #[test]
    fn equal_keys_keep_list_order() {
        let tasks = vec![
            task("x", "a", "", "", Priority::Media, Status::Done),
            task("y", "b", "", "", Priority::Media, Status::Done),
            task("z", "c", "", "", Priority::Media, Status::Done),
        ];
        assert_eq!(ids(project(&tasks, "").column(Status::Done)), vec!["x", "y", "z"]);
    }

    #[test]
    fn groups_into_status_columns() {
        let tasks = vec![
            task("1", "a", "", "", Priority::Media, Status::Review),
            task("2", "b", "", "", Priority::Media, Status::Backlog),
            task("3", "c", "", "", Priority::Media, Status::Review),
        ];
        let view = project(&tasks, "");
        assert_eq!(view.columns.len(), 5);
        assert_eq!(ids(view.column(Status::Review)), vec!["1", "3"]);
        assert_eq!(ids(view.column(Status::Backlog)), vec!["2"]);
        assert!(view.column(Status::InProgress).cards.is_empty());
        assert_eq!(view.card_count(), 3);
    }

    #[test]
    fn query_matches_title_or_owner_ignoring_case() {
        let tasks = vec![
            task("1", "Write README", "ana", "", Priority::Media, Status::Todo),
            task("2", "Deploy", "Readiness team", "", Priority::Media, Status::Todo),
            task("3", "Deploy", "bob", "", Priority::Media, Status::Todo),
        ];
        let view = project(&tasks, "  READ ");
        assert_eq!(ids(view.column(Status::Todo)), vec!["1", "2"]);
    }

    #[test]
    fn description_is_not_searched() {
        let mut t = task("1", "Deploy", "bob", "", Priority::Media, Status::Todo);
        t.description = "needle".into();
        assert!(!matches_query(&t, "needle"));
        assert!(matches_query(&t, ""));
    }
}
