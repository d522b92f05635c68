//! End-to-end board operations against the in-memory store.

use std::sync::Arc;

use rstest::{fixture, rstest};
use taskers::confirm::Answer;
use taskers::controller::{BoardController, Outcome, TaskForm};
use taskers::drag::DragState;
use taskers::error::{FormatError, ValidationError};
use taskers::kanban_board::KanbanBoard;
use taskers::repository::{LoadSource, TaskRepository};
use taskers::store::{InMemoryTaskStore, TaskStore};
use taskers::task::{Priority, Status, Task};

struct Harness {
    store: InMemoryTaskStore,
    controller: BoardController<InMemoryTaskStore>,
}

fn task(id: &str, status: Status) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: String::new(),
        owner: String::new(),
        due_date: String::new(),
        priority: Priority::Media,
        status,
    }
}

fn harness_with(tasks: Vec<Task>) -> Harness {
    let store = InMemoryTaskStore::with_tasks(tasks);
    let repository = Arc::new(TaskRepository::new(store.clone()));
    Harness {
        store,
        controller: BoardController::new(repository),
    }
}

#[fixture]
fn harness() -> Harness {
    harness_with(vec![
        task("W", Status::Backlog),
        task("X", Status::Todo),
        task("Y", Status::Done),
    ])
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| a.id.cmp(&b.id));
    tasks
}

#[tokio::test]
async fn empty_store_seeds_seven_demo_tasks_and_persists_them() {
    let h = harness_with(Vec::new());
    let loaded = h.controller.repository().load().await;

    assert!(matches!(loaded.source, LoadSource::SeededAndSaved));
    assert_eq!(loaded.tasks.len(), 7);
    for status in Status::ALL {
        assert!(loaded.tasks.iter().any(|t| t.status == status));
    }
    assert_eq!(sorted(h.store.get_all().await.unwrap()), sorted(loaded.tasks));
}

#[rstest]
#[tokio::test]
async fn empty_title_is_rejected_without_persisting(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let before = board.clone();

    let form = TaskForm {
        title: String::new(),
        ..TaskForm::new()
    };
    let result = harness.controller.submit(&mut board, form).await;

    assert!(matches!(result, Err(ValidationError::EmptyTitle)));
    assert_eq!(board, before);
    assert_eq!(harness.store.batch_writes(), 0);
}

#[rstest]
#[tokio::test]
async fn drop_moves_one_task_and_persists_once(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let mut drag = DragState::new();
    drag.start("X");

    let outcome = harness
        .controller
        .drop_on(&mut board, &mut drag, Status::Review, None)
        .await;

    assert!(matches!(outcome, Outcome::Saved));
    assert!(!drag.is_dragging());
    assert_eq!(board.find("X").map(|t| t.status), Some(Status::Review));
    assert_eq!(board.find("W"), Some(&task("W", Status::Backlog)));
    assert_eq!(board.find("Y"), Some(&task("Y", Status::Done)));
    assert_eq!(harness.store.batch_writes(), 1);
    assert_eq!(sorted(harness.store.get_all().await.unwrap()), sorted(board.tasks().to_vec()));
}

#[rstest]
#[tokio::test]
async fn drop_uses_payload_when_drag_state_was_lost(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let mut drag = DragState::new();

    let outcome = harness
        .controller
        .drop_on(&mut board, &mut drag, Status::InProgress, Some("W"))
        .await;

    assert!(matches!(outcome, Outcome::Saved));
    assert_eq!(board.find("W").map(|t| t.status), Some(Status::InProgress));
}

#[rstest]
#[tokio::test]
async fn unresolvable_drop_is_a_no_op(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let before = board.clone();
    let mut drag = DragState::new();

    let nothing = harness
        .controller
        .drop_on(&mut board, &mut drag, Status::Done, None)
        .await;
    drag.start("ghost");
    let ghost = harness
        .controller
        .drop_on(&mut board, &mut drag, Status::Done, None)
        .await;

    assert!(nothing.is_unchanged());
    assert!(ghost.is_unchanged());
    assert_eq!(board, before);
    assert_eq!(harness.store.batch_writes(), 0);
}

#[rstest]
#[tokio::test]
async fn import_coerces_unknown_priority_to_media(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let raw = r#"[{"id": "n1", "title": "Imported", "priority": "urgent", "status": "todo"}]"#;

    let outcome = harness.controller.import(&mut board, raw).await.unwrap();

    assert!(matches!(outcome, Outcome::Saved));
    assert_eq!(board.len(), 1, "import replaces, never merges");
    let imported = board.find("n1").unwrap();
    assert_eq!(imported.priority, Priority::Media);
    assert_eq!(imported.status, Status::Todo);
    assert_eq!(harness.store.get_all().await.unwrap(), board.tasks().to_vec());
}

#[rstest]
#[tokio::test]
async fn non_array_import_changes_nothing(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let before = board.clone();

    let result = harness.controller.import(&mut board, r#"{"id": "a"}"#).await;

    assert!(matches!(result, Err(FormatError::NotAnArray(_))));
    assert_eq!(board, before);
    assert_eq!(harness.store.batch_writes(), 0);
}

#[rstest]
#[tokio::test]
async fn deleting_an_unknown_id_does_nothing(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    let before = board.clone();

    let outcome = harness
        .controller
        .delete(&mut board, "not-there", &Answer(true))
        .await;

    assert!(outcome.is_unchanged());
    assert!(outcome.warning().is_none());
    assert_eq!(board, before);
    assert_eq!(harness.store.batch_writes(), 0);
}

#[rstest]
#[tokio::test]
async fn delete_waits_for_confirmation(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());

    let declined = harness.controller.delete(&mut board, "X", &Answer(false)).await;
    assert!(declined.is_unchanged());
    assert!(board.find("X").is_some());

    let prompts = std::cell::RefCell::new(Vec::new());
    let confirm = |prompt: &str| {
        prompts.borrow_mut().push(prompt.to_string());
        true
    };
    let accepted = harness.controller.delete(&mut board, "X", &confirm).await;
    assert!(matches!(accepted, Outcome::Saved));
    assert!(board.find("X").is_none());
    assert_eq!(prompts.borrow().len(), 1);
    assert_eq!(harness.store.get_all().await.unwrap().len(), 2);
}

#[rstest]
#[tokio::test]
async fn confirmation_can_be_switched_off() {
    let store = InMemoryTaskStore::with_tasks([task("A", Status::Todo)]);
    let controller = BoardController::new(Arc::new(TaskRepository::new(store.clone())))
        .with_confirmation(false);
    let mut board = KanbanBoard::with_tasks(store.get_all().await.unwrap());

    let outcome = controller.delete(&mut board, "A", &Answer(false)).await;

    assert!(matches!(outcome, Outcome::Saved));
    assert!(board.is_empty());
}

#[rstest]
#[tokio::test]
async fn create_then_edit_upserts_by_id(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());

    let form = TaskForm {
        title: " New card ".into(),
        owner: "ana".into(),
        priority: Priority::Alta,
        status: Status::Todo,
        ..TaskForm::new()
    };
    let (created, _) = harness.controller.submit(&mut board, form).await.unwrap();
    assert_eq!(created.title, "New card");
    assert_eq!(board.len(), 4);

    let mut edit = TaskForm::from_task(&created);
    edit.status = Status::Done;
    let (edited, outcome) = harness.controller.submit(&mut board, edit).await.unwrap();

    assert!(matches!(outcome, Outcome::Saved));
    assert_eq!(edited.id, created.id);
    assert_eq!(board.len(), 4);
    assert_eq!(board.find(&created.id).map(|t| t.status), Some(Status::Done));
    assert_eq!(harness.store.batch_writes(), 2);
}

#[rstest]
#[tokio::test]
async fn failed_save_keeps_local_change(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());
    harness.store.set_available(false);

    let form = TaskForm {
        title: "Offline edit".into(),
        ..TaskForm::new()
    };
    let (task, outcome) = harness.controller.submit(&mut board, form).await.unwrap();

    assert!(matches!(outcome, Outcome::SaveFailed(_)));
    assert!(outcome.warning().is_some());
    assert!(board.find(&task.id).is_some());

    harness.store.set_available(true);
    assert_eq!(harness.store.get_all().await.unwrap().len(), 3);
}

#[rstest]
#[tokio::test]
async fn reset_restores_demo_board(harness: Harness) {
    let mut board = KanbanBoard::with_tasks(harness.store.get_all().await.unwrap());

    let outcome = harness.controller.reset_demo(&mut board, &Answer(true)).await;

    assert!(matches!(outcome, Outcome::Saved));
    assert_eq!(board.len(), 7);
    assert!(board.find("X").is_none());
    assert_eq!(harness.store.get_all().await.unwrap().len(), 7);
}
