//! Interactive board state.
//!
//! Key and mouse events are turned into an [`Action`] by [`App::handle_key`] /
//! [`App::handle_mouse`]; anything that touches the task list or the store is
//! then run by [`App::apply`]. Purely visual state (selection, search text,
//! open dialogs) changes directly in the handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::path::PathBuf;
use tracing::warn;

use crate::confirm::{Answer, DELETE_PROMPT, RESET_PROMPT};
use crate::controller::{BoardController, Outcome, TaskForm};
use crate::drag::DragState;
use crate::kanban_board::KanbanBoard;
use crate::projection::{project, BoardView};
use crate::store::TaskStore;
use crate::task::{Status, Task, TaskId, MAX_TITLE_LEN};
use crate::transfer::{export_all, EXPORT_FILE_NAME};
use crate::ui;

/// Work the event loop must run against the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(TaskForm),
    Delete { id: TaskId, answer: Answer },
    Drop { target: Status, payload: Option<TaskId> },
    Reset(Answer),
    Export,
    Import(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Owner,
    DueDate,
    Priority,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Owner,
        FormField::DueDate,
        FormField::Priority,
        FormField::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title*",
            Self::Description => "Description",
            Self::Owner => "Owner",
            Self::DueDate => "Due (YYYY-MM-DD)",
            Self::Priority => "Priority",
            Self::Status => "Status",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The open create/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub form: TaskForm,
    pub focus: FormField,
    pub error: Option<String>,
}

impl FormState {
    fn new(form: TaskForm) -> Self {
        Self {
            form,
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.form.id.is_some()
    }

    /// Text shown for `field`.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.form.title,
            FormField::Description => &self.form.description,
            FormField::Owner => &self.form.owner,
            FormField::DueDate => &self.form.due_date,
            FormField::Priority => self.form.priority.as_str(),
            FormField::Status => self.form.status.as_str(),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.form.title),
            FormField::Description => Some(&mut self.form.description),
            FormField::Owner => Some(&mut self.form.owner),
            FormField::DueDate => Some(&mut self.form.due_date),
            FormField::Priority | FormField::Status => None,
        }
    }

    fn cycle(&mut self) {
        match self.focus {
            FormField::Priority => self.form.priority = self.form.priority.cycle(),
            FormField::Status => self.form.status = self.form.status.cycle(),
            _ => {}
        }
    }
}

/// A destructive action waiting on a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Delete(TaskId),
    Reset,
}

impl Pending {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Delete(_) => DELETE_PROMPT,
            Self::Reset => RESET_PROMPT,
        }
    }

    fn answer(self, yes: bool) -> Action {
        match self {
            Self::Delete(id) => Action::Delete {
                id,
                answer: Answer(yes),
            },
            Self::Reset => Action::Reset(Answer(yes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Board,
    Search,
    Form(FormState),
    Confirm(Pending),
    ImportPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// One line of feedback in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

pub struct App {
    pub board: KanbanBoard,
    pub query: String,
    pub mode: Mode,
    pub selected_column: usize,
    pub selected_card: usize,
    /// First visible card of the selected column.
    pub card_offset: usize,
    pub drag: DragState,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    area: Rect,
    /// Card under the last left press; becomes a drag once the pointer moves.
    pressed: Option<TaskId>,
    confirm_destructive: bool,
    export_path: PathBuf,
}

impl App {
    pub fn new(board: KanbanBoard) -> Self {
        Self {
            board,
            query: String::new(),
            mode: Mode::Board,
            selected_column: 0,
            selected_card: 0,
            card_offset: 0,
            drag: DragState::new(),
            notice: None,
            should_quit: false,
            area: Rect::default(),
            pressed: None,
            confirm_destructive: true,
            export_path: PathBuf::from(EXPORT_FILE_NAME),
        }
    }

    pub fn with_confirmation(mut self, confirm_destructive: bool) -> Self {
        self.confirm_destructive = confirm_destructive;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Terminal area of the last frame, used to hit-test mouse events.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn view(&self) -> BoardView<'_> {
        project(self.board.tasks(), &self.query)
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.selected_column]
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.view()
            .column(self.selected_status())
            .cards
            .get(self.selected_card)
            .copied()
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Warning,
            text: text.into(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    fn select_column(&mut self, column: usize) {
        if column != self.selected_column {
            self.selected_column = column;
            self.card_offset = 0;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.view().column(self.selected_status()).cards.len();
        self.selected_card = self.selected_card.min(len.saturating_sub(1));

        let visible = ui::visible_cards(self.area);
        if self.selected_card < self.card_offset {
            self.card_offset = self.selected_card;
        } else if self.selected_card >= self.card_offset + visible {
            self.card_offset = self.selected_card + 1 - visible;
        }
    }

    /// Moves the cursor onto the card with `id`, wherever it now renders.
    fn focus_task(&mut self, id: &str) {
        let found = self.view().columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .position(|t| t.id == id)
                .map(|index| (column.status.index(), index))
        });
        if let Some((column, card)) = found {
            self.select_column(column);
            self.selected_card = card;
        }
        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        match std::mem::replace(&mut self.mode, Mode::Board) {
            Mode::Board => self.board_key(key),
            Mode::Search => {
                self.search_key(key);
                None
            }
            Mode::Form(state) => self.form_key(state, key),
            Mode::Confirm(pending) => self.confirm_key(pending, key),
            Mode::ImportPath(path) => self.import_key(path, key),
        }
    }

    fn board_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left => {
                self.select_column(self.selected_column.saturating_sub(1));
                self.clamp_selection();
            }
            KeyCode::Right => {
                self.select_column((self.selected_column + 1).min(Status::ALL.len() - 1));
                self.clamp_selection();
            }
            KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
                self.clamp_selection();
            }
            KeyCode::Down => {
                self.selected_card += 1;
                self.clamp_selection();
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('a') => {
                let form = TaskForm {
                    status: self.selected_status(),
                    ..TaskForm::new()
                };
                self.mode = Mode::Form(FormState::new(form));
            }
            KeyCode::Char('e') | KeyCode::Enter if !self.drag.is_dragging() => {
                if let Some(form) = self.selected_task().map(TaskForm::from_task) {
                    self.mode = Mode::Form(FormState::new(form));
                }
            }
            KeyCode::Char('d') => {
                let id = self.selected_task()?.id.clone();
                return self.gate(Pending::Delete(id));
            }
            KeyCode::Char('r') => return self.gate(Pending::Reset),
            KeyCode::Char('x') => return Some(Action::Export),
            KeyCode::Char('i') => {
                self.mode = Mode::ImportPath(self.export_path.display().to_string());
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.drag.is_dragging() {
                    return Some(self.drop_action(self.selected_status()));
                }
                let id = self.selected_task()?.id.clone();
                self.drag.start(id);
            }
            KeyCode::Esc => {
                self.drag.end();
                self.notice = None;
            }
            _ => {}
        }
        None
    }

    fn gate(&mut self, pending: Pending) -> Option<Action> {
        if self.confirm_destructive {
            self.mode = Mode::Confirm(pending);
            None
        } else {
            Some(pending.answer(true))
        }
    }

    fn drop_action(&self, target: Status) -> Action {
        Action::Drop {
            target,
            payload: self.drag.dragging().map(str::to_owned),
        }
    }

    fn search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => return,
            KeyCode::Esc => self.query.clear(),
            KeyCode::Backspace => {
                self.query.pop();
                self.mode = Mode::Search;
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.mode = Mode::Search;
            }
            _ => self.mode = Mode::Search,
        }
        self.clamp_selection();
    }

    fn form_key(&mut self, mut state: FormState, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => return None,
            KeyCode::Enter => {
                let form = state.form.clone();
                self.mode = Mode::Form(state);
                return Some(Action::Submit(form));
            }
            KeyCode::Tab | KeyCode::Down => state.focus = state.focus.next(),
            KeyCode::BackTab | KeyCode::Up => state.focus = state.focus.prev(),
            KeyCode::Left | KeyCode::Right => state.cycle(),
            KeyCode::Backspace => {
                if let Some(text) = state.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(' ') if matches!(state.focus, FormField::Priority | FormField::Status) => {
                state.cycle();
            }
            KeyCode::Char(c) => {
                let title = state.focus == FormField::Title;
                if let Some(text) = state.text_mut() {
                    if !(title && text.chars().count() >= MAX_TITLE_LEN) {
                        text.push(c);
                    }
                }
            }
            _ => {}
        }
        self.mode = Mode::Form(state);
        None
    }

    fn confirm_key(&mut self, pending: Pending, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('y' | 'Y') => Some(pending.answer(true)),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(pending.answer(false)),
            _ => {
                self.mode = Mode::Confirm(pending);
                None
            }
        }
    }

    fn import_key(&mut self, mut path: String, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => return None,
            KeyCode::Enter if !path.trim().is_empty() => {
                return Some(Action::Import(PathBuf::from(path.trim())));
            }
            KeyCode::Backspace => {
                path.pop();
            }
            KeyCode::Char(c) => path.push(c),
            _ => {}
        }
        self.mode = Mode::ImportPath(path);
        None
    }

    /// Pointer drag: press on a card, move, release over a column. The drag
    /// only starts once the pointer moves, so a plain click just selects.
    /// Releasing outside the board cancels.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Action> {
        if self.mode != Mode::Board {
            return None;
        }
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = None;
                let (column, slot) = ui::card_at(self.area, at)?;
                let offset = if column == self.selected_column {
                    self.card_offset
                } else {
                    0
                };
                let card = offset + slot;
                let id = self
                    .view()
                    .column(Status::ALL[column])
                    .cards
                    .get(card)?
                    .id
                    .clone();
                self.select_column(column);
                self.selected_card = card;
                self.clamp_selection();
                self.pressed = Some(id);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !self.drag.is_dragging() {
                    let id = self.pressed.take()?;
                    self.drag.start(id);
                }
                if let Some(column) = ui::column_at(self.area, at) {
                    self.select_column(column);
                    self.clamp_selection();
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.pressed = None;
                if !self.drag.is_dragging() {
                    return None;
                }
                match ui::column_at(self.area, at) {
                    Some(column) => Some(self.drop_action(Status::ALL[column])),
                    None => {
                        self.drag.end();
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn report(&mut self, outcome: &Outcome, done: &str) {
        match outcome.warning() {
            Some(warning) => self.warn(warning),
            None if outcome.is_unchanged() => {}
            None => self.info(done),
        }
    }

    /// Runs `action` against the board and the store.
    pub async fn apply<S: TaskStore>(&mut self, action: Action, controller: &BoardController<S>) {
        match action {
            Action::Submit(form) => match controller.submit(&mut self.board, form).await {
                Ok((task, outcome)) => {
                    self.mode = Mode::Board;
                    self.focus_task(&task.id);
                    self.report(&outcome, "Task saved");
                }
                Err(err) => {
                    if let Mode::Form(state) = &mut self.mode {
                        state.error = Some(err.to_string());
                    } else {
                        self.warn(err.to_string());
                    }
                }
            },
            Action::Delete { id, answer } => {
                let outcome = controller.delete(&mut self.board, &id, &answer).await;
                self.clamp_selection();
                self.report(&outcome, "Task deleted");
            }
            Action::Drop { target, payload } => {
                let id = self.drag.resolve(payload.as_deref()).map(str::to_owned);
                let outcome = controller
                    .drop_on(&mut self.board, &mut self.drag, target, payload.as_deref())
                    .await;
                if let Some(id) = id.filter(|_| !outcome.is_unchanged()) {
                    self.focus_task(&id);
                }
                self.report(&outcome, &format!("Moved to {}", target.title()));
            }
            Action::Reset(answer) => {
                let outcome = controller.reset_demo(&mut self.board, &answer).await;
                self.selected_card = 0;
                self.clamp_selection();
                self.report(&outcome, "Demo board restored");
            }
            Action::Export => self.export().await,
            Action::Import(path) => self.import(&path, controller).await,
        }
    }

    async fn export(&mut self) {
        let written = match export_all(self.board.tasks()) {
            Ok(text) => tokio::fs::write(&self.export_path, text)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match written {
            Ok(()) => {
                let text = format!(
                    "Exported {} tasks to {}",
                    self.board.len(),
                    self.export_path.display()
                );
                self.info(text);
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.warn(format!("Export failed: {err}"));
            }
        }
    }

    async fn import<S: TaskStore>(&mut self, path: &std::path::Path, controller: &BoardController<S>) {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => {
                self.warn(format!("Could not import: {err}"));
                return;
            }
        };
        match controller.import(&mut self.board, &raw).await {
            Ok(outcome) => {
                self.selected_card = 0;
                self.clamp_selection();
                self.report(&outcome, &format!("Imported {} tasks", self.board.len()));
            }
            Err(err) => self.warn(format!("Could not import: {err}")),
        }
    }
}
