use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;

use crate::app::{App, FormField, FormState, Mode, NoticeLevel};
use crate::task::{Priority, Status, Task};

/// Rows each card takes inside a column.
const CARD_HEIGHT: u16 = 2;

const HELP: &str =
    "←→↑↓ move  a add  e edit  d delete  space pick/drop  / search  x export  i import  r reset  q quit";

/// Splits the screen into search bar, board, and status line.
pub fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area)
}

/// The five column areas, in board order.
pub fn column_areas(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(20); Status::ALL.len()])
        .split(screen_layout(area)[1])
}

/// Index of the column under `at`.
pub fn column_at(area: Rect, at: Position) -> Option<usize> {
    column_areas(area).iter().position(|col| col.contains(at))
}

/// How many cards fit in one column at once. Never less than one.
pub fn visible_cards(area: Rect) -> usize {
    let inner = column_areas(area)
        .first()
        .map_or(0, |col| col.height.saturating_sub(2));
    usize::from(inner / CARD_HEIGHT).max(1)
}

/// Column and visible card slot under `at`, counted from the column's first
/// visible card. The slot may be past the last card.
pub fn card_at(area: Rect, at: Position) -> Option<(usize, usize)> {
    let column = column_at(area, at)?;
    let col = column_areas(area)[column];
    let top = col.y + 1;
    let bottom = col.y + col.height.saturating_sub(1);
    if at.y < top || at.y >= bottom {
        return None;
    }
    Some((column, usize::from((at.y - top) / CARD_HEIGHT)))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Alta => Color::Red,
        Priority::Media => Color::Yellow,
        Priority::Baja => Color::Green,
    }
}

fn due_label(due_date: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(due_date)
        .ok()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d").to_string())
}

fn card_item<'a>(task: &'a Task, selected: bool, dragging: bool) -> ListItem<'a> {
    let mut meta = Vec::new();
    if !task.owner.is_empty() {
        meta.push(Span::raw(format!(" @{}", task.owner)));
    }
    if let Some(due) = due_label(&task.due_date) {
        meta.push(Span::styled(format!(" due {due}"), Style::default().fg(Color::Gray)));
    }

    let style = if dragging {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", task.priority),
                Style::default().fg(priority_color(task.priority)),
            ),
            Span::styled(task.title.as_str(), Style::default().fg(Color::White)),
        ]),
        Line::from(meta),
    ])
    .style(style)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let chunks = screen_layout(area);

    let searching = app.mode == Mode::Search;
    let search = Paragraph::new(app.query.as_str()).block(
        Block::default()
            .title("Search (/)")
            .borders(Borders::ALL)
            .border_style(if searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(search, chunks[0]);

    let view = app.view();
    let dragging = app.drag.dragging();
    for (i, (column, rect)) in view.columns.iter().zip(column_areas(area).iter()).enumerate() {
        let active = app.selected_column == i;
        let items: Vec<ListItem> = column
            .cards
            .iter()
            .enumerate()
            .map(|(n, t)| {
                card_item(
                    t,
                    active && n == app.selected_card,
                    dragging == Some(t.id.as_str()),
                )
            })
            .collect();

        let border = match (active, dragging.is_some()) {
            (true, true) => Style::default().fg(Color::Yellow),
            (true, false) => Style::default().fg(Color::Cyan),
            _ => Style::default(),
        };
        let list = List::new(items).block(
            Block::default()
                .title(format!("{} ({})", column.status.title(), column.cards.len()))
                .borders(Borders::ALL)
                .border_style(border),
        );
        if active {
            let mut state = ListState::default()
                .with_offset(app.card_offset)
                .with_selected(Some(app.selected_card));
            frame.render_stateful_widget(list, *rect, &mut state);
        } else {
            frame.render_widget(list, *rect);
        }
    }

    let status = match &app.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warning => Color::Red,
            };
            Paragraph::new(notice.text.as_str()).style(Style::default().fg(color))
        }
        None => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(status, chunks[2]);

    match &app.mode {
        Mode::Form(state) => draw_form(frame, state),
        Mode::Confirm(pending) => {
            draw_prompt(frame, "Confirm", &format!("{} (y/n)", pending.prompt()));
        }
        Mode::ImportPath(path) => draw_prompt(frame, "Import JSON from (Enter)", path),
        Mode::Board | Mode::Search => {}
    }
}

/// A rectangle of `width` x `height` centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_prompt(frame: &mut Frame, title: &str, text: &str) {
    let popup = centered(frame.area(), 60, 3);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

fn draw_form(frame: &mut Frame, state: &FormState) {
    let popup = centered(frame.area(), 70, 11);
    frame.render_widget(Clear, popup);

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let focused = field == state.focus;
            let label = Span::styled(
                format!("{:<18}", field.label()),
                if focused {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                },
            );
            let value = match field {
                FormField::Priority | FormField::Status => format!("< {} >", state.value(field)),
                _ if focused => format!("{}_", state.value(field)),
                _ => state.value(field).to_string(),
            };
            Line::from(vec![label, Span::raw(value)])
        })
        .collect();

    lines.push(Line::raw(""));
    lines.push(match &state.error {
        Some(err) => Line::styled(err.as_str(), Style::default().fg(Color::Red)),
        None => Line::styled(
            "Tab next field  ←→ change choice  Enter save  Esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
    });

    let title = if state.is_edit() { "Edit task" } else { "New task" };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban_board::KanbanBoard;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn columns_split_the_board_row() {
        let area = Rect::new(0, 0, 100, 30);
        let columns = column_areas(area);
        assert_eq!(columns.len(), 5);
        assert!(columns.iter().all(|c| c.y == 3 && c.height == 26));
    }

    #[test]
    fn hit_testing_maps_rows_to_cards() {
        let area = Rect::new(0, 0, 100, 30);
        // Column 2 starts at x = 40; first card row is y = 4.
        assert_eq!(card_at(area, Position::new(45, 4)), Some((2, 0)));
        assert_eq!(card_at(area, Position::new(45, 7)), Some((2, 1)));
        assert_eq!(card_at(area, Position::new(45, 3)), None);
        assert_eq!(column_at(area, Position::new(5, 1)), None);
        assert_eq!(column_at(area, Position::new(99, 10)), Some(4));
    }

    #[test]
    fn visible_cards_follows_board_height() {
        // 26 rows of board, 24 inside the borders.
        assert_eq!(visible_cards(Rect::new(0, 0, 100, 30)), 12);
        assert_eq!(visible_cards(Rect::default()), 1);
    }

    #[test]
    fn selected_column_scrolls_to_the_selected_card() {
        let tasks = (0..20)
            .map(|i| Task {
                id: format!("t{i}"),
                title: format!("Card-{i:02}"),
                description: String::new(),
                owner: String::new(),
                due_date: String::new(),
                priority: Priority::Media,
                status: Status::Backlog,
            })
            .collect();
        let mut app = App::new(KanbanBoard::with_tasks(tasks));
        let area = Rect::new(0, 0, 100, 20);
        app.set_area(area);
        app.selected_card = 15;
        app.card_offset = 15 + 1 - visible_cards(area);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(rendered.contains("Card-15"));
        assert!(!rendered.contains("Card-00"));
    }

    #[test]
    fn draw_renders_column_titles() {
        let app = App::new(KanbanBoard::new());
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        for status in Status::ALL {
            assert!(rendered.contains(status.title()), "missing {}", status.title());
        }
    }
}
