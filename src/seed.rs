//! Demo board used when there is nothing stored, or the store is unreachable.

use chrono::{DateTime, Duration, Utc};

use crate::task::{iso_timestamp, new_task_id, Priority, Status, Task};

const DEMO: [(&str, &str, &str, Priority, Status); 7] = [
    (
        "Configurar proyecto MAUI",
        "Crear solución y targets Windows/Android.",
        "A",
        Priority::Alta,
        Status::Backlog,
    ),
    (
        "Modelo ShoppingItem",
        "Id, Name, IsPurchased",
        "B",
        Priority::Media,
        Status::Backlog,
    ),
    (
        "Servicio SQLite",
        "Load/Save con sqlite-net-pcl",
        "B",
        Priority::Alta,
        Status::Todo,
    ),
    (
        "ViewModel CRUD",
        "Add/Edit/Delete/Toggle + Filter",
        "C",
        Priority::Alta,
        Status::Todo,
    ),
    (
        "UI XAML con Swipe",
        "Entry, SearchBar, CollectionView",
        "D",
        Priority::Media,
        Status::InProgress,
    ),
    (
        "QA y README",
        "Plan de pruebas + capturas",
        "E",
        Priority::Baja,
        Status::Review,
    ),
    (
        "Alpha Demo",
        "Windows + Android corriendo",
        "Equipo",
        Priority::Alta,
        Status::Done,
    ),
];

/// Builds the seven demo tasks, due one to seven days after `now`.
#[must_use]
pub fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    DEMO.iter()
        .zip(1..)
        .map(|(&(title, description, owner, priority, status), days)| Task {
            id: new_task_id(),
            title: title.to_string(),
            description: description.to_string(),
            owner: owner.to_string(),
            due_date: iso_timestamp(now + Duration::days(days)),
            priority,
            status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seven_tasks_cover_every_column() {
        let tasks = demo_tasks(Utc::now());
        assert_eq!(tasks.len(), 7);

        let statuses: HashSet<_> = tasks.iter().map(|t| t.status).collect();
        assert_eq!(statuses.len(), Status::ALL.len());

        let ids: HashSet<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn due_dates_step_one_day_from_now() {
        let now = DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let tasks = demo_tasks(now);
        assert_eq!(tasks[0].due_date, "2024-03-11T12:00:00.000Z");
        assert_eq!(tasks[6].due_date, "2024-03-17T12:00:00.000Z");
    }
}
