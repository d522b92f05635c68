//! JSON export and sanitizing import of the whole task list.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::FormatError;
use crate::task::{iso_timestamp, new_task_id, Priority, Status, Task, MAX_TITLE_LEN};

static NULL: Value = Value::Null;

/// Default file name for exports.
pub const EXPORT_FILE_NAME: &str = "kanban_tasks.json";

/// Serializes the task list as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns the serializer error, which does not happen for well-formed tasks.
pub fn export_all(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tasks)
}

/// Parses `raw` as a JSON array and sanitizes every element into a task.
///
/// Malformed fields fall back to defaults; only a non-array document (or text
/// that is not JSON) is rejected.
///
/// # Errors
///
/// Returns [`FormatError`] when `raw` is not JSON or its top level is not an
/// array.
pub fn import_all(raw: &str) -> Result<Vec<Task>, FormatError> {
    let value: Value = serde_json::from_str(raw)?;
    let records = match value {
        Value::Array(records) => records,
        other => return Err(FormatError::NotAnArray(json_kind(&other))),
    };

    let mut seen = HashSet::with_capacity(records.len());
    Ok(records
        .iter()
        .map(|record| sanitize(record, &mut seen))
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turns one imported record into a valid task. `seen` tracks ids already
/// taken by this import; a repeated id is replaced with a fresh one.
fn sanitize(record: &Value, seen: &mut HashSet<String>) -> Task {
    let field = |name: &str| record.get(name).unwrap_or(&NULL);

    let mut id = coerce_id(field("id")).unwrap_or_else(new_task_id);
    if !seen.insert(id.clone()) {
        id = new_task_id();
        seen.insert(id.clone());
    }

    Task {
        id,
        title: coerce_string(field("title"))
            .chars()
            .take(MAX_TITLE_LEN)
            .collect(),
        description: coerce_string(field("description")),
        owner: coerce_string(field("owner")),
        due_date: coerce_due_date(field("dueDate")),
        priority: field("priority")
            .as_str()
            .and_then(Priority::parse)
            .unwrap_or_default(),
        status: field("status")
            .as_str()
            .and_then(Status::parse)
            .unwrap_or_default(),
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64() == Some(0.0)
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if !is_zero(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Text for a field; falsy values become empty.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if is_zero(n) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn coerce_due_date(value: &Value) -> String {
    let parsed = match value {
        Value::String(s) => parse_due_date(s),
        Value::Number(n) if !is_zero(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    parsed.map(iso_timestamp).unwrap_or_default()
}

/// Accepts RFC 3339, a bare date (UTC midnight), or a date-time without offset
/// (local time).
fn parse_due_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|at| at.and_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|at| at.with_timezone(&Utc))
}
