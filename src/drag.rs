//! Drag gesture state: `idle -> dragging -> idle`.
//!
//! Only one drag is tracked at a time; starting another overwrites the
//! recorded id.

use crate::task::TaskId;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DragState {
    dragging: Option<TaskId>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` as the card being dragged.
    pub fn start(&mut self, id: impl Into<TaskId>) {
        self.dragging = Some(id.into());
    }

    /// Returns to idle.
    pub fn end(&mut self) {
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Id to apply a drop to: the recorded one, else the id carried by the
    /// gesture's payload.
    pub fn resolve<'a>(&'a self, payload: Option<&'a str>) -> Option<&'a str> {
        self.dragging().or(payload).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_end_returns_to_idle() {
        let mut drag = DragState::new();
        drag.start("a");
        assert_eq!(drag.dragging(), Some("a"));
        drag.end();
        assert!(!drag.is_dragging());
    }

    #[test]
    fn new_drag_overwrites_recorded_id() {
        let mut drag = DragState::new();
        drag.start("a");
        drag.start("b");
        assert_eq!(drag.dragging(), Some("b"));
    }

    #[test]
    fn resolve_falls_back_to_payload() {
        let mut drag = DragState::new();
        assert_eq!(drag.resolve(Some("p")), Some("p"));
        assert_eq!(drag.resolve(None), None);
        assert_eq!(drag.resolve(Some("")), None);

        drag.start("a");
        assert_eq!(drag.resolve(Some("p")), Some("a"));
    }
}
