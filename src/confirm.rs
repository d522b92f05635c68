//! Yes/no gate in front of destructive actions.

pub const DELETE_PROMPT: &str = "Delete this task?";
pub const RESET_PROMPT: &str = "Clear the board and restore the demo tasks?";

/// Answers a confirmation prompt.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A fixed answer, used once the user has already replied in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
