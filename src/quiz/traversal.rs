//! Quiz navigation state machine.
//!
//! The state is owned by the client (one per browser tab). Every transition is
//! a pure function from a state to the next state plus an [`Event`], so the
//! same code serves the HTTP layer and the tests.
//!
//! Completion is a terminal state, not an index: `current_index` keeps
//! pointing at the last real question so that going back from the end lands
//! where the user left.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::catalog::Catalog;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub current_index: usize,
    #[serde(default)]
    pub history: Vec<usize>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Advanced { from: usize, to: usize },
    Completed,
    WentBack { to: usize },
    Unchanged,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("current index {index} is outside the catalog ({len} questions)")]
    CurrentOutOfRange { index: usize, len: usize },
    #[error("history entry {index} is outside the catalog ({len} questions)")]
    HistoryOutOfRange { index: usize, len: usize },
}

impl QuizState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a state the client could not have obtained from this catalog.
    ///
    /// # Errors
    /// Returns a [`StateError`] when any index falls outside `catalog`.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), StateError> {
        let len = catalog.len();
        if self.current_index >= len {
            return Err(StateError::CurrentOutOfRange {
                index: self.current_index,
                len,
            });
        }
        if let Some(&index) = self.history.iter().find(|&&index| index >= len) {
            return Err(StateError::HistoryOutOfRange { index, len });
        }
        Ok(())
    }

    /// Apply the `next` target of the selected option.
    ///
    /// A target that names no question (including `None`) completes the quiz
    /// and leaves `current_index` and `history` untouched.
    #[must_use]
    pub fn answer(mut self, catalog: &Catalog, next: Option<&str>) -> (Self, Event) {
        if self.completed {
            return (self, Event::Completed);
        }

        match next.and_then(|id| catalog.position(id)) {
            Some(to) => {
                let from = self.current_index;
                self.history.push(from);
                self.current_index = to;
                (self, Event::Advanced { from, to })
            }
            None => {
                self.completed = true;
                (self, Event::Completed)
            }
        }
    }

    /// Step back one screen. A no-op on the first screen.
    #[must_use]
    pub fn back(mut self) -> (Self, Event) {
        if self.completed {
            self.completed = false;
            let to = self.current_index;
            return (self, Event::WentBack { to });
        }

        match self.history.pop() {
            Some(to) => {
                self.current_index = to;
                (self, Event::WentBack { to })
            }
            None => (self, Event::Unchanged),
        }
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.completed || !self.history.is_empty()
    }
}
