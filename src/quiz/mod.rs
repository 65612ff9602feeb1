//! Branching single-choice questionnaire.
//!
//! A [`Catalog`] is loaded once at startup and never mutated. Navigation is
//! driven by [`QuizState`], which the client holds and sends back with every
//! step; [`QuestionView`] is what gets drawn for a state.

pub mod catalog;
pub mod traversal;
pub mod view;

pub use catalog::{Catalog, CatalogError, Question, QuestionOption, Tooltip};
pub use traversal::{Event, QuizState, StateError};
pub use view::QuestionView;
