use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::{Catalog, Question};
use super::traversal::QuizState;

/// What the client needs to draw one screen of the quiz.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionView {
    /// `None` once the quiz is completed.
    pub question: Option<Question>,
    pub completed: bool,
    pub can_go_back: bool,
    pub current_index: usize,
    pub total_questions: usize,
    /// `current_index / total_questions`, in `[0, 1)`.
    pub progress: f32,
    pub progress_percent: u8,
}

impl QuestionView {
    #[must_use]
    pub fn render(catalog: &Catalog, state: &QuizState) -> Self {
        let total_questions = catalog.len();
        let progress = progress(state.current_index, total_questions);
        let question = if state.completed {
            None
        } else {
            catalog.get(state.current_index).cloned()
        };

        Self {
            question,
            completed: state.completed,
            can_go_back: state.can_go_back(),
            current_index: state.current_index,
            total_questions,
            progress,
            progress_percent: (progress * 100.0).round() as u8,
        }
    }
}

fn progress(current_index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    current_index as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::tests::branching;

    #[test]
    fn renders_first_question() {
        let catalog = branching();
        let view = QuestionView::render(&catalog, &QuizState::new());
        assert_eq!(view.question.as_ref().map(|q| q.id.as_str()), Some("q1"));
        assert!(!view.can_go_back);
        assert!(!view.completed);
        assert_eq!(view.total_questions, 4);
        assert_eq!(view.progress_percent, 0);
    }

    #[test]
    fn progress_follows_index() {
        let catalog = branching();
        let (state, _) = QuizState::new().answer(&catalog, Some("q3"));
        let view = QuestionView::render(&catalog, &state);
        assert!((view.progress - 0.5).abs() < f32::EPSILON);
        assert_eq!(view.progress_percent, 50);
        assert!(view.can_go_back);
    }

    #[test]
    fn completed_state_has_no_question() {
        let catalog = branching();
        let (state, _) = QuizState::new().answer(&catalog, None);
        let view = QuestionView::render(&catalog, &state);
        assert!(view.completed);
        assert!(view.question.is_none());
        assert!(view.can_go_back);
    }

    #[test]
    fn progress_of_empty_catalog_is_zero() {
        assert!(progress(0, 0).abs() < f32::EPSILON);
    }
}
