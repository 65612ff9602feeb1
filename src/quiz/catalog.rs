//! Question catalog: the immutable decision tree walked by the traversal.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use utoipa::ToSchema;

const BUILTIN_CATALOG_JSON: &str = include_str!("catalog.json");

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub description: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    /// Id of the following question; `None` ends the quiz.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
}

impl Question {
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no questions")]
    Empty,
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),
    #[error("question {question} has no options")]
    NoOptions { question: String },
    #[error("question {question} has duplicate option id: {option}")]
    DuplicateOption { question: String, option: String },
    #[error("option {question}/{option} points to unknown question: {next}")]
    DanglingNext {
        question: String,
        option: String,
        next: String,
    },
    #[error("invalid catalog json: {0}")]
    Json(String),
}

/// Ordered, immutable set of questions. Position 0 is where every quiz starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog without checking references.
    ///
    /// Unknown `next` targets are still handled by the traversal (they end the
    /// quiz), so this is safe to walk; prefer [`Catalog::new`] for real data.
    #[must_use]
    pub fn unchecked(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Build a catalog, rejecting configuration defects.
    ///
    /// # Errors
    /// Returns the first defect found: empty catalog, duplicate ids, a question
    /// without options, or an option whose `next` names no question.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let catalog = Self { questions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    /// Returns [`CatalogError::Json`] on malformed input, or any validation defect.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::new(questions)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the catalog is invalid.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read quiz catalog at {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid quiz catalog at {}", path.display()))
    }

    /// The catalog shipped with the binary.
    ///
    /// # Errors
    /// Only fails if the embedded JSON is defective.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateQuestion(question.id.clone()));
            }
        }

        for question in &self.questions {
            if question.options.is_empty() {
                return Err(CatalogError::NoOptions {
                    question: question.id.clone(),
                });
            }

            let mut option_ids = HashSet::new();
            for option in &question.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        question: question.id.clone(),
                        option: option.id.clone(),
                    });
                }

                if let Some(next) = &option.next {
                    if !ids.contains(next.as_str()) {
                        return Err(CatalogError::DanglingNext {
                            question: question.id.clone(),
                            option: option.id.clone(),
                            next: next.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Position of the question with the given id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}
