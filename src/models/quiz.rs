// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::{NewQuestion, QuestionPayload, QuestionView};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz_id: i64,

    /// Owning course. Ownership of the course gates authoring.
    pub course_id: i64,

    pub title: String,
}

/// Inbound authoring payload for create and full replace.
///
/// Every field is optional so that a single validation pass can report
/// all missing and malformed parts at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizPayload {
    #[serde(default, alias = "quiz_title")]
    pub title: Option<String>,

    #[serde(default)]
    pub questions: Option<Vec<QuestionPayload>>,
}

/// A quiz tree that passed validation.
/// Question and answer numbers are implied by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub title: String,
    pub questions: Vec<NewQuestion>,
}

/// A quiz with its nested questions and answers, as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub quiz_id: i64,
    pub course_id: i64,
    pub title: String,
    pub questions: Vec<QuestionView>,
}
