// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::models::answer::{AnswerPayload, AnswerView, NewAnswer};

/// Represents the 'questions' table in the database.
/// Keyed by `(quiz_id, question_number)`; the number is the 1-based position in the quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub quiz_id: i64,
    pub question_number: i64,
    pub question_text: String,
    pub question_points: i64,
}

/// Question entry of an authoring payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPayload {
    #[serde(default)]
    pub question_text: Option<String>,

    /// Accepts a JSON number or a numeric string.
    #[serde(default)]
    pub question_points: Option<Value>,

    #[serde(default)]
    pub answers: Option<Vec<AnswerPayload>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub points: i64,
    pub answers: Vec<NewAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question_number: i64,
    pub question_text: String,
    pub question_points: i64,
    pub answers: Vec<AnswerView>,
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        Self {
            question_number: q.question_number,
            question_text: q.question_text,
            question_points: q.question_points,
            answers: Vec::new(),
        }
    }
}
