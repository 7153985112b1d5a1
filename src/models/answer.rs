// src/models/answer.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub quiz_id: i64,
    pub question_number: i64,
    pub answer_number: i64,
    pub answer_text: String,
    pub is_correct: bool,
}

/// Answer entry of an authoring payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub answer_text: Option<String>,

    /// Only a literal JSON `true` marks the answer as correct.
    #[serde(default)]
    pub is_correct: Option<Value>,
}

impl AnswerPayload {
    pub fn marked_correct(&self) -> bool {
        matches!(self.is_correct, Some(Value::Bool(true)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub text: String,
    pub is_correct: bool,
}

/// Answer as projected to a viewer.
/// `is_correct` is omitted from the serialized form when the viewer is a student.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub answer_number: i64,
    pub answer_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl AnswerView {
    pub fn from_row(answer: Answer, include_correct: bool) -> Self {
        Self {
            answer_number: answer.answer_number,
            answer_text: answer.answer_text,
            is_correct: include_correct.then_some(answer.is_correct),
        }
    }
}
