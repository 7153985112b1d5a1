// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table in the database.
/// At most one row per (quiz, student); a resubmission overwrites it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub quiz_id: i64,
    pub student_id: i64,
    pub total_points: i64,
    pub attempted_at: DateTime<Utc>,
}

/// One selection of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_number: i64,
    pub answer_number: i64,
}

impl From<(i64, i64)> for SubmittedAnswer {
    fn from((question_number, answer_number): (i64, i64)) -> Self {
        Self {
            question_number,
            answer_number,
        }
    }
}

/// Outcome of grading a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeResult {
    pub quiz_id: i64,
    pub student_id: i64,
    pub total_points: i64,
    pub correct_count: usize,
    pub max_points: i64,
}

/// Sum of a student's attempt scores over every quiz of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CourseScore {
    pub student_id: i64,
    pub course_id: i64,
    pub total_score: i64,
    pub quiz_attempts: i64,
}
