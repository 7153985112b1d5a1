// src/services/grading.rs

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::time::timeout;

use crate::{
    db,
    error::{QuizError, QuizResult},
    models::attempt::{Attempt, CourseScore, GradeResult, SubmittedAnswer},
    services::projection,
};

/// Answer key row: a question with its points and the number of its correct answer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeyEntry {
    pub question_number: i64,
    pub question_points: i64,
    /// `None` when no answer is marked correct; such a question never scores.
    pub correct_answer: Option<i64>,
}

/// Score of one submission against an answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub total_points: i64,
    pub correct_count: usize,
    pub max_points: i64,
}

/// Computes the score of a submission.
///
/// When several selections target the same question the last one wins.
/// Selections for unknown questions are ignored. No partial credit.
/// Sums saturate instead of overflowing on rows written outside validation.
pub fn calculate_score(key: &[KeyEntry], submission: &[SubmittedAnswer]) -> Score {
    let chosen: HashMap<i64, i64> = submission
        .iter()
        .map(|s| (s.question_number, s.answer_number))
        .collect();

    let mut score = Score {
        total_points: 0,
        correct_count: 0,
        max_points: 0,
    };

    for entry in key {
        score.max_points = score.max_points.saturating_add(entry.question_points);

        let selected = chosen.get(&entry.question_number).copied();
        if entry.correct_answer.is_some() && selected == entry.correct_answer {
            score.total_points = score.total_points.saturating_add(entry.question_points);
            score.correct_count += 1;
        }
    }

    score
}

/// Grades submissions and keeps exactly one attempt per (quiz, student).
#[derive(Debug, Clone)]
pub struct QuizGrader {
    pool: SqlitePool,
    tx_timeout: Duration,
}

impl QuizGrader {
    pub fn new(pool: SqlitePool, tx_timeout: Duration) -> Self {
        Self { pool, tx_timeout }
    }

    /// Grades against the live answer key and upserts the attempt.
    ///
    /// Key read and attempt write share one transaction, so a concurrent
    /// full replace is seen either entirely or not at all.
    #[tracing::instrument(skip(self, submission), fields(selections = submission.len()))]
    pub async fn grade(
        &self,
        course_id: i64,
        quiz_id: i64,
        student_id: i64,
        submission: &[SubmittedAnswer],
    ) -> QuizResult<GradeResult> {
        timeout(
            self.tx_timeout,
            self.grade_tx(course_id, quiz_id, student_id, submission),
        )
        .await?
    }

    async fn grade_tx(
        &self,
        course_id: i64,
        quiz_id: i64,
        student_id: i64,
        submission: &[SubmittedAnswer],
    ) -> QuizResult<GradeResult> {
        let mut tx = db::begin_write(&self.pool).await?;

        if projection::find_quiz(&mut tx, course_id, quiz_id).await?.is_none() {
            return Err(QuizError::quiz_not_found(course_id, quiz_id));
        }

        let key = sqlx::query_as::<_, KeyEntry>(
            r#"
            SELECT
                q.question_number,
                q.question_points,
                a.answer_number AS correct_answer
            FROM questions q
            LEFT JOIN answers a
                ON a.quiz_id = q.quiz_id
                AND a.question_number = q.question_number
                AND a.is_correct = 1
            WHERE q.quiz_id = $1
            ORDER BY q.question_number ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&mut *tx)
        .await?;

        let score = calculate_score(&key, submission);
        tracing::debug!(
            total_points = score.total_points,
            correct_count = score.correct_count,
            "Submission scored"
        );

        // Overwrite on resubmission; the composite key is the conflict target.
        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (quiz_id, student_id, total_points, attempted_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (quiz_id, student_id) DO UPDATE SET
                total_points = excluded.total_points,
                attempted_at = excluded.attempted_at
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .bind(score.total_points)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(quiz_id, student_id, total_points = score.total_points, "Quiz graded");

        Ok(GradeResult {
            quiz_id,
            student_id,
            total_points: score.total_points,
            correct_count: score.correct_count,
            max_points: score.max_points,
        })
    }

    /// The stored attempt of a student, if any.
    pub async fn attempt(
        &self,
        course_id: i64,
        quiz_id: i64,
        student_id: i64,
    ) -> QuizResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT a.quiz_id, a.student_id, a.total_points, a.attempted_at
            FROM quiz_attempts a
            JOIN quizzes q ON q.quiz_id = a.quiz_id
            WHERE q.course_id = $1 AND a.quiz_id = $2 AND a.student_id = $3
            "#,
        )
        .bind(course_id)
        .bind(quiz_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    /// Top attempts of a quiz, best score first and earliest first on ties.
    pub async fn leaderboard(
        &self,
        course_id: i64,
        quiz_id: i64,
        limit: i64,
    ) -> QuizResult<Vec<Attempt>> {
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT a.quiz_id, a.student_id, a.total_points, a.attempted_at
            FROM quiz_attempts a
            JOIN quizzes q ON q.quiz_id = a.quiz_id
            WHERE q.course_id = $1 AND a.quiz_id = $2
            ORDER BY a.total_points DESC, a.attempted_at ASC
            LIMIT $3
            "#,
        )
        .bind(course_id)
        .bind(quiz_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    /// Sums a student's attempt scores over every quiz of a course.
    pub async fn course_score(&self, course_id: i64, student_id: i64) -> QuizResult<CourseScore> {
        let score = sqlx::query_as::<_, CourseScore>(
            r#"
            SELECT
                $1 AS student_id,
                $2 AS course_id,
                COALESCE(SUM(a.total_points), 0) AS total_score,
                COUNT(a.quiz_id) AS quiz_attempts
            FROM quiz_attempts a
            JOIN quizzes q ON q.quiz_id = a.quiz_id
            WHERE a.student_id = $1 AND q.course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Vec<KeyEntry> {
        vec![
            KeyEntry {
                question_number: 1,
                question_points: 10,
                correct_answer: Some(1),
            },
            KeyEntry {
                question_number: 2,
                question_points: 20,
                correct_answer: Some(2),
            },
        ]
    }

    fn submit(pairs: &[(i64, i64)]) -> Vec<SubmittedAnswer> {
        pairs.iter().copied().map(SubmittedAnswer::from).collect()
    }

    #[test]
    fn test_calculate_score_perfect() {
        let score = calculate_score(&key(), &submit(&[(1, 1), (2, 2)]));
        assert_eq!(score.total_points, 30);
        assert_eq!(score.correct_count, 2);
        assert_eq!(score.max_points, 30);
    }

    #[test]
    fn test_calculate_score_all_wrong() {
        let score = calculate_score(&key(), &submit(&[(1, 2), (2, 1)]));
        assert_eq!(score.total_points, 0);
        assert_eq!(score.correct_count, 0);
    }

    #[test]
    fn test_calculate_score_partial() {
        let score = calculate_score(&key(), &submit(&[(1, 1), (2, 1)]));
        assert_eq!(score.total_points, 10);
        assert_eq!(score.correct_count, 1);
    }

    #[test]
    fn test_last_selection_wins() {
        let score = calculate_score(&key(), &submit(&[(2, 2), (2, 1)]));
        assert_eq!(score.total_points, 0);

        let score = calculate_score(&key(), &submit(&[(2, 1), (2, 2)]));
        assert_eq!(score.total_points, 20);
    }

    #[test]
    fn test_unknown_questions_are_ignored() {
        let score = calculate_score(&key(), &submit(&[(9, 1), (1, 1)]));
        assert_eq!(score.total_points, 10);
    }

    #[test]
    fn test_question_without_correct_answer_never_scores() {
        let key = vec![KeyEntry {
            question_number: 1,
            question_points: 5,
            correct_answer: None,
        }];
        let score = calculate_score(&key, &submit(&[(1, 1)]));
        assert_eq!(score.total_points, 0);
        assert_eq!(score.max_points, 5);
    }

    #[test]
    fn test_huge_point_values_saturate() {
        let key = vec![
            KeyEntry {
                question_number: 1,
                question_points: i64::MAX,
                correct_answer: Some(1),
            },
            KeyEntry {
                question_number: 2,
                question_points: i64::MAX,
                correct_answer: Some(1),
            },
        ];
        let score = calculate_score(&key, &submit(&[(1, 1), (2, 1)]));
        assert_eq!(score.total_points, i64::MAX);
        assert_eq!(score.max_points, i64::MAX);
        assert_eq!(score.correct_count, 2);
    }

    #[test]
    fn test_empty_key_and_empty_submission() {
        assert_eq!(calculate_score(&[], &submit(&[(1, 1)])).total_points, 0);
        assert_eq!(calculate_score(&key(), &[]).total_points, 0);
    }
}
