// src/services/authoring.rs

use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::time::timeout;

use crate::{
    db,
    error::{QuizError, QuizResult},
    models::quiz::{NewQuiz, QuizView},
    services::projection::{self, Audience},
};

/// Creates, fully replaces and deletes quiz trees.
///
/// Every operation runs in one transaction. The `Transaction` guard rolls back
/// on any early return, error, panic or timeout, so a failed call leaves no
/// partial question/answer tree behind. Input is trusted to be validated.
#[derive(Debug, Clone)]
pub struct QuizAuthoring {
    pool: SqlitePool,
    tx_timeout: Duration,
}

impl QuizAuthoring {
    pub fn new(pool: SqlitePool, tx_timeout: Duration) -> Self {
        Self { pool, tx_timeout }
    }

    /// Inserts the quiz and its tree. Returns the teacher view of the new quiz.
    #[tracing::instrument(skip(self, quiz), fields(questions = quiz.questions.len()))]
    pub async fn create(&self, course_id: i64, quiz: &NewQuiz) -> QuizResult<QuizView> {
        timeout(self.tx_timeout, self.create_tx(course_id, quiz)).await?
    }

    async fn create_tx(&self, course_id: i64, quiz: &NewQuiz) -> QuizResult<QuizView> {
        let mut tx = db::begin_write(&self.pool).await?;

        let quiz_id: i64 = sqlx::query_scalar(
            "INSERT INTO quizzes (course_id, title) VALUES ($1, $2) RETURNING quiz_id",
        )
        .bind(course_id)
        .bind(&quiz.title)
        .fetch_one(&mut *tx)
        .await?;

        insert_tree(&mut tx, quiz_id, quiz).await?;
        let view = project_in_tx(&mut tx, course_id, quiz_id).await?;

        tx.commit().await?;
        tracing::info!(quiz_id, "Quiz created");
        Ok(view)
    }

    /// Updates the title and replaces the whole question/answer tree.
    ///
    /// Numbering restarts at 1 regardless of the previous tree.
    /// Returns `NotFound` without writing anything when the quiz is not in the course.
    #[tracing::instrument(skip(self, quiz), fields(questions = quiz.questions.len()))]
    pub async fn replace_all(
        &self,
        course_id: i64,
        quiz_id: i64,
        quiz: &NewQuiz,
    ) -> QuizResult<QuizView> {
        timeout(self.tx_timeout, self.replace_all_tx(course_id, quiz_id, quiz)).await?
    }

    async fn replace_all_tx(
        &self,
        course_id: i64,
        quiz_id: i64,
        quiz: &NewQuiz,
    ) -> QuizResult<QuizView> {
        let mut tx = db::begin_write(&self.pool).await?;

        if projection::find_quiz(&mut tx, course_id, quiz_id).await?.is_none() {
            return Err(QuizError::quiz_not_found(course_id, quiz_id));
        }

        sqlx::query("UPDATE quizzes SET title = $1 WHERE course_id = $2 AND quiz_id = $3")
            .bind(&quiz.title)
            .bind(course_id)
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        // Answers reference questions, so they go first.
        sqlx::query("DELETE FROM answers WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        insert_tree(&mut tx, quiz_id, quiz).await?;
        let view = project_in_tx(&mut tx, course_id, quiz_id).await?;

        tx.commit().await?;
        tracing::info!(quiz_id, "Quiz replaced");
        Ok(view)
    }

    /// Deletes attempts, answers, questions and then the quiz itself.
    ///
    /// Returns whether the quiz existed in the course. Nothing is written when it did not.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, course_id: i64, quiz_id: i64) -> QuizResult<bool> {
        timeout(self.tx_timeout, self.delete_tx(course_id, quiz_id)).await?
    }

    async fn delete_tx(&self, course_id: i64, quiz_id: i64) -> QuizResult<bool> {
        let mut tx = db::begin_write(&self.pool).await?;

        if projection::find_quiz(&mut tx, course_id, quiz_id).await?.is_none() {
            return Ok(false);
        }

        // Children before parents to keep foreign keys satisfied.
        for statement in [
            "DELETE FROM quiz_attempts WHERE quiz_id = $1",
            "DELETE FROM answers WHERE quiz_id = $1",
            "DELETE FROM questions WHERE quiz_id = $1",
        ] {
            sqlx::query(statement)
                .bind(quiz_id)
                .execute(&mut *tx)
                .await?;
        }

        let deleted = sqlx::query("DELETE FROM quizzes WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::info!(quiz_id, "Quiz deleted");
        Ok(deleted > 0)
    }
}

/// Writes questions and answers with dense 1-based numbering taken from position.
async fn insert_tree(
    tx: &mut Transaction<'_, Sqlite>,
    quiz_id: i64,
    quiz: &NewQuiz,
) -> QuizResult<()> {
    for (question_number, question) in (1_i64..).zip(&quiz.questions) {
        sqlx::query(
            r#"
            INSERT INTO questions (quiz_id, question_number, question_text, question_points)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(quiz_id)
        .bind(question_number)
        .bind(&question.text)
        .bind(question.points)
        .execute(&mut **tx)
        .await?;

        for (answer_number, answer) in (1_i64..).zip(&question.answers) {
            sqlx::query(
                r#"
                INSERT INTO answers (quiz_id, question_number, answer_number, answer_text, is_correct)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(quiz_id)
            .bind(question_number)
            .bind(answer_number)
            .bind(&answer.text)
            .bind(answer.is_correct)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

async fn project_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    course_id: i64,
    quiz_id: i64,
) -> QuizResult<QuizView> {
    projection::project(tx, course_id, quiz_id, Audience::Teacher)
        .await?
        .ok_or_else(|| {
            tracing::error!(quiz_id, "Quiz vanished inside its own transaction");
            QuizError::Persistence(format!("quiz {} could not be read back", quiz_id))
        })
}
